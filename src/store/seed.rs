//! Default content for a fresh site
//!
//! Each entity is seeded only when its table is empty, so running
//! `insectelim init --seed` twice never duplicates anything.

use serde::Serialize;

use super::helpers::StoreError;
use super::{
    BlogPostInput, ContactInfo, HeroSection, PricingInfo, ServiceInput, Store, CONTACT_INFO_KEY,
    HERO_SECTION_KEY,
};

/// What a seeding run inserted
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub services: usize,
    pub posts: usize,
    pub settings: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.services == 0 && self.posts == 0 && self.settings == 0
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_services() -> Vec<ServiceInput> {
    vec![
        ServiceInput {
            title: "Dératisation".into(),
            slug: Some("deratisation".into()),
            description: "Élimination des rats et souris dans vos locaux, habitations et commerces."
                .into(),
            icon: "rat".into(),
            position: Some(0),
            active: Some(true),
            detailed_content: Some(
                "## Une intervention en trois temps\n\
                 - Diagnostic des points d'entrée\n\
                 - Mise en place de postes d'appâtage sécurisés\n\
                 - Suivi jusqu'à disparition complète\n\
                 \n\
                 Nos techniciens interviennent **sous 24h** en Corse-du-Sud."
                    .into(),
            ),
            pricing_info: Some(PricingInfo {
                starting_price: Some("À partir de 120 €".into()),
                ..PricingInfo::default()
            }),
            features: strings(&[
                "Diagnostic complet",
                "Produits homologués",
                "Rapport d'intervention",
            ]),
            benefits: strings(&["Intervention rapide", "Garantie de résultat"]),
            ..ServiceInput::default()
        },
        ServiceInput {
            title: "Désinsectisation".into(),
            slug: Some("desinsectisation".into()),
            description: "Traitement contre cafards, punaises de lit, guêpes, frelons et fourmis."
                .into(),
            icon: "bug".into(),
            position: Some(1),
            active: Some(true),
            detailed_content: Some(
                "## Tous les insectes nuisibles\n\
                 Cafards, punaises de lit, puces, guêpes et frelons.\n\
                 \n\
                 **Traitements adaptés à chaque situation**"
                    .into(),
            ),
            pricing_info: Some(PricingInfo {
                starting_price: Some("À partir de 90 €".into()),
                ..PricingInfo::default()
            }),
            features: strings(&["Traitement ciblé", "Produits respectueux de l'environnement"]),
            benefits: strings(&["Discrétion", "Conseils de prévention"]),
            ..ServiceInput::default()
        },
        ServiceInput {
            title: "Désinfection".into(),
            slug: Some("desinfection".into()),
            description: "Désinfection des locaux professionnels et particuliers contre virus et bactéries."
                .into(),
            icon: "shield-check".into(),
            position: Some(2),
            active: Some(true),
            pricing_info: Some(PricingInfo::default()),
            features: strings(&["Virucide et bactéricide", "Certificat de désinfection"]),
            benefits: strings(&["Locaux sains", "Conformité réglementaire"]),
            ..ServiceInput::default()
        },
    ]
}

fn default_post() -> BlogPostInput {
    BlogPostInput {
        title: "Comment prévenir l'invasion de nuisibles".into(),
        slug: Some("prevenir-invasion-nuisibles".into()),
        excerpt: Some("Quelques gestes simples pour garder votre maison à l'abri des nuisibles.".into()),
        content: "# Prévenir plutôt que guérir\n\
                  Quelques gestes simples limitent les risques :\n\
                  - Boucher les fissures et les passages de câbles\n\
                  - Ne pas laisser de nourriture accessible\n\
                  - Sortir les poubelles régulièrement\n\
                  \n\
                  En cas de doute, **demandez un diagnostic gratuit**."
            .into(),
        category: None,
        image_url: None,
        published: true,
    }
}

impl Store {
    /// Insert default services, a blog post and site settings where missing
    pub async fn seed_defaults(&self) -> Result<SeedReport, StoreError> {
        let mut report = SeedReport::default();

        if self.service_count().await? == 0 {
            for service in default_services() {
                self.create_service(&service).await?;
                report.services += 1;
            }
        }

        if self.post_count().await? == 0 {
            self.create_post(&default_post()).await?;
            report.posts += 1;
        }

        if self.get_setting(CONTACT_INFO_KEY).await?.is_none() {
            let value = serde_json::to_value(ContactInfo::default())?;
            self.upsert_setting(CONTACT_INFO_KEY, &value).await?;
            report.settings += 1;
        }
        if self.get_setting(HERO_SECTION_KEY).await?.is_none() {
            let value = serde_json::to_value(HeroSection::default())?;
            self.upsert_setting(HERO_SECTION_KEY, &value).await?;
            report.settings += 1;
        }

        tracing::info!(?report, "Seeding finished");
        Ok(report)
    }
}
