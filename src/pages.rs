//! Server-rendered public pages
//!
//! Plain string templates. Every value coming from the database or the
//! request goes through `escape_html`; markdown bodies go through
//! `markdown::to_html`, which escapes on its own.

use crate::format::{escape_html, french_long_date, tel_href};
use crate::markdown;
use crate::store::{BlogPost, ContactInfo, HeroSection, NewMessage, Service};

/// Selling points listed under the hero
const HERO_BENEFITS: [&str; 4] = [
    "Interventions rapides partout en Corse-du-Sud",
    "Produits respectueux de l'environnement",
    "Techniciens certifiés et agréés",
    "Service professionnel et discret",
];

/// Stock picture for a service without its own image
fn fallback_image(icon: &str) -> &'static str {
    match icon {
        "bird" => "https://images.pexels.com/photos/349758/hummingbird-bird-birds-349758.jpeg?auto=compress&cs=tinysrgb&w=600",
        "shield-check" => "https://images.pexels.com/photos/4207892/pexels-photo-4207892.jpeg?auto=compress&cs=tinysrgb&w=600",
        "home" => "https://images.pexels.com/photos/106399/pexels-photo-106399.jpeg?auto=compress&cs=tinysrgb&w=600",
        "rat" => "https://images.pexels.com/photos/2324028/pexels-photo-2324028.jpeg?auto=compress&cs=tinysrgb&w=600",
        _ => "https://images.pexels.com/photos/3714898/pexels-photo-3714898.jpeg?auto=compress&cs=tinysrgb&w=600",
    }
}

/// Outcome of the contact form, shown in the contact section
#[derive(Debug, Clone, Default)]
pub enum ContactStatus {
    #[default]
    Idle,
    Sent,
    /// Validation failed; the submitted values are echoed back
    Failed {
        errors: Vec<String>,
        form: NewMessage,
    },
}

/// Everything the home page shows
#[derive(Debug, Clone)]
pub struct HomePage {
    pub hero: HeroSection,
    pub contact: ContactInfo,
    pub services: Vec<Service>,
    pub posts: Vec<BlogPost>,
    pub status: ContactStatus,
}

fn layout(title: &str, contact: &ContactInfo, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
{navbar}
<main>
{body}
</main>
{footer}
</body>
</html>
"#,
        title = escape_html(title),
        navbar = navbar(contact),
        body = body,
        footer = footer(contact),
    )
}

fn navbar(contact: &ContactInfo) -> String {
    format!(
        r##"<nav class="navbar">
<a class="brand" href="/">INSECTELIM</a>
<a href="/#services">Services</a>
<a href="/#blog">Blog</a>
<a href="/#contact">Contact</a>
<a class="call" href="{tel}">Appeler {phone}</a>
</nav>"##,
        tel = escape_html(&tel_href(&contact.phone)),
        phone = escape_html(&contact.phone),
    )
}

fn footer(contact: &ContactInfo) -> String {
    format!(
        r##"<footer>
<h3>INSECTELIM</h3>
<div class="links"><h4>Liens rapides</h4>
<a href="/#services">Services</a> <a href="/#blog">Blog</a> <a href="/#contact">Contact</a>
</div>
<div class="contact"><h4>Contact</h4>
<p>{phone}</p><p>{email}</p><p>{address}</p>
</div>
</footer>"##,
        phone = escape_html(&contact.phone),
        email = escape_html(&contact.email),
        address = escape_html(&contact.address),
    )
}

fn hero(hero: &HeroSection) -> String {
    let logo = match hero.logo_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => format!(
            r#"<img class="logo" src="{}" alt="Logo INSECTELIM">"#,
            escape_html(url)
        ),
        None => String::new(),
    };
    let benefits: String = HERO_BENEFITS
        .iter()
        .map(|b| format!("<li>{}</li>", escape_html(b)))
        .collect();
    format!(
        r##"<section id="accueil" class="hero">
{logo}
<h1>{title}</h1>
<p class="subtitle">{subtitle}</p>
<a class="cta" href="#contact">Demandez un devis gratuit</a>
<a class="cta secondary" href="#services">Découvrir nos services</a>
<ul class="benefits">{benefits}</ul>
</section>"##,
        title = escape_html(&hero.title),
        subtitle = escape_html(&hero.subtitle),
    )
}

fn service_card(service: &Service) -> String {
    let image = service
        .image_url
        .as_deref()
        .unwrap_or_else(|| fallback_image(&service.icon));
    let link = match service.slug.as_deref() {
        Some(slug) => format!(
            r#"<a class="more" href="/services/{}">En savoir plus</a>"#,
            escape_html(slug)
        ),
        None => String::new(),
    };
    format!(
        r#"<article class="service" data-icon="{icon}">
<img src="{image}" alt="{title}">
<h3>{title}</h3>
<p>{description}</p>
{link}
</article>
"#,
        icon = escape_html(&service.icon),
        image = escape_html(image),
        title = escape_html(&service.title),
        description = escape_html(&service.description),
    )
}

fn post_card(post: &BlogPost) -> String {
    let image = match post.image_url.as_deref() {
        Some(url) => format!(
            r#"<img src="{}" alt="{}">"#,
            escape_html(url),
            escape_html(&post.title)
        ),
        None => r#"<div class="placeholder">📰</div>"#.to_string(),
    };
    format!(
        r#"<article class="post">
{image}
<span class="category">{category}</span>
<h3><a href="/blog/{slug}">{title}</a></h3>
<p>{excerpt}</p>
<time datetime="{created}">{date}</time>
</article>
"#,
        category = escape_html(&post.category),
        slug = escape_html(&post.slug),
        title = escape_html(&post.title),
        excerpt = escape_html(&post.excerpt),
        created = escape_html(&post.created_at),
        date = escape_html(&french_long_date(&post.created_at)),
    )
}

fn contact_section(contact: &ContactInfo, status: &ContactStatus) -> String {
    let empty = NewMessage::default();
    let (banner, form) = match status {
        ContactStatus::Idle => (String::new(), &empty),
        ContactStatus::Sent => (
            r#"<div class="banner success"><strong>Demande envoyée avec succès !</strong> Merci pour votre demande. Notre équipe vous contactera dans les plus brefs délais.</div>"#
                .to_string(),
            &empty,
        ),
        ContactStatus::Failed { errors, form } => {
            let items: String = errors
                .iter()
                .map(|e| format!("<li>{}</li>", escape_html(e)))
                .collect();
            (
                format!(
                    r#"<div class="banner error">Une erreur est survenue. Veuillez réessayer.<ul>{items}</ul></div>"#
                ),
                form,
            )
        }
    };

    format!(
        r##"<section id="contact" class="contact">
<h2>Contactez-nous</h2>
<p>Besoin d'une intervention rapide ? Nos techniciens sont disponibles 7j/7 dans toute la Corse-du-Sud.</p>
<div class="info">
<h3>Informations de contact</h3>
<p>Téléphone : <a href="{tel}">{phone}</a></p>
<p>Email : <a href="mailto:{email}">{email}</a></p>
<p>Adresse : {address}</p>
<p>Horaires : {hours}</p>
</div>
{banner}
<form method="post" action="/contact">
<h3>Demander un devis</h3>
<label>Nom complet * <input name="name" required value="{f_name}"></label>
<label>Email * <input type="email" name="email" required value="{f_email}"></label>
<label>Téléphone * <input type="tel" name="phone" required value="{f_phone}"></label>
<label>Message * <textarea name="message" required>{f_message}</textarea></label>
<button type="submit">Envoyer</button>
</form>
</section>"##,
        tel = escape_html(&tel_href(&contact.phone)),
        phone = escape_html(&contact.phone),
        email = escape_html(&contact.email),
        address = escape_html(&contact.address),
        hours = escape_html(&contact.hours),
        f_name = escape_html(&form.name),
        f_email = escape_html(&form.email),
        f_phone = escape_html(&form.phone),
        f_message = escape_html(&form.message),
    )
}

/// Home page
pub fn home(page: &HomePage) -> String {
    let services: String = page.services.iter().map(service_card).collect();
    let posts: String = page.posts.iter().map(post_card).collect();
    let body = format!(
        r#"{hero}
<section id="services" class="services">
<h2>Nos Services</h2>
<p>Des solutions professionnelles pour tous vos besoins en lutte anti-nuisibles</p>
{services}</section>
<section id="blog" class="blog">
<h2>Conseils et actualités</h2>
{posts}</section>
{contact}"#,
        hero = hero(&page.hero),
        contact = contact_section(&page.contact, &page.status),
    );
    layout(
        "INSECTELIM - Lutte anti-nuisibles à Porto-Vecchio",
        &page.contact,
        &body,
    )
}

fn pricing_box(service: &Service) -> String {
    let Some(pricing) = &service.pricing_info else {
        return String::new();
    };
    let mut html = String::from("<aside class=\"pricing\">\n<h3>Tarifs</h3>\n");
    if let Some(start) = &pricing.starting_price {
        html.push_str(&format!("<p class=\"start\">{}</p>\n", escape_html(start)));
    }
    if let Some(range) = &pricing.price_range {
        html.push_str(&format!("<p class=\"range\">{}</p>\n", escape_html(range)));
    }
    if let Some(note) = &pricing.note {
        html.push_str(&format!("<p class=\"note\">{}</p>\n", escape_html(note)));
    }
    if pricing.free_quote {
        html.push_str("<p class=\"free-quote\">Devis gratuit et sans engagement</p>\n");
    }
    html.push_str("</aside>\n");
    html
}

fn bullet_list(class: &str, title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let lis: String = items
        .iter()
        .map(|i| format!("<li>{}</li>", escape_html(i)))
        .collect();
    format!("<section class=\"{class}\">\n<h2>{title}</h2>\n<ul>{lis}</ul>\n</section>\n")
}

/// Service detail page
pub fn service_detail(service: &Service, contact: &ContactInfo) -> String {
    let image = service
        .image_url
        .as_deref()
        .unwrap_or_else(|| fallback_image(&service.icon));
    let content = service
        .detailed_content
        .as_deref()
        .map(markdown::to_html)
        .unwrap_or_default();
    let body = format!(
        r##"<a class="back" href="/#services">Retour aux services</a>
<header class="service-header">
<img src="{image}" alt="{title}">
<h1>{title}</h1>
<p class="lead">{description}</p>
</header>
<div class="content">
{content}</div>
{features}{benefits}{pricing}<aside class="contact-direct">
<h3>Contact Direct</h3>
<p>Téléphone : <a href="{tel}">{phone}</a></p>
<p>Email : <a href="mailto:{email}">{email}</a></p>
<a class="cta" href="/#contact">Demander un devis</a>
</aside>"##,
        image = escape_html(image),
        title = escape_html(&service.title),
        description = escape_html(&service.description),
        features = bullet_list("features", "Nos Prestations", &service.features),
        benefits = bullet_list("benefits", "Les avantages", &service.benefits),
        pricing = pricing_box(service),
        tel = escape_html(&tel_href(&contact.phone)),
        phone = escape_html(&contact.phone),
        email = escape_html(&contact.email),
    );
    layout(&format!("{} - INSECTELIM", service.title), contact, &body)
}

/// Blog post page
pub fn blog_detail(post: &BlogPost, contact: &ContactInfo) -> String {
    let image = match post.image_url.as_deref() {
        Some(url) => format!(
            "<img class=\"cover\" src=\"{}\" alt=\"{}\">\n",
            escape_html(url),
            escape_html(&post.title)
        ),
        None => String::new(),
    };
    let excerpt = if post.excerpt.trim().is_empty() {
        String::new()
    } else {
        format!("<p class=\"excerpt\">{}</p>\n", escape_html(&post.excerpt))
    };
    let body = format!(
        r##"<a class="back" href="/#blog">Retour au blog</a>
<article class="post-detail">
{image}<p class="meta"><time datetime="{created}">{date}</time> · <span class="category">{category}</span></p>
<h1>{title}</h1>
{excerpt}<div class="content">
{content}</div>
</article>"##,
        created = escape_html(&post.created_at),
        date = escape_html(&french_long_date(&post.created_at)),
        category = escape_html(&post.category),
        title = escape_html(&post.title),
        content = markdown::to_html(&post.content),
    );
    layout(&format!("{} - INSECTELIM", post.title), contact, &body)
}

/// 404 page
pub fn not_found(contact: &ContactInfo) -> String {
    layout(
        "Page introuvable - INSECTELIM",
        contact,
        r#"<section class="not-found">
<h1>Page introuvable</h1>
<p>La page demandée n'existe pas ou n'est plus disponible.</p>
<a class="cta" href="/">Retour à l'accueil</a>
</section>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PricingInfo;

    fn service() -> Service {
        Service {
            id: "s1".into(),
            title: "Dératisation".into(),
            slug: Some("deratisation".into()),
            description: "Rats & souris".into(),
            icon: "rat".into(),
            image_url: None,
            position: 0,
            active: true,
            detailed_content: Some("## Méthode\n- Diagnostic\n- <b>Traitement</b>".into()),
            pricing_info: Some(PricingInfo {
                starting_price: Some("À partir de 120 €".into()),
                ..PricingInfo::default()
            }),
            features: vec!["Produits homologués".into()],
            benefits: vec![],
            created_at: "2026-10-16T09:00:00.000000Z".into(),
            updated_at: "2026-10-16T09:00:00.000000Z".into(),
        }
    }

    fn post() -> BlogPost {
        BlogPost {
            id: "p1".into(),
            title: "Guêpes <script>".into(),
            slug: "guepes".into(),
            excerpt: "Résumé".into(),
            content: "# Titre\nTexte **important**".into(),
            category: "prévention".into(),
            image_url: None,
            published: true,
            created_at: "2026-10-16T09:00:00.000000Z".into(),
            updated_at: "2026-10-16T09:00:00.000000Z".into(),
        }
    }

    #[test]
    fn test_service_detail() {
        let html = service_detail(&service(), &ContactInfo::default());
        assert!(html.contains("<h1>Dératisation</h1>"));
        assert!(html.contains("Rats &amp; souris"));
        assert!(html.contains("<h2>Méthode</h2>"));
        assert!(html.contains("<li>&lt;b&gt;Traitement&lt;/b&gt;</li>"));
        assert!(html.contains("À partir de 120 €"));
        assert!(html.contains("Devis gratuit et sans engagement"));
        assert!(html.contains("Nos Prestations"));
        assert!(!html.contains("Les avantages"));
        assert!(html.contains("tel:0495XXXXXX"));
        assert!(html.contains("pexels-photo-2324028"));
    }

    #[test]
    fn test_blog_detail_escapes_and_formats_date() {
        let html = blog_detail(&post(), &ContactInfo::default());
        assert!(html.contains("16 octobre 2026"));
        assert!(html.contains("Guêpes &lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<strong>important</strong>"));
        assert!(html.contains("prévention"));
    }

    #[test]
    fn test_home_lists_cards_and_form() {
        let page = HomePage {
            hero: HeroSection::default(),
            contact: ContactInfo::default(),
            services: vec![service()],
            posts: vec![post()],
            status: ContactStatus::Idle,
        };
        let html = home(&page);
        assert!(html.contains("<h1>INSECTELIM</h1>"));
        assert!(html.contains(r#"href="/services/deratisation""#));
        assert!(html.contains(r#"href="/blog/guepes""#));
        assert!(html.contains(r#"action="/contact""#));
        assert!(!html.contains("banner"));
    }

    #[test]
    fn test_home_failed_contact_echoes_form() {
        let page = HomePage {
            hero: HeroSection::default(),
            contact: ContactInfo::default(),
            services: vec![],
            posts: vec![],
            status: ContactStatus::Failed {
                errors: vec!["A valid email address is required".into()],
                form: NewMessage {
                    name: "Jean \"JJ\"".into(),
                    email: "bad".into(),
                    phone: "06".into(),
                    message: "<help>".into(),
                },
            },
        };
        let html = home(&page);
        assert!(html.contains("banner error"));
        assert!(html.contains("A valid email address is required"));
        assert!(html.contains("value=\"Jean &quot;JJ&quot;\""));
        assert!(html.contains("&lt;help&gt;</textarea>"));
    }

    #[test]
    fn test_home_sent_banner() {
        let page = HomePage {
            hero: HeroSection::default(),
            contact: ContactInfo::default(),
            services: vec![],
            posts: vec![],
            status: ContactStatus::Sent,
        };
        assert!(home(&page).contains("Demande envoyée avec succès"));
    }
}
