//! Blog post store tests

mod common;

use common::TestStore;
use insectelim::store::{BlogPostInput, StoreError, Visibility, DEFAULT_CATEGORY};

fn post(title: &str, published: bool) -> BlogPostInput {
    BlogPostInput {
        title: title.to_string(),
        content: format!("Contenu de {}", title),
        published,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_slug_and_category_defaults() {
    let store = TestStore::new().await;

    let created = store
        .create_post(&post("Les Frelons Asiatiques en été", true))
        .await
        .unwrap();
    assert_eq!(created.slug, "les-frelons-asiatiques-en-ete");
    assert_eq!(created.category, DEFAULT_CATEGORY);
    assert!(created.excerpt.is_empty());
}

#[tokio::test]
async fn test_explicit_slug_is_normalized() {
    let store = TestStore::new().await;

    let mut input = post("Titre", true);
    input.slug = Some("  Mon Slug Perso ".into());
    let created = store.create_post(&input).await.unwrap();
    assert_eq!(created.slug, "mon-slug-perso");
    assert!(store
        .get_post_by_slug("mon-slug-perso", Visibility::Public)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_drafts_hidden_from_public() {
    let store = TestStore::new().await;

    store.create_post(&post("Publié", true)).await.unwrap();
    store.create_post(&post("Brouillon", false)).await.unwrap();

    let public = store.list_posts(Visibility::Public).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].title, "Publié");
    assert_eq!(store.list_posts(Visibility::All).await.unwrap().len(), 2);
    assert!(store
        .get_post_by_slug("brouillon", Visibility::Public)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_list_newest_first() {
    let store = TestStore::new().await;

    store.create_post(&post("Premier", true)).await.unwrap();
    store.create_post(&post("Deuxième", true)).await.unwrap();
    store.create_post(&post("Troisième", true)).await.unwrap();

    let titles: Vec<String> = store
        .list_posts(Visibility::All)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["Troisième", "Deuxième", "Premier"]);
}

#[tokio::test]
async fn test_recent_posts_limit_and_visibility() {
    let store = TestStore::new().await;

    for title in ["Un", "Deux", "Trois", "Quatre"] {
        store.create_post(&post(title, true)).await.unwrap();
    }
    store.create_post(&post("Brouillon", false)).await.unwrap();

    let titles: Vec<String> = store
        .list_recent_posts(Visibility::Public, 3)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["Quatre", "Trois", "Deux"]);
    assert_eq!(
        store.list_recent_posts(Visibility::All, 1).await.unwrap()[0].title,
        "Brouillon"
    );
}

#[tokio::test]
async fn test_duplicate_slug_conflicts() {
    let store = TestStore::new().await;

    store.create_post(&post("Même titre", true)).await.unwrap();
    let err = store.create_post(&post("Même titre", false)).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn test_update_post() {
    let store = TestStore::new().await;

    let created = store.create_post(&post("Avant", false)).await.unwrap();
    let mut edit = post("Après", true);
    edit.slug = Some("apres".into());
    edit.category = Some("conseils".into());
    let updated = store.update_post(&created.id, &edit).await.unwrap();

    assert_eq!(updated.title, "Après");
    assert_eq!(updated.slug, "apres");
    assert_eq!(updated.category, "conseils");
    assert!(updated.published);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_delete_post() {
    let store = TestStore::new().await;

    let created = store.create_post(&post("Éphémère", true)).await.unwrap();
    store.delete_post(&created.id).await.unwrap();
    assert!(store.get_post(&created.id).await.unwrap().is_none());

    let err = store.delete_post(&created.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
