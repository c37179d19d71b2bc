use market_favorites::api::mock::{GatewayCall, MockGateway};
use market_favorites::api::{ChangeEvent, ChangeKind, LocalNotifier};
use market_favorites::models::{Service, ServiceId, UserId};
use market_favorites::services::LoadState;
use market_favorites::state::Session;
use market_favorites::FavoritesManager;
use std::sync::Arc;

const LOGO: &str = "5a1e0f3c-2b4d-4c6e-8f70-91a2b3c4d5e6";
const VIDEO: &str = "6b2f1a4d-3c5e-4d7f-9a81-a2b3c4d5e6f7";

fn alice() -> Session {
    Session::new(UserId::from("alice"), "alice-token")
}

fn service(id: &str, title: &str) -> Service {
    Service {
        id: ServiceId::from(id),
        title: title.to_string(),
        description: Some("Delivered as source files".to_string()),
        price: Some(250.0),
        category: Some("design".to_string()),
        delivery_days: Some(5),
    }
}

#[tokio::test]
async fn remote_rows_drive_membership() {
    let gateway = Arc::new(MockGateway::new());
    let user = UserId::from("alice");
    gateway.seed(&user, "a");
    gateway.seed(&user, "b");

    let mut favorites = FavoritesManager::new(gateway.clone(), Some(alice()));
    favorites.load(&user).await;

    assert!(favorites.is_favorite(&ServiceId::from("a")));
    assert!(!favorites.is_favorite(&ServiceId::from("c")));
}

#[tokio::test]
async fn insert_is_confirmed_before_cache_changes() {
    let gateway = Arc::new(MockGateway::new());
    let user = UserId::from("alice");
    let mut favorites = FavoritesManager::new(gateway.clone(), Some(alice()));
    favorites.load(&user).await;
    gateway.clear_calls();

    // a rejected insert must not show up in the cache
    gateway.set_failing(true);
    assert!(favorites.toggle(&ServiceId::from(LOGO)).await.is_err());
    assert!(!favorites.is_favorite(&ServiceId::from(LOGO)));

    gateway.set_failing(false);
    favorites.toggle(&ServiceId::from(LOGO)).await.unwrap();

    assert!(favorites.is_favorite(&ServiceId::from(LOGO)));
    assert_eq!(
        gateway.mutation_calls(),
        vec![
            GatewayCall::Add(user.clone(), ServiceId::from(LOGO)),
            GatewayCall::Add(user, ServiceId::from(LOGO)),
        ]
    );
}

#[tokio::test]
async fn change_events_trigger_a_single_reload() {
    let notifier = Arc::new(LocalNotifier::new());
    let gateway = Arc::new(MockGateway::with_notifier(notifier.clone()));

    // two open views of the same account
    let mut detail_page = FavoritesManager::new(gateway.clone(), Some(alice()));
    let mut profile_page = FavoritesManager::new(gateway.clone(), Some(alice()));
    detail_page.reload().await;
    profile_page.reload().await;
    profile_page.watch(notifier.as_ref()).await.unwrap();
    assert!(!profile_page.check_changes().await);

    detail_page.toggle(&ServiceId::from(LOGO)).await.unwrap();
    detail_page.toggle(&ServiceId::from(VIDEO)).await.unwrap();
    gateway.clear_calls();

    assert!(profile_page.check_changes().await);
    assert_eq!(
        profile_page.favorite_ids(),
        vec![ServiceId::from(LOGO), ServiceId::from(VIDEO)]
    );
    // two events, one re-fetch
    assert_eq!(gateway.calls(), vec![GatewayCall::FetchIds(UserId::from("alice"))]);
}

#[tokio::test]
async fn events_for_other_users_are_ignored() {
    let notifier = Arc::new(LocalNotifier::new());
    let gateway = Arc::new(MockGateway::with_notifier(notifier.clone()));
    let mut favorites = FavoritesManager::new(gateway.clone(), Some(alice()));
    favorites.reload().await;
    favorites.watch(notifier.as_ref()).await.unwrap();

    notifier.publish(ChangeEvent {
        kind: ChangeKind::Insert,
        user_id: Some(UserId::from("bob")),
        service_id: Some(ServiceId::from(LOGO)),
    });

    assert!(!favorites.check_changes().await);
}

#[tokio::test]
async fn next_change_waits_for_an_event() {
    let notifier = Arc::new(LocalNotifier::new());
    let gateway = Arc::new(MockGateway::with_notifier(notifier.clone()));
    let mut favorites = FavoritesManager::new(gateway.clone(), Some(alice()));
    favorites.watch(notifier.as_ref()).await.unwrap();

    gateway.seed(&UserId::from("alice"), LOGO);
    notifier.publish(ChangeEvent::unknown());

    assert!(favorites.next_change().await);
    assert_eq!(favorites.load_state(), LoadState::Loaded);
    assert!(favorites.is_favorite(&ServiceId::from(LOGO)));
}

#[tokio::test]
async fn sign_out_stops_watching() {
    let notifier = Arc::new(LocalNotifier::new());
    let gateway = Arc::new(MockGateway::with_notifier(notifier.clone()));
    let mut favorites = FavoritesManager::new(gateway, Some(alice()));
    favorites.watch(notifier.as_ref()).await.unwrap();
    assert_eq!(notifier.subscriber_count(), 1);

    favorites.sign_out();

    assert!(!favorites.is_watching());
    assert_eq!(notifier.subscriber_count(), 0);
    assert!(!favorites.next_change().await);
    assert!(favorites.watch(notifier.as_ref()).await.is_err());
}

#[tokio::test]
async fn profile_lists_favorited_services() {
    let gateway = Arc::new(MockGateway::new());
    let user = UserId::from("alice");
    gateway.add_service(service(LOGO, "Logo design"));
    gateway.add_service(service(VIDEO, "Video editing"));
    gateway.seed(&user, LOGO);

    let mut favorites = FavoritesManager::new(gateway.clone(), Some(alice()));

    // not loaded yet: resolved through the gateway in one go
    let services = favorites.favorite_services().await;
    assert_eq!(services, vec![service(LOGO, "Logo design")]);

    favorites.reload().await;
    favorites.toggle(&ServiceId::from(VIDEO)).await.unwrap();
    let titles: Vec<String> = favorites
        .favorite_services()
        .await
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, vec!["Logo design", "Video editing"]);
}

#[tokio::test]
async fn signed_out_profile_is_empty_without_calls() {
    let gateway = Arc::new(MockGateway::new());
    let mut favorites = FavoritesManager::new(gateway.clone(), None);

    assert!(favorites.favorite_services().await.is_empty());
    favorites.reload().await;
    assert_eq!(favorites.load_state(), LoadState::Unloaded);
    assert!(gateway.calls().is_empty());
}
