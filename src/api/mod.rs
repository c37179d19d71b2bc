// Hosted backend client modules

pub mod auth;
pub mod favorites;
pub mod realtime;

use crate::models::{Favorite, FavoriteRow, Service, ServiceId, UserId};
use crate::utils::errors::GatewayError;
use async_trait::async_trait;

// Re-export commonly used types
pub use auth::fetch_current_user;
pub use favorites::RestGateway;
pub use realtime::{
    ChangeEvent, ChangeKind, ChangeNotifier, EventStreamNotifier, LocalNotifier, Subscription,
};

/// Remote source of truth for favorites
///
/// `token` is the signed-in user's access token; the backend applies its own
/// row-level rules with it.
#[async_trait]
pub trait FavoritesGateway: Send + Sync {
    /// `select service_id from favorites where user_id = ?`
    async fn fetch_favorite_ids(
        &self,
        token: &str,
        user_id: &UserId,
    ) -> Result<Vec<FavoriteRow>, GatewayError>;

    /// `insert into favorites (user_id, service_id)`
    async fn add_favorite(
        &self,
        token: &str,
        user_id: &UserId,
        service_id: &ServiceId,
    ) -> Result<Favorite, GatewayError>;

    /// `delete from favorites where user_id = ? and service_id = ?`
    async fn remove_favorite(
        &self,
        token: &str,
        user_id: &UserId,
        service_id: &ServiceId,
    ) -> Result<(), GatewayError>;

    /// `select * from services where id in (?)`
    async fn fetch_services(
        &self,
        token: &str,
        ids: &[ServiceId],
    ) -> Result<Vec<Service>, GatewayError>;

    /// Full service records for everything the user has favorited
    async fn fetch_favorite_services(
        &self,
        token: &str,
        user_id: &UserId,
    ) -> Result<Vec<Service>, GatewayError> {
        let rows = self.fetch_favorite_ids(token, user_id).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<ServiceId> = rows.into_iter().map(|r| r.service_id).collect();
        self.fetch_services(token, &ids).await
    }
}

/// In-memory gateway for tests and offline sessions
pub mod mock {
    use super::*;
    use crate::utils::error_handling::safe_lock;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// One recorded gateway call
    #[derive(Debug, Clone, PartialEq)]
    pub enum GatewayCall {
        FetchIds(UserId),
        Add(UserId, ServiceId),
        Remove(UserId, ServiceId),
        FetchServices(Vec<ServiceId>),
    }

    #[derive(Default)]
    pub struct MockGateway {
        rows: Mutex<Vec<Favorite>>,
        services: Mutex<HashMap<ServiceId, Service>>,
        calls: Mutex<Vec<GatewayCall>>,
        failing: AtomicBool,
        notifier: Option<Arc<LocalNotifier>>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// Publish a change event after every successful mutation
        pub fn with_notifier(notifier: Arc<LocalNotifier>) -> Self {
            Self {
                notifier: Some(notifier),
                ..Self::default()
            }
        }

        /// Seed a stored row without going through `add_favorite`
        ///
        /// Does not check uniqueness, so tests can model a backend returning duplicates.
        pub fn seed(&self, user_id: &UserId, service_id: &str) {
            let mut rows = safe_lock(&self.rows, "MockGateway");
            let id = format!("fav-{}", rows.len() + 1);
            rows.push(Favorite {
                id,
                user_id: user_id.clone(),
                service_id: ServiceId::from(service_id),
                created_at: chrono::Utc::now(),
            });
        }

        pub fn add_service(&self, service: Service) {
            safe_lock(&self.services, "MockGateway").insert(service.id.clone(), service);
        }

        /// Make every following call fail as a transport error
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn calls(&self) -> Vec<GatewayCall> {
            safe_lock(&self.calls, "MockGateway").clone()
        }

        /// Calls that would have mutated the backend
        pub fn mutation_calls(&self) -> Vec<GatewayCall> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, GatewayCall::Add(..) | GatewayCall::Remove(..)))
                .collect()
        }

        pub fn clear_calls(&self) {
            safe_lock(&self.calls, "MockGateway").clear();
        }

        /// Service ids currently stored for a user
        pub fn stored_ids(&self, user_id: &UserId) -> Vec<ServiceId> {
            let mut ids: Vec<ServiceId> = safe_lock(&self.rows, "MockGateway")
                .iter()
                .filter(|f| &f.user_id == user_id)
                .map(|f| f.service_id.clone())
                .collect();
            ids.sort();
            ids
        }

        fn record(&self, call: GatewayCall) -> Result<(), GatewayError> {
            safe_lock(&self.calls, "MockGateway").push(call);
            if self.failing.load(Ordering::SeqCst) {
                return Err(GatewayError::Status {
                    status: 503,
                    body: "mock gateway unavailable".to_string(),
                });
            }
            Ok(())
        }

        fn notify(&self, kind: ChangeKind, user_id: &UserId, service_id: &ServiceId) {
            if let Some(notifier) = &self.notifier {
                notifier.publish(ChangeEvent {
                    kind,
                    user_id: Some(user_id.clone()),
                    service_id: Some(service_id.clone()),
                });
            }
        }
    }

    #[async_trait]
    impl FavoritesGateway for MockGateway {
        async fn fetch_favorite_ids(
            &self,
            _token: &str,
            user_id: &UserId,
        ) -> Result<Vec<FavoriteRow>, GatewayError> {
            self.record(GatewayCall::FetchIds(user_id.clone()))?;
            let rows = safe_lock(&self.rows, "MockGateway");
            Ok(rows
                .iter()
                .filter(|f| &f.user_id == user_id)
                .map(|f| FavoriteRow {
                    service_id: f.service_id.clone(),
                })
                .collect())
        }

        async fn add_favorite(
            &self,
            _token: &str,
            user_id: &UserId,
            service_id: &ServiceId,
        ) -> Result<Favorite, GatewayError> {
            self.record(GatewayCall::Add(user_id.clone(), service_id.clone()))?;
            let favorite = {
                let mut rows = safe_lock(&self.rows, "MockGateway");
                if rows
                    .iter()
                    .any(|f| &f.user_id == user_id && &f.service_id == service_id)
                {
                    return Err(GatewayError::Status {
                        status: 409,
                        body: "duplicate key value violates unique constraint".to_string(),
                    });
                }
                let favorite = Favorite {
                    id: format!("fav-{}", rows.len() + 1),
                    user_id: user_id.clone(),
                    service_id: service_id.clone(),
                    created_at: chrono::Utc::now(),
                };
                rows.push(favorite.clone());
                favorite
            };
            self.notify(ChangeKind::Insert, user_id, service_id);
            Ok(favorite)
        }

        async fn remove_favorite(
            &self,
            _token: &str,
            user_id: &UserId,
            service_id: &ServiceId,
        ) -> Result<(), GatewayError> {
            self.record(GatewayCall::Remove(user_id.clone(), service_id.clone()))?;
            safe_lock(&self.rows, "MockGateway")
                .retain(|f| !(&f.user_id == user_id && &f.service_id == service_id));
            self.notify(ChangeKind::Delete, user_id, service_id);
            Ok(())
        }

        async fn fetch_services(
            &self,
            _token: &str,
            ids: &[ServiceId],
        ) -> Result<Vec<Service>, GatewayError> {
            self.record(GatewayCall::FetchServices(ids.to_vec()))?;
            let services = safe_lock(&self.services, "MockGateway");
            Ok(ids.iter().filter_map(|id| services.get(id).cloned()).collect())
        }
    }
}
