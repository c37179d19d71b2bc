/// Favorites state manager
///
/// Keeps the signed-in user's favorited service ids cached locally and in
/// step with the backend. Mutations go to the gateway first; the cache only
/// changes once the backend has confirmed. Change notifications trigger a
/// full re-fetch instead of a merge: one extra round trip per event in
/// exchange for never diverging from the backend.
use crate::api::{ChangeNotifier, FavoritesGateway, Subscription};
use crate::constants::{MSG_ADDED, MSG_LOAD_FAILED, MSG_REMOVED, MSG_WATCH_FAILED};
use crate::models::{Service, ServiceId, UserId};
use crate::state::{FavoriteButton, Session, ToastManager};
use crate::utils::errors::{FavoriteError, GatewayError};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded,
}

/// Result of a confirmed toggle (for UI updates)
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleResult {
    pub service_id: ServiceId,
    pub is_favorite: bool,
    pub message: &'static str,
}

pub struct FavoritesManager {
    gateway: Arc<dyn FavoritesGateway>,
    session: Option<Session>,
    favorite_ids: HashSet<ServiceId>,
    load_state: LoadState,
    subscription: Option<Subscription>,
    pub toasts: ToastManager,
}

impl FavoritesManager {
    pub fn new(gateway: Arc<dyn FavoritesGateway>, session: Option<Session>) -> Self {
        Self {
            gateway,
            session,
            favorite_ids: HashSet::new(),
            load_state: LoadState::Unloaded,
            subscription: None,
            toasts: ToastManager::new(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }

    /// Replace the signed-in identity; a different user starts from scratch
    pub fn sign_in(&mut self, session: Session) {
        let same_user = self
            .session
            .as_ref()
            .map_or(false, |s| s.user_id == session.user_id);
        if !same_user {
            self.reset();
        }
        log::info!("[Favorites] Session for {}", session.user_id);
        self.session = Some(session);
    }

    pub fn sign_out(&mut self) {
        log::info!("[Favorites] Signed out, clearing favorites");
        self.session = None;
        self.reset();
    }

    fn reset(&mut self) {
        self.favorite_ids.clear();
        self.load_state = LoadState::Unloaded;
        self.subscription = None;
    }

    /// Fetch every favorite of `user_id` and replace the cache with it
    ///
    /// Only the signed-in user's favorites are ever cached: a load for anyone
    /// else is refused without a remote call. Fails open: on error the cache
    /// is left empty and `Unloaded`.
    pub async fn load(&mut self, user_id: &UserId) {
        let token = match self.session.as_ref() {
            Some(s) if &s.user_id == user_id => s.access_token.clone(),
            Some(s) => {
                log::warn!(
                    "[Favorites] Refusing to load favorites of {} in a session for {}",
                    user_id,
                    s.user_id
                );
                self.favorite_ids.clear();
                self.load_state = LoadState::Unloaded;
                return;
            }
            None => {
                log::warn!("[Favorites] Load for {} without a session, skipping", user_id);
                self.favorite_ids.clear();
                self.load_state = LoadState::Unloaded;
                return;
            }
        };

        if let Err(e) = self.fetch_into_cache(&token, user_id).await {
            log::error!("[Favorites] Failed to load favorites for {}: {}", user_id, e);
            self.toasts.show_error(MSG_LOAD_FAILED);
        }
    }

    async fn fetch_into_cache(&mut self, token: &str, user_id: &UserId) -> Result<(), GatewayError> {
        log::debug!("[Favorites] Loading favorites for {}", user_id);
        match self.gateway.fetch_favorite_ids(token, user_id).await {
            Ok(rows) => {
                self.favorite_ids = rows.into_iter().map(|r| r.service_id).collect();
                self.load_state = LoadState::Loaded;
                log::info!(
                    "[Favorites] Loaded {} favorites for {}",
                    self.favorite_ids.len(),
                    user_id
                );
                Ok(())
            }
            Err(e) => {
                self.favorite_ids.clear();
                self.load_state = LoadState::Unloaded;
                Err(e)
            }
        }
    }

    /// `load` for the session user, or reset when signed out
    pub async fn reload(&mut self) {
        match self.session.as_ref().map(|s| s.user_id.clone()) {
            Some(user_id) => self.load(&user_id).await,
            None => self.reset(),
        }
    }

    /// Cache lookup only; never calls the backend
    pub fn is_favorite(&self, service_id: &ServiceId) -> bool {
        self.favorite_ids.contains(service_id)
    }

    /// Sorted snapshot of the cached ids
    pub fn favorite_ids(&self) -> Vec<ServiceId> {
        let mut ids: Vec<ServiceId> = self.favorite_ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn button_state(&self, service_id: &ServiceId) -> FavoriteButton {
        FavoriteButton::new(
            self.is_authenticated(),
            service_id.is_recognized(),
            self.is_favorite(service_id),
        )
    }

    /// Add or remove `service_id` from the user's favorites
    ///
    /// Nothing reaches the backend when signed out or for a placeholder id.
    pub async fn toggle(&mut self, service_id: &ServiceId) -> Result<ToggleResult, FavoriteError> {
        let Some(session) = self.session.clone() else {
            log::warn!("[Favorites] Toggle {} without a session", service_id);
            return Err(self.refuse(FavoriteError::NeedsAuth));
        };

        if !service_id.is_recognized() {
            log::debug!("[Favorites] Ignoring toggle for placeholder id {}", service_id);
            return Err(self.refuse(FavoriteError::InvalidTarget(service_id.clone())));
        }

        // membership must be known before choosing insert or delete
        if self.load_state == LoadState::Unloaded {
            if let Err(e) = self
                .fetch_into_cache(&session.access_token, &session.user_id)
                .await
            {
                log::error!("[Favorites] Failed to load favorites before toggle: {}", e);
                return Err(self.refuse(FavoriteError::Transport(e)));
            }
        }

        let was_favorite = self.is_favorite(service_id);
        let result = if was_favorite {
            log::info!("[Favorites] Removing {} for {}", service_id, session.user_id);
            self.gateway
                .remove_favorite(&session.access_token, &session.user_id, service_id)
                .await
        } else {
            log::info!("[Favorites] Adding {} for {}", service_id, session.user_id);
            self.gateway
                .add_favorite(&session.access_token, &session.user_id, service_id)
                .await
                .map(|_| ())
        };

        if let Err(e) = result {
            log::error!("[Favorites] Failed to update favorite {}: {}", service_id, e);
            return Err(self.refuse(FavoriteError::Transport(e)));
        }

        let outcome = if was_favorite {
            self.favorite_ids.remove(service_id);
            self.toasts.show_info(MSG_REMOVED);
            ToggleResult {
                service_id: service_id.clone(),
                is_favorite: false,
                message: MSG_REMOVED,
            }
        } else {
            self.favorite_ids.insert(service_id.clone());
            self.toasts.show_success(MSG_ADDED);
            ToggleResult {
                service_id: service_id.clone(),
                is_favorite: true,
                message: MSG_ADDED,
            }
        };
        Ok(outcome)
    }

    fn refuse(&mut self, error: FavoriteError) -> FavoriteError {
        match error {
            FavoriteError::Transport(_) => self.toasts.show_error(error.user_message()),
            _ => self.toasts.show_info(error.user_message()),
        }
        error
    }

    /// Service records for the cached favorites (profile listing)
    pub async fn favorite_services(&mut self) -> Vec<Service> {
        let Some(session) = self.session.clone() else {
            return Vec::new();
        };

        let result = match self.load_state {
            LoadState::Loaded => {
                let ids = self.favorite_ids();
                self.gateway.fetch_services(&session.access_token, &ids).await
            }
            LoadState::Unloaded => {
                self.gateway
                    .fetch_favorite_services(&session.access_token, &session.user_id)
                    .await
            }
        };

        match result {
            Ok(services) => services,
            Err(e) => {
                log::error!("[Favorites] Failed to fetch favorite services: {}", e);
                self.toasts.show_error(MSG_LOAD_FAILED);
                Vec::new()
            }
        }
    }

    /// Subscribe to changes of the session user's favorites
    pub async fn watch(&mut self, notifier: &dyn ChangeNotifier) -> Result<(), FavoriteError> {
        let Some(user_id) = self.session.as_ref().map(|s| s.user_id.clone()) else {
            return Err(FavoriteError::NeedsAuth);
        };
        let subscription = match notifier.subscribe(&user_id).await {
            Ok(sub) => sub,
            Err(e) => {
                log::error!("[Favorites] Failed to watch favorites of {}: {}", user_id, e);
                self.toasts.show_error(MSG_WATCH_FAILED);
                return Err(FavoriteError::Transport(e));
            }
        };
        log::info!("[Favorites] Watching favorites of {}", user_id);
        self.subscription = Some(subscription);
        Ok(())
    }

    /// Drain queued change events; reload once if any arrived
    pub async fn check_changes(&mut self) -> bool {
        let pending = match self.subscription.as_mut() {
            Some(sub) => sub.drain_pending().len(),
            None => return false,
        };
        if pending == 0 {
            return false;
        }
        log::debug!("[Favorites] {} change event(s), reloading", pending);
        self.reload().await;
        true
    }

    /// Wait for the next change event and reload
    ///
    /// Returns `false` when not watching or once the feed has ended.
    pub async fn next_change(&mut self) -> bool {
        let event = match self.subscription.as_mut() {
            Some(sub) => sub.next().await,
            None => return false,
        };
        match event {
            Some(event) => {
                log::debug!("[Favorites] Change event {:?}, reloading", event.kind);
                self.reload().await;
                true
            }
            None => {
                log::info!("[Favorites] Change feed ended");
                self.subscription = None;
                false
            }
        }
    }
}
