// Favorites endpoints on the hosted backend's REST interface
use super::FavoritesGateway;
use crate::config::BackendConfig;
use crate::constants::{FAVORITES_TABLE, SERVICES_TABLE};
use crate::models::favorite::NewFavorite;
use crate::models::{Favorite, FavoriteRow, Service, ServiceId, UserId};
use crate::utils::errors::GatewayError;
use crate::utils::http::{self, eq_filter, in_filter};
use async_trait::async_trait;

/// Gateway speaking the backend's PostgREST dialect over HTTP
pub struct RestGateway {
    client: reqwest::Client,
    config: BackendConfig,
}

impl RestGateway {
    pub fn new(config: BackendConfig) -> Result<Self, GatewayError> {
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn favorites_url(&self) -> String {
        self.config.table_url(FAVORITES_TABLE)
    }

    fn authed(&self, request: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        http::with_auth(request, &self.config.anon_key, token)
    }
}

#[async_trait]
impl FavoritesGateway for RestGateway {
    async fn fetch_favorite_ids(
        &self,
        token: &str,
        user_id: &UserId,
    ) -> Result<Vec<FavoriteRow>, GatewayError> {
        let url = format!(
            "{}?select=service_id&user_id={}",
            self.favorites_url(),
            eq_filter(user_id.as_str())
        );
        log::debug!("[Gateway] Fetching favorites: {}", url);

        let response = self.authed(self.client.get(&url), token).send().await?;
        let rows: Vec<FavoriteRow> = http::read_json(http::ensure_success(response).await?).await?;

        log::debug!("[Gateway] {} favorite rows for {}", rows.len(), user_id);
        Ok(rows)
    }

    async fn add_favorite(
        &self,
        token: &str,
        user_id: &UserId,
        service_id: &ServiceId,
    ) -> Result<Favorite, GatewayError> {
        let body = NewFavorite {
            user_id,
            service_id,
        };

        let response = self
            .authed(self.client.post(self.favorites_url()), token)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        // PostgREST answers inserts with an array of created rows
        let mut created: Vec<Favorite> =
            http::read_json(http::ensure_success(response).await?).await?;
        if created.is_empty() {
            return Err(GatewayError::Decode(
                "insert returned no representation".to_string(),
            ));
        }

        log::debug!("[Gateway] Inserted favorite {} -> {}", user_id, service_id);
        Ok(created.swap_remove(0))
    }

    async fn remove_favorite(
        &self,
        token: &str,
        user_id: &UserId,
        service_id: &ServiceId,
    ) -> Result<(), GatewayError> {
        let url = format!(
            "{}?user_id={}&service_id={}",
            self.favorites_url(),
            eq_filter(user_id.as_str()),
            eq_filter(service_id.as_str())
        );

        let response = self.authed(self.client.delete(&url), token).send().await?;
        http::ensure_success(response).await?;

        log::debug!("[Gateway] Deleted favorite {} -> {}", user_id, service_id);
        Ok(())
    }

    async fn fetch_services(
        &self,
        token: &str,
        ids: &[ServiceId],
    ) -> Result<Vec<Service>, GatewayError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}?select=*&id={}",
            self.config.table_url(SERVICES_TABLE),
            in_filter(ids.iter().map(|id| id.as_str()))
        );
        log::debug!("[Gateway] Fetching {} services", ids.len());

        let response = self.authed(self.client.get(&url), token).send().await?;
        http::read_json(http::ensure_success(response).await?).await
    }
}
