// Auth endpoint used to resolve the signed-in user
use crate::config::BackendConfig;
use crate::constants::AUTH_USER_PATH;
use crate::models::UserId;
use crate::utils::errors::GatewayError;
use crate::utils::http;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: UserId,
}

/// Ask the backend which user an access token belongs to
pub async fn fetch_current_user(
    config: &BackendConfig,
    token: &str,
) -> Result<UserId, GatewayError> {
    let url = format!("{}{}", config.url, AUTH_USER_PATH);
    let client = http::build_client(config)?;

    log::debug!("[Auth] Fetching current user: {}", url);

    let response = http::with_auth(client.get(&url), &config.anon_key, token)
        .send()
        .await?;
    let user: AuthUser = http::read_json(http::ensure_success(response).await?).await?;

    log::info!("[Auth] Signed in as {}", user.id);
    Ok(user.id)
}
