use crate::config::BackendConfig;
use crate::utils::errors::GatewayError;
use once_cell::sync::Lazy;

/// Shared client for long-lived event streams; never carries a request timeout
pub static STREAM_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Build the request client used for gateway calls
///
/// A total timeout is only set when one is configured.
pub fn build_client(config: &BackendConfig) -> Result<reqwest::Client, GatewayError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(GatewayError::from)
}

/// Attach the backend key and the caller's bearer token
pub fn with_auth(
    request: reqwest::RequestBuilder,
    api_key: &str,
    token: &str,
) -> reqwest::RequestBuilder {
    request
        .header("apikey", api_key)
        .header("Authorization", format!("Bearer {}", token))
}

/// Turn a non-2xx response into `GatewayError::Status`
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::debug!("[Http] Backend returned {}: {}", status, body);
    Err(GatewayError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Decode a JSON body, reporting the payload on failure
pub async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// PostgREST equality filter: `eq.<value>`, percent-encoded for the query string
pub fn eq_filter(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

/// PostgREST membership filter value: `in.(<a>,<b>)`
pub fn in_filter<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let joined = values
        .into_iter()
        .map(|v| urlencoding::encode(v).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_are_postgrest_encoded() {
        assert_eq!(eq_filter("abc"), "eq.abc");
        assert_eq!(eq_filter("a b"), "eq.a%20b");
        assert_eq!(in_filter(["a", "b,c"]), "in.(a,b%2Cc)");
        assert_eq!(in_filter(std::iter::empty::<&str>()), "in.()");
    }
}
