//! Authentication for requests to the hub service

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::{RestClientError, RestClientResult};

/// How requests identify themselves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthMethod {
    /// `Authorization: ApiKey <token>`
    ApiKey(String),
    /// `Authorization: Bearer <jwt>`
    Bearer(String),
    #[default]
    None,
}

impl AuthMethod {
    pub fn api_key(token: impl Into<String>) -> Self {
        Self::ApiKey(token.into())
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Pick a method from optional credentials; supplying both is an error.
    pub fn from_credentials(
        api_key: Option<String>,
        bearer: Option<String>,
    ) -> RestClientResult<Self> {
        match (api_key, bearer) {
            (Some(_), Some(_)) => Err(RestClientError::Auth(
                "cannot use an API key and a bearer token together".to_string(),
            )),
            (Some(key), None) => Ok(Self::ApiKey(key)),
            (None, Some(token)) => Ok(Self::Bearer(token)),
            (None, None) => Ok(Self::None),
        }
    }

    /// Headers carrying these credentials
    pub fn headers(&self) -> RestClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = match self {
            AuthMethod::ApiKey(token) => format!("ApiKey {}", token),
            AuthMethod::Bearer(token) => format!("Bearer {}", token),
            AuthMethod::None => return Ok(headers),
        };
        let value = HeaderValue::from_str(&value)
            .map_err(|e| RestClientError::Auth(format!("invalid credential: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_auth_headers() {
        let headers = AuthMethod::api_key("test-token").headers().unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "ApiKey test-token");
    }

    #[test]
    fn test_bearer_auth_headers() {
        let headers = AuthMethod::bearer("jwt-token").headers().unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer jwt-token");
    }

    #[test]
    fn test_no_auth_adds_nothing() {
        assert!(AuthMethod::None.headers().unwrap().is_empty());
    }

    #[test]
    fn test_credentials_are_exclusive() {
        assert!(AuthMethod::from_credentials(Some("k".into()), Some("t".into())).is_err());
        assert_eq!(
            AuthMethod::from_credentials(None, Some("t".into())).unwrap(),
            AuthMethod::Bearer("t".into())
        );
    }

    #[test]
    fn test_invalid_header_value_is_reported() {
        let err = AuthMethod::api_key("bad\ntoken").headers().unwrap_err();
        assert!(matches!(err, RestClientError::Auth(_)));
    }
}
