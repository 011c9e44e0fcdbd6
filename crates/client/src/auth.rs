//! Authentication modes.
//!
//! Two modes exist and the choice is made once, when the client is built:
//! a developer (or otherwise pre-issued) access token used as-is, or an
//! enterprise application that exchanges its client credentials for a token
//! through the client-credentials grant.
//!
//! Token refresh is out of scope: a token lives as long as the client does.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{AuthType, AuthUrl, ClientId, ClientSecret, TokenResponse, TokenUrl};
use std::fmt::{Debug, Formatter};

/// Box never sends the enterprise grant through this endpoint, but the OAuth
/// client requires one.
const AUTHORIZE_URL: &str = "https://account.box.com/api/oauth2/authorize";

#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Basic client with a pre-issued access token.
    DeveloperToken(String),
    /// Enterprise application authenticating as its service account.
    Enterprise { client_id: String, client_secret: String, enterprise_id: String },
}

impl Auth {
    pub fn is_basic(&self) -> bool {
        matches!(self, Self::DeveloperToken(_))
    }

    /// Obtain an access token for API calls.
    pub(crate) async fn access_token(&self, token_url: &str) -> Result<String> {
        match self {
            Self::DeveloperToken(token) => Ok(token.clone()),
            Self::Enterprise { client_id, client_secret, enterprise_id } => {
                let auth_url = AuthUrl::new(AUTHORIZE_URL.to_string())
                    .or_raise(|| ErrorKind::InvalidRequest(format!("authorize URL {AUTHORIZE_URL}")))?;
                let token_url = TokenUrl::new(token_url.to_string())
                    .or_raise(|| ErrorKind::InvalidRequest(format!("token URL {token_url}")))?;
                // Box reads the credentials from the form body, not a Basic header.
                let oauth_client = BasicClient::new(
                    ClientId::new(client_id.clone()),
                    Some(ClientSecret::new(client_secret.clone())),
                    auth_url,
                    Some(token_url),
                )
                .set_auth_type(AuthType::RequestBody);

                let token = oauth_client
                    .exchange_client_credentials()
                    .add_extra_param("box_subject_type", "enterprise")
                    .add_extra_param("box_subject_id", enterprise_id.clone())
                    .request_async(async_http_client)
                    .await
                    .or_raise(|| ErrorKind::Authentication)
                    .inspect_err(|_| tracing::warn!(enterprise_id = %enterprise_id, "Token request rejected"))?;
                tracing::debug!(enterprise_id = %enterprise_id, "Obtained enterprise access token");
                Ok(token.access_token().secret().clone())
            },
        }
    }
}

// Never print secrets.
impl Debug for Auth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeveloperToken(_) => f.debug_tuple("DeveloperToken").field(&"<redacted>").finish(),
            Self::Enterprise { client_id, enterprise_id, .. } => f
                .debug_struct("Enterprise")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("enterprise_id", enterprise_id)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let basic = Auth::DeveloperToken("super-secret-token".to_string());
        assert!(!format!("{basic:?}").contains("super-secret-token"));
        let enterprise = Auth::Enterprise {
            client_id: "client".to_string(),
            client_secret: "hunter2".to_string(),
            enterprise_id: "777".to_string(),
        };
        let printed = format!("{enterprise:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("777"));
    }

    #[test]
    fn test_is_basic() {
        assert!(Auth::DeveloperToken("t".to_string()).is_basic());
        assert!(!enterprise().is_basic());
    }

    fn enterprise() -> Auth {
        Auth::Enterprise { client_id: "c".to_string(), client_secret: "s".to_string(), enterprise_id: "e".to_string() }
    }

    #[tokio::test]
    async fn test_developer_token_needs_no_request() {
        // Unroutable URL: any request would fail.
        let token = Auth::DeveloperToken("abc".to_string()).access_token("http://0.0.0.0:1/token").await.unwrap();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_enterprise_token_failure_is_authentication() {
        let err = enterprise().access_token("http://0.0.0.0:1/token").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_enterprise_rejects_malformed_token_url() {
        let err = enterprise().access_token("not a url").await.unwrap_err();
        assert!(matches!(*err, ErrorKind::InvalidRequest(_)));
    }
}
