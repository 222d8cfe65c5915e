use cover_providers::Credentials;
use std::sync::RwLock;
use tracing::warn;

/// Credential read from the environment at startup. Once a provider rejects
/// it, the token is dropped and the provider stops searching until restart.
pub(crate) struct StaticCredentials {
    service: &'static str,
    app_id: Option<String>,
    token: RwLock<Option<String>>,
}

impl StaticCredentials {
    pub(crate) fn new(service: &'static str, app_id: Option<String>, token: Option<String>) -> Self {
        Self {
            service,
            app_id,
            token: RwLock::new(token),
        }
    }
}

impl Credentials for StaticCredentials {
    fn app_id(&self) -> Option<String> {
        self.app_id.clone()
    }

    fn access_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|token| token.clone())
    }

    fn deauthenticate(&self) {
        match self.token.write() {
            Ok(mut token) => {
                if token.take().is_some() {
                    warn!(service = self.service, "Access token revoked, restart with a fresh token");
                }
            }
            Err(error) => warn!(service = self.service, %error, "Unable to revoke access token"),
        }
    }
}
