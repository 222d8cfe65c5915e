/// Access to a streaming service's credentials.
///
/// Owned by whoever performs the service login. Providers only read from it
/// and call [`Credentials::deauthenticate`] once the service reports that the
/// credential is no longer valid; refreshing it is up to the owner.
pub trait Credentials: Send + Sync {
    fn app_id(&self) -> Option<String> {
        None
    }

    fn access_token(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.access_token().is_some_and(|token| !token.is_empty())
    }

    fn deauthenticate(&self);
}
