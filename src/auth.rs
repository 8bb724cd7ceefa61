//! Session authentication, passed explicitly to whoever needs it.

use log::{info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::api::types::{Credentials, Registration};
use crate::api::{ApiClient, ApiError};

/// What the rest of the client may do with the session.
pub trait Auth {
    fn is_authenticated(&self) -> bool;
    fn current_token(&self) -> Option<&str>;
    fn login(&mut self, credentials: &Credentials) -> Result<(), ApiError>;
    fn logout(&mut self);
}

/// Bearer token persisted between runs.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(data_dir: &Path) -> Self {
        TokenStore {
            path: data_dir.join("token"),
        }
    }

    pub fn load(&self) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => {
                let token = s.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)
    }

    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[derive(Debug)]
pub struct AuthContext {
    client: ApiClient,
    store: TokenStore,
    token: Option<String>,
}

impl AuthContext {
    pub fn new(client: ApiClient, store: TokenStore) -> Self {
        let token = store.load().unwrap_or_else(|e| {
            warn!("could not read saved token: {}", e);
            None
        });
        AuthContext {
            client,
            store,
            token,
        }
    }

    fn adopt(&mut self, token: String) {
        if let Err(e) = self.store.save(&token) {
            warn!("could not persist token: {}", e);
        }
        self.token = Some(token);
    }

    pub fn register(&mut self, registration: &Registration) -> Result<(), ApiError> {
        let token = self.client.register(registration)?;
        info!("registered {}", registration.username);
        self.adopt(token);
        Ok(())
    }

    /// Forget the token locally without contacting the backend.
    pub fn invalidate(&mut self) {
        if self.token.take().is_some() {
            info!("discarding session token");
        }
        if let Err(e) = self.store.clear() {
            warn!("could not remove saved token: {}", e);
        }
    }

    /// Drop the session when the backend rejected our token.
    pub fn observe(&mut self, err: &ApiError) {
        if matches!(err, ApiError::Unauthorized) {
            self.invalidate();
        }
    }
}

impl Auth for AuthContext {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn current_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn login(&mut self, credentials: &Credentials) -> Result<(), ApiError> {
        let token = self.client.login(credentials)?;
        info!("logged in as {}", credentials.username);
        self.adopt(token);
        Ok(())
    }

    fn logout(&mut self) {
        if let Some(token) = &self.token {
            if let Err(e) = self.client.logout(token) {
                warn!("logout request failed: {}", e);
            }
        }
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::scripted;

    fn credentials() -> Credentials {
        Credentials {
            username: "grace".into(),
            password: "hunter2".into(),
        }
    }

    #[test]
    fn login_persists_token() {
        let dir = tempfile::tempdir().unwrap();
        let (transport, client) = scripted();
        transport.reply(200, r#"{"token": "abc"}"#);

        let mut auth = AuthContext::new(client.clone(), TokenStore::new(dir.path()));
        assert!(!auth.is_authenticated());
        auth.login(&credentials()).unwrap();
        assert_eq!(auth.current_token(), Some("abc"));

        let reopened = AuthContext::new(client, TokenStore::new(dir.path()));
        assert_eq!(reopened.current_token(), Some("abc"));
    }

    #[test]
    fn failed_login_stays_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let (transport, client) = scripted();
        transport.reply(400, r#"{"detail": "bad credentials"}"#);

        let mut auth = AuthContext::new(client, TokenStore::new(dir.path()));
        assert!(auth.login(&credentials()).is_err());
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn logout_clears_even_when_backend_fails() {
        let dir = tempfile::tempdir().unwrap();
        TokenStore::new(dir.path()).save("old").unwrap();
        let (transport, client) = scripted();
        transport.fail();

        let mut auth = AuthContext::new(client, TokenStore::new(dir.path()));
        assert!(auth.is_authenticated());
        auth.logout();
        assert!(!auth.is_authenticated());
        assert_eq!(TokenStore::new(dir.path()).load().unwrap(), None);
        assert_eq!(
            transport.requests.borrow()[0].bearer.as_deref(),
            Some("old")
        );
    }

    #[test]
    fn unauthorized_response_discards_token() {
        let dir = tempfile::tempdir().unwrap();
        TokenStore::new(dir.path()).save("expired").unwrap();
        let (_, client) = scripted();
        let mut auth = AuthContext::new(client, TokenStore::new(dir.path()));

        auth.observe(&ApiError::Status {
            code: 500,
            reason: String::new(),
        });
        assert!(auth.is_authenticated());

        auth.observe(&ApiError::Unauthorized);
        assert!(!auth.is_authenticated());
        assert_eq!(TokenStore::new(dir.path()).load().unwrap(), None);
    }

    #[test]
    fn register_adopts_token() {
        let dir = tempfile::tempdir().unwrap();
        let (transport, client) = scripted();
        transport.reply(201, r#"{"token": "new"}"#);

        let mut auth = AuthContext::new(client, TokenStore::new(dir.path()));
        auth.register(&Registration {
            username: "ida".into(),
            email: "ida@example.com".into(),
            password: "pw".into(),
        })
        .unwrap();
        assert_eq!(auth.current_token(), Some("new"));
        assert_eq!(transport.requests.borrow()[0].path, "/accounts/register");
    }
}
