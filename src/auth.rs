use tracing::{info, warn};

use crate::api::ApiClient;
use crate::db::KeyValueStore;
use crate::error::Result;
use crate::models::User;

pub const SESSION_KEY: &str = "session";

/// The parts of the backend a session talks to.
pub trait SessionBackend {
    fn set_session(&mut self, token: Option<String>);
    fn current_user(&self) -> Result<User>;
    fn logout(&self) -> Result<()>;
}

impl SessionBackend for ApiClient {
    fn set_session(&mut self, token: Option<String>) {
        ApiClient::set_session(self, token)
    }

    fn current_user(&self) -> Result<User> {
        ApiClient::current_user(self)
    }

    fn logout(&self) -> Result<()> {
        ApiClient::logout(self)
    }
}

/// Who is signed in, if anyone.
#[derive(Debug, Default)]
pub struct AuthSession {
    user: Option<User>,
    error: Option<String>,
}

impl AuthSession {
    /// Restore a stored session. Never fails; problems end up in `error()`.
    pub fn init<S: KeyValueStore, B: SessionBackend>(storage: &S, backend: &mut B) -> Self {
        let token = match storage.load(SESSION_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not read stored session");
                return Self {
                    user: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let Some(token) = token else {
            return Self::default();
        };

        backend.set_session(Some(token));
        match backend.current_user() {
            Ok(user) => Self {
                user: Some(user),
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "stored session could not be verified");
                Self {
                    user: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Store the token from the OAuth redirect and confirm it with the backend.
    pub fn login<S: KeyValueStore, B: SessionBackend>(
        &mut self,
        storage: &S,
        backend: &mut B,
        token: &str,
    ) -> Result<&User> {
        let token = token.trim();
        if token.is_empty() {
            return Err(crate::error::Error::InvalidInput(
                "session token is empty".to_string(),
            ));
        }

        backend.set_session(Some(token.to_string()));
        let user = match backend.current_user() {
            Ok(user) => user,
            Err(e) => {
                backend.set_session(None);
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        storage.save(SESSION_KEY, token)?;
        info!(user = %user.name, "logged in");
        self.error = None;
        Ok(self.user.insert(user))
    }

    /// Local state is cleared even when the backend cannot be reached.
    pub fn logout<S: KeyValueStore, B: SessionBackend>(
        &mut self,
        storage: &S,
        backend: &mut B,
    ) -> Result<()> {
        if let Err(e) = backend.logout() {
            warn!(error = %e, "backend logout failed");
        }
        backend.set_session(None);
        self.user = None;
        self.error = None;
        storage.remove(SESSION_KEY)?;
        info!("logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::Error;
    use std::cell::Cell;

    fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            profile_picture: None,
            interests: vec![],
            preferences: vec![],
            role: Some("student".to_string()),
        }
    }

    struct FakeBackend {
        accepts: &'static str,
        session: Option<String>,
        logout_fails: bool,
        logout_calls: Cell<u32>,
    }

    impl FakeBackend {
        fn accepting(token: &'static str) -> Self {
            Self {
                accepts: token,
                session: None,
                logout_fails: false,
                logout_calls: Cell::new(0),
            }
        }
    }

    impl SessionBackend for FakeBackend {
        fn set_session(&mut self, token: Option<String>) {
            self.session = token;
        }

        fn current_user(&self) -> Result<User> {
            match self.session.as_deref() {
                Some(t) if t == self.accepts => Ok(user()),
                Some(_) => Err(Error::Api {
                    status: 401,
                    message: "Unauthorized".to_string(),
                }),
                None => Err(Error::NotAuthenticated),
            }
        }

        fn logout(&self) -> Result<()> {
            self.logout_calls.set(self.logout_calls.get() + 1);
            if self.logout_fails {
                Err(Error::InvalidInput("offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    mod init_tests {
        use super::*;

        #[test]
        fn no_token_is_anonymous() {
            let db = setup_db();
            let mut backend = FakeBackend::accepting("good");
            let session = AuthSession::init(&db, &mut backend);
            assert!(!session.is_authenticated());
            assert!(session.error().is_none());
            assert!(backend.session.is_none());
        }

        #[test]
        fn valid_token_restores_user() {
            let db = setup_db();
            db.set(SESSION_KEY, "good").unwrap();
            let mut backend = FakeBackend::accepting("good");
            let session = AuthSession::init(&db, &mut backend);
            assert!(session.is_authenticated());
            assert_eq!(session.user().unwrap().name, "Asha");
        }

        #[test]
        fn rejected_token_records_error() {
            let db = setup_db();
            db.set(SESSION_KEY, "stale").unwrap();
            let mut backend = FakeBackend::accepting("good");
            let session = AuthSession::init(&db, &mut backend);
            assert!(!session.is_authenticated());
            assert!(session.error().unwrap().contains("401"));
        }
    }

    mod login_tests {
        use super::*;

        #[test]
        fn login_persists_token() {
            let db = setup_db();
            let mut backend = FakeBackend::accepting("good");
            let mut session = AuthSession::default();
            let user = session.login(&db, &mut backend, " good ").unwrap();
            assert_eq!(user.id, "u1");
            assert_eq!(db.get(SESSION_KEY).unwrap(), Some("good".to_string()));
            assert!(session.is_authenticated());
        }

        #[test]
        fn bad_token_is_not_stored() {
            let db = setup_db();
            let mut backend = FakeBackend::accepting("good");
            let mut session = AuthSession::default();
            assert!(session.login(&db, &mut backend, "bad").is_err());
            assert!(db.get(SESSION_KEY).unwrap().is_none());
            assert!(backend.session.is_none());
            assert!(session.error().is_some());
        }

        #[test]
        fn empty_token_is_invalid() {
            let db = setup_db();
            let mut backend = FakeBackend::accepting("good");
            let mut session = AuthSession::default();
            let result = session.login(&db, &mut backend, "   ");
            assert!(matches!(result, Err(Error::InvalidInput(_))));
        }
    }

    mod logout_tests {
        use super::*;

        #[test]
        fn logout_clears_everything() {
            let db = setup_db();
            db.set(SESSION_KEY, "good").unwrap();
            let mut backend = FakeBackend::accepting("good");
            let mut session = AuthSession::init(&db, &mut backend);

            session.logout(&db, &mut backend).unwrap();

            assert!(!session.is_authenticated());
            assert!(db.get(SESSION_KEY).unwrap().is_none());
            assert_eq!(backend.logout_calls.get(), 1);
        }

        #[test]
        fn logout_survives_backend_failure() {
            let db = setup_db();
            db.set(SESSION_KEY, "good").unwrap();
            let mut backend = FakeBackend::accepting("good");
            let mut session = AuthSession::init(&db, &mut backend);
            backend.logout_fails = true;

            session.logout(&db, &mut backend).unwrap();

            assert!(!session.is_authenticated());
            assert!(backend.session.is_none());
            assert!(db.get(SESSION_KEY).unwrap().is_none());
        }
    }
}
