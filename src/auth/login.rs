//
//  graph-login
//  auth/login.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Login Flow
//!
//! [`LoginHandler::login`] decides whether an inbound web request is
//! authenticated. The first matching transition wins:
//!
//! 1. **Session check**: the session carries an id and a token, the user
//!    exists, and the token still validates live.
//! 2. **Redirect exchange**: the request carries an OAuth `code` that
//!    exchanges for a token. The profile is fetched, the user is created on
//!    first login, and a [`SessionGrant`] is returned for the caller to
//!    persist.
//! 3. Otherwise the request stays unauthenticated.
//!
//! The handler never writes into the caller's session; persisting the
//! returned grant is the caller's job.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::oauth::{get_access_token_from_code, validate_access_token, AppCredentials, TokenGrant};
use super::store::{NewUser, UserRecord, UserStore};
use super::tasks::TaskDispatcher;
use crate::api::{GraphApi, GraphClient, GraphError};

/// Session fields carried between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Option<String>,
    pub access_token: Option<String>,
}

/// Session fields produced by a successful code exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionGrant {
    pub user_id: String,
    pub access_token: String,
    /// Token lifetime in seconds as reported at exchange time; 0 when unknown
    #[serde(default)]
    pub expires: i64,
}

impl From<SessionGrant> for Session {
    fn from(grant: SessionGrant) -> Self {
        Self {
            user_id: Some(grant.user_id),
            access_token: Some(grant.access_token),
        }
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// The existing session is still valid.
    SessionValid { user: UserRecord },

    /// A redirect code was exchanged for a new session.
    RedirectExchanged {
        user: UserRecord,
        session: SessionGrant,
        /// True when this login created the user record
        created: bool,
    },

    /// Neither the session nor the request authenticated the user.
    Unauthenticated,
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }

    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Self::SessionValid { user } | Self::RedirectExchanged { user, .. } => Some(user),
            Self::Unauthenticated => None,
        }
    }
}

/// Errors that abort a login attempt.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("User store error: {0:#}")]
    Store(anyhow::Error),

    #[error("Profile response did not contain an id")]
    MissingProfileId,
}

/// Orchestrates session checks and OAuth code exchanges.
pub struct LoginHandler<'a> {
    client: &'a GraphClient,
    app: &'a AppCredentials,
    users: &'a dyn UserStore,
    tasks: &'a dyn TaskDispatcher,
}

impl<'a> LoginHandler<'a> {
    pub fn new(
        client: &'a GraphClient,
        app: &'a AppCredentials,
        users: &'a dyn UserStore,
        tasks: &'a dyn TaskDispatcher,
    ) -> Self {
        Self {
            client,
            app,
            users,
            tasks,
        }
    }

    /// Runs the login state machine for one inbound request.
    ///
    /// # Parameters
    ///
    /// * `session` - The caller's current session fields
    /// * `code` - The `code` query parameter of the inbound request, if any
    pub async fn login(&self, session: &Session, code: Option<&str>) -> Result<LoginOutcome, LoginError> {
        if let Some(user) = self.login_with_session(session).await? {
            return Ok(LoginOutcome::SessionValid { user });
        }

        if let Some(code) = code.filter(|c| !c.is_empty()) {
            return self.login_from_redirect(code).await;
        }

        Ok(LoginOutcome::Unauthenticated)
    }

    async fn login_with_session(&self, session: &Session) -> Result<Option<UserRecord>, LoginError> {
        let (Some(user_id), Some(token)) = (&session.user_id, &session.access_token) else {
            return Ok(None);
        };

        let Some(user) = self.users.find(user_id).await.map_err(LoginError::Store)? else {
            return Ok(None);
        };

        if validate_access_token(self.client, token).await {
            Ok(Some(user))
        } else {
            tracing::debug!("Session token for user {} no longer validates", user_id);
            Ok(None)
        }
    }

    async fn login_from_redirect(&self, code: &str) -> Result<LoginOutcome, LoginError> {
        let response = match get_access_token_from_code(self.client, code, self.app).await {
            Ok(response) => response,
            Err(GraphError::Api(err)) => {
                tracing::warn!("Code exchange rejected: {}", err);
                return Ok(LoginOutcome::Unauthenticated);
            }
            Err(err) => return Err(err.into()),
        };

        let Some(grant) = TokenGrant::from_response(&response) else {
            tracing::warn!("Code exchange returned no access token");
            return Ok(LoginOutcome::Unauthenticated);
        };

        let api = GraphApi::new(self.client.clone(), grant.access_token.clone());
        let profile = api
            .get_object("me", &[])
            .await?
            .into_json()
            .ok_or(LoginError::MissingProfileId)?;

        let new_user = NewUser::from_profile(
            &profile,
            Some(grant.access_token.clone()),
            grant.expires_secs(),
        )
        .ok_or(LoginError::MissingProfileId)?;

        let session = SessionGrant {
            user_id: new_user.id.clone(),
            access_token: grant.access_token.clone(),
            expires: grant.expires_secs(),
        };

        let (user, created) = match self.users.find(&new_user.id).await.map_err(LoginError::Store)? {
            Some(user) => (user, false),
            None => {
                let user = self.users.create(new_user).await.map_err(LoginError::Store)?;
                self.tasks.fetch_all(&user.id, &grant.access_token);
                (user, true)
            }
        };

        tracing::debug!("User {} logged in (created: {})", user.id, created);
        Ok(LoginOutcome::RedirectExchanged {
            user,
            session,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockito::Matcher;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryUsers {
        users: Mutex<Vec<UserRecord>>,
        creates: Mutex<usize>,
    }

    impl MemoryUsers {
        fn with(user: UserRecord) -> Self {
            let store = Self::default();
            store.users.lock().unwrap().push(user);
            store
        }
    }

    #[async_trait]
    impl UserStore for MemoryUsers {
        async fn find(&self, id: &str) -> anyhow::Result<Option<UserRecord>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn create(&self, user: NewUser) -> anyhow::Result<UserRecord> {
            *self.creates.lock().unwrap() += 1;
            let record = UserRecord {
                id: user.id,
                access_token: user.access_token,
                access_token_expires: user.access_token_expires,
                profile: user.profile,
                created_at: Utc::now(),
            };
            self.users.lock().unwrap().push(record.clone());
            Ok(record)
        }
    }

    #[derive(Default)]
    struct RecordingTasks {
        dispatched: Mutex<Vec<String>>,
    }

    impl TaskDispatcher for RecordingTasks {
        fn fetch_all(&self, user_id: &str, _access_token: &str) {
            self.dispatched.lock().unwrap().push(user_id.to_string());
        }
    }

    fn record(id: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            access_token: Some("old".to_string()),
            access_token_expires: 0,
            profile: Default::default(),
            created_at: Utc::now(),
        }
    }

    fn session(id: &str, token: &str) -> Session {
        Session {
            user_id: Some(id.to_string()),
            access_token: Some(token.to_string()),
        }
    }

    async fn debug_token(server: &mut mockito::ServerGuard, valid: bool) -> mockito::Mock {
        server
            .mock("GET", "/debug_token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"data": {{"is_valid": {}}}}}"#, valid))
            .create_async()
            .await
    }

    async fn code_exchange(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/oauth/access_token")
            .match_query(Matcher::UrlEncoded("code".into(), "good-code".into()))
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("access_token=fresh&expires=5183999")
            .create_async()
            .await
    }

    async fn profile(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/me")
            .match_query(Matcher::UrlEncoded("access_token".into(), "fresh".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "123", "name": "Unit Test", "email": "unit@test.com"}"#)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_valid_session_authenticates() {
        let mut server = mockito::Server::new_async().await;
        let _debug = debug_token(&mut server, true).await;

        let client = GraphClient::new().unwrap().with_base_url(server.url());
        let app = AppCredentials::default();
        let users = MemoryUsers::with(record("123"));
        let tasks = RecordingTasks::default();
        let handler = LoginHandler::new(&client, &app, &users, &tasks);

        let outcome = handler.login(&session("123", "old"), None).await.unwrap();
        assert!(matches!(outcome, LoginOutcome::SessionValid { ref user } if user.id == "123"));
    }

    #[tokio::test]
    async fn test_invalid_session_token_does_not_authenticate() {
        let mut server = mockito::Server::new_async().await;
        let _debug = debug_token(&mut server, false).await;

        let client = GraphClient::new().unwrap().with_base_url(server.url());
        let app = AppCredentials::default();
        let users = MemoryUsers::with(record("123"));
        let tasks = RecordingTasks::default();
        let handler = LoginHandler::new(&client, &app, &users, &tasks);

        let outcome = handler.login(&session("123", "old"), None).await.unwrap();
        assert_eq!(outcome, LoginOutcome::Unauthenticated);
    }

    #[tokio::test]
    async fn test_invalid_session_falls_through_to_code_exchange() {
        let mut server = mockito::Server::new_async().await;
        let debug = debug_token(&mut server, false).await;
        let exchange = code_exchange(&mut server).await;
        let _profile = profile(&mut server).await;

        let client = GraphClient::new().unwrap().with_base_url(server.url());
        let app = AppCredentials::default();
        let users = MemoryUsers::with(record("123"));
        let tasks = RecordingTasks::default();
        let handler = LoginHandler::new(&client, &app, &users, &tasks);

        let outcome = handler
            .login(&session("123", "old"), Some("good-code"))
            .await
            .unwrap();

        debug.assert_async().await;
        exchange.assert_async().await;
        match outcome {
            LoginOutcome::RedirectExchanged {
                user,
                session,
                created,
            } => {
                assert!(!created);
                assert_eq!(user.id, "123");
                assert_eq!(session.access_token, "fresh");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(tasks.dispatched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_without_user_skips_validation() {
        let mut server = mockito::Server::new_async().await;
        let debug = server
            .mock("GET", "/debug_token")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = GraphClient::new().unwrap().with_base_url(server.url());
        let app = AppCredentials::default();
        let users = MemoryUsers::default();
        let tasks = RecordingTasks::default();
        let handler = LoginHandler::new(&client, &app, &users, &tasks);

        let outcome = handler.login(&session("404", "tok"), None).await.unwrap();
        assert!(!outcome.is_authenticated());
        debug.assert_async().await;
    }

    #[tokio::test]
    async fn test_new_user_created_once_and_task_dispatched_once() {
        let mut server = mockito::Server::new_async().await;
        let _exchange = code_exchange(&mut server).await;
        let _profile = profile(&mut server).await;

        let client = GraphClient::new().unwrap().with_base_url(server.url());
        let app = AppCredentials::default();
        let users = MemoryUsers::default();
        let tasks = RecordingTasks::default();
        let handler = LoginHandler::new(&client, &app, &users, &tasks);

        let outcome = handler
            .login(&Session::default(), Some("good-code"))
            .await
            .unwrap();

        match outcome {
            LoginOutcome::RedirectExchanged {
                user,
                session,
                created,
            } => {
                assert!(created);
                assert_eq!(user.id, "123");
                assert_eq!(user.name(), Some("Unit Test"));
                assert!(!user.profile.contains_key("id"));
                assert_eq!(
                    session,
                    SessionGrant {
                        user_id: "123".to_string(),
                        access_token: "fresh".to_string(),
                        expires: 5183999,
                    }
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert_eq!(*users.creates.lock().unwrap(), 1);
        assert_eq!(*tasks.dispatched.lock().unwrap(), vec!["123".to_string()]);
    }

    #[tokio::test]
    async fn test_existing_user_is_not_recreated() {
        let mut server = mockito::Server::new_async().await;
        let _exchange = code_exchange(&mut server).await;
        let _profile = profile(&mut server).await;

        let client = GraphClient::new().unwrap().with_base_url(server.url());
        let app = AppCredentials::default();
        let users = MemoryUsers::with(record("123"));
        let tasks = RecordingTasks::default();
        let handler = LoginHandler::new(&client, &app, &users, &tasks);

        let outcome = handler
            .login(&Session::default(), Some("good-code"))
            .await
            .unwrap();

        assert!(matches!(outcome, LoginOutcome::RedirectExchanged { created: false, .. }));
        assert_eq!(*users.creates.lock().unwrap(), 0);
        assert!(tasks.dispatched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_code_stays_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        let _exchange = server
            .mock("GET", "/oauth/access_token")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"message": "This authorization code has expired.", "code": 100}}"#)
            .create_async()
            .await;

        let client = GraphClient::new().unwrap().with_base_url(server.url());
        let app = AppCredentials::default();
        let users = MemoryUsers::default();
        let tasks = RecordingTasks::default();
        let handler = LoginHandler::new(&client, &app, &users, &tasks);

        let outcome = handler
            .login(&Session::default(), Some("expired"))
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Unauthenticated);
        assert_eq!(*users.creates.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_token_from_exchange_stays_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        let _exchange = server
            .mock("GET", "/oauth/access_token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("access_token=&expires=5")
            .create_async()
            .await;
        let me = server
            .mock("GET", "/me")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = GraphClient::new().unwrap().with_base_url(server.url());
        let app = AppCredentials::default();
        let users = MemoryUsers::default();
        let tasks = RecordingTasks::default();
        let handler = LoginHandler::new(&client, &app, &users, &tasks);

        let outcome = handler
            .login(&Session::default(), Some("good-code"))
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Unauthenticated);
        me.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_session_no_code() {
        let client = GraphClient::new().unwrap();
        let app = AppCredentials::default();
        let users = MemoryUsers::default();
        let tasks = RecordingTasks::default();
        let handler = LoginHandler::new(&client, &app, &users, &tasks);

        let outcome = handler.login(&Session::default(), None).await.unwrap();
        assert_eq!(outcome, LoginOutcome::Unauthenticated);
    }
}
