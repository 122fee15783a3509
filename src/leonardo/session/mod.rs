//! Cookie-derived bearer session.
//!
//! The manager owns the token and its refresh deadline. "Check expiry, maybe
//! refresh" runs under one lock so concurrent callers trigger a single session
//! fetch. The account id is resolved once, on the first successful
//! authentication, and never changes afterwards.

mod cookies;
mod identity;

pub use cookies::{CookieStore, FileCookieStore, dump_cookies, load_cookies};
pub use identity::TokenClaims;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leonai_schema::{GraphqlRequest, SessionDescriptor, UserDetailsData};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::LeonardoError;
use crate::leonardo::retry::{Authenticator, Retrier};
use crate::leonardo::transport::{ApiRequest, SESSION_PATH};

#[derive(Debug, Clone)]
struct Session {
    bearer_token: String,
    /// Valid strictly before this instant.
    refresh_at: Instant,
}

pub struct SessionManager {
    retrier: Arc<Retrier>,
    state: Mutex<Option<Session>>,
    user_id: OnceCell<String>,
}

impl SessionManager {
    pub fn new(retrier: Arc<Retrier>) -> Self {
        Self {
            retrier,
            state: Mutex::new(None),
            user_id: OnceCell::new(),
        }
    }

    /// Account id validated at first authentication.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.get().map(String::as_str)
    }

    /// No-op while the held token is before its refresh deadline; otherwise
    /// fetches a new session. The first success also validates the identity.
    pub async fn ensure_authenticated(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(), LeonardoError> {
        {
            let mut state = self.lock_state(cancel).await?;
            let fresh = state
                .as_ref()
                .is_some_and(|s| Instant::now() < s.refresh_at);
            if !fresh {
                *state = Some(self.fetch_session(cancel).await?);
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(LeonardoError::Cancelled),
            resolved = self.user_id.get_or_try_init(|| self.resolve_user_id(cancel)) => {
                resolved.map(|_| ())
            }
        }
    }

    async fn lock_state(
        &self,
        cancel: &CancellationToken,
    ) -> Result<tokio::sync::MutexGuard<'_, Option<Session>>, LeonardoError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(LeonardoError::Cancelled),
            guard = self.state.lock() => Ok(guard),
        }
    }

    async fn fetch_session(&self, cancel: &CancellationToken) -> Result<Session, LeonardoError> {
        let reply = self
            .retrier
            .call::<SessionDescriptor>(&ApiRequest::get(SESSION_PATH), None, cancel, "session")
            .await?;
        let descriptor = reply.data;
        if descriptor.access_token.is_empty() {
            return Err(LeonardoError::Auth("session returned an empty access token".into()));
        }

        let expiry = DateTime::from_timestamp(descriptor.access_token_expiry, 0)
            .ok_or_else(|| {
                LeonardoError::Auth(format!(
                    "invalid token expiry {}",
                    descriptor.access_token_expiry
                ))
            })?;
        let lifetime = refresh_after(Utc::now(), expiry);
        info!(
            lifetime_secs = lifetime.as_secs(),
            expiry = %expiry,
            "Leonardo session refreshed"
        );

        Ok(Session {
            bearer_token: descriptor.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }

    async fn resolve_user_id(&self, cancel: &CancellationToken) -> Result<String, LeonardoError> {
        let token = self
            .bearer_token(cancel)
            .await?
            .ok_or_else(|| LeonardoError::Auth("no session to validate".into()))?;
        let claims = TokenClaims::from_token(&token)?;

        let reply = self
            .retrier
            .graphql::<UserDetailsData>(
                &GraphqlRequest::user_details(&claims.sub),
                Some(self as &dyn Authenticator),
                cancel,
            )
            .await?;
        let lookup_id = reply
            .data
            .users
            .into_iter()
            .next()
            .map(|u| u.id)
            .unwrap_or_default();
        if lookup_id.is_empty() {
            return Err(LeonardoError::Auth(format!(
                "no user found for subject {}",
                claims.sub
            )));
        }
        if lookup_id != claims.account_id {
            return Err(LeonardoError::IdentityMismatch {
                token_user_id: claims.account_id,
                lookup_user_id: lookup_id,
            });
        }

        info!(user_id = %lookup_id, "Leonardo identity validated");
        Ok(lookup_id)
    }
}

#[async_trait]
impl Authenticator for SessionManager {
    async fn bearer_token(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, LeonardoError> {
        let state = self.lock_state(cancel).await?;
        Ok(state.as_ref().map(|s| s.bearer_token.clone()))
    }

    async fn reauthenticate(
        &self,
        stale: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<(), LeonardoError> {
        let mut state = self.lock_state(cancel).await?;
        let current = state.as_ref().map(|s| s.bearer_token.as_str());
        if current.is_some() && current != stale {
            debug!("Session already replaced by a concurrent caller");
            return Ok(());
        }
        *state = Some(self.fetch_session(cancel).await?);
        Ok(())
    }
}

/// 90% of the time left until `expiry`, zero when already past.
pub(crate) fn refresh_after(now: DateTime<Utc>, expiry: DateTime<Utc>) -> Duration {
    (expiry - now)
        .to_std()
        .map(|left| left.mul_f64(0.9))
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leonardo::policy::RetryPolicy;
    use crate::leonardo::ratelimit::RateLimiter;
    use crate::leonardo::testing::{
        SESSION_KEY, Scripted, ScriptedTransport, make_jwt, session_body, user_body,
    };
    use crate::utils::artifacts::DebugArtifacts;

    fn manager(transport: &Arc<ScriptedTransport>) -> Arc<SessionManager> {
        let retrier = Retrier::new(
            transport.clone(),
            RateLimiter::new(Duration::from_millis(1)),
            RetryPolicy::default(),
            DebugArtifacts::disabled(),
        );
        Arc::new(SessionManager::new(Arc::new(retrier)))
    }

    fn expiry_in(secs: i64) -> i64 {
        Utc::now().timestamp() + secs
    }

    #[test]
    fn refresh_after_is_ninety_percent_of_remaining() {
        let now = DateTime::from_timestamp(1_000, 0).unwrap();
        let expiry = DateTime::from_timestamp(1_100, 0).unwrap();
        assert_eq!(refresh_after(now, expiry), Duration::from_secs(90));
        assert_eq!(refresh_after(expiry, now), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn token_is_reused_until_ninety_percent_of_lifetime() {
        let transport = Arc::new(ScriptedTransport::new());
        let token = make_jwt("sub-1", "acct-1");
        transport.script(SESSION_KEY, [session_body(&token, expiry_in(1000))]);
        transport.script("GetUserDetails", [user_body("acct-1")]);
        let session = manager(&transport);
        let cancel = CancellationToken::new();

        session.ensure_authenticated(&cancel).await.unwrap();
        assert_eq!(session.user_id(), Some("acct-1"));

        tokio::time::advance(Duration::from_secs(890)).await;
        session.ensure_authenticated(&cancel).await.unwrap();
        assert_eq!(transport.count(SESSION_KEY), 1);

        tokio::time::advance(Duration::from_secs(20)).await;
        session.ensure_authenticated(&cancel).await.unwrap();
        assert_eq!(transport.count(SESSION_KEY), 2);
        // Identity is only checked once.
        assert_eq!(transport.count("GetUserDetails"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_refresh() {
        let transport = Arc::new(ScriptedTransport::new());
        let token = make_jwt("sub-1", "acct-1");
        transport.script(SESSION_KEY, [session_body(&token, expiry_in(1000))]);
        transport.script("GetUserDetails", [user_body("acct-1")]);
        let session = manager(&transport);
        let cancel = CancellationToken::new();

        session.ensure_authenticated(&cancel).await.unwrap();
        tokio::time::advance(Duration::from_secs(950)).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let session = session.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { session.ensure_authenticated(&cancel).await })
            })
            .collect();
        for task in futures::future::join_all(tasks).await {
            task.unwrap().unwrap();
        }

        assert_eq!(transport.count(SESSION_KEY), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn identity_mismatch_fails_authentication() {
        let transport = Arc::new(ScriptedTransport::new());
        let token = make_jwt("sub-1", "acct-1");
        transport.script(SESSION_KEY, [session_body(&token, expiry_in(1000))]);
        transport.script("GetUserDetails", [user_body("acct-2")]);
        let session = manager(&transport);

        let err = session
            .ensure_authenticated(&CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            LeonardoError::IdentityMismatch {
                token_user_id,
                lookup_user_id,
            } => {
                assert_eq!(token_user_id, "acct-1");
                assert_eq!(lookup_user_id, "acct-2");
            }
            other => panic!("expected identity mismatch, got {other:?}"),
        }
        assert!(session.user_id().is_none());

        let lookups = transport.calls();
        let lookup = lookups.iter().find(|c| c.key == "GetUserDetails").unwrap();
        assert_eq!(lookup.bearer.as_deref(), Some(token.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_token_is_an_auth_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(SESSION_KEY, [session_body("", expiry_in(1000))]);
        let session = manager(&transport);

        let err = session
            .ensure_authenticated(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LeonardoError::Auth(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_user_lookup_is_an_auth_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(SESSION_KEY, [session_body(&make_jwt("s", "a"), expiry_in(1000))]);
        transport.script(
            "GetUserDetails",
            [Scripted::Body(serde_json::json!({ "data": { "users": [] } }))],
        );
        let session = manager(&transport);

        let err = session
            .ensure_authenticated(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LeonardoError::Auth(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn reauthenticate_skips_when_token_already_rotated() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(
            SESSION_KEY,
            [
                session_body("tok-1", expiry_in(1000)),
                session_body("tok-2", expiry_in(1000)),
            ],
        );
        let session = manager(&transport);
        let cancel = CancellationToken::new();

        session.reauthenticate(None, &cancel).await.unwrap();
        assert_eq!(session.bearer_token(&cancel).await.unwrap().as_deref(), Some("tok-1"));

        session.reauthenticate(Some("tok-1"), &cancel).await.unwrap();
        assert_eq!(session.bearer_token(&cancel).await.unwrap().as_deref(), Some("tok-2"));

        // A caller still holding tok-1 must not force another fetch.
        session.reauthenticate(Some("tok-1"), &cancel).await.unwrap();
        assert_eq!(transport.count(SESSION_KEY), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_unblocks_a_caller_waiting_on_a_refresh() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(
            SESSION_KEY,
            [Scripted::Status(503), session_body("tok-2", expiry_in(1000))],
        );
        transport.script("GetUserDetails", [user_body("acct-1")]);
        let session = manager(&transport);

        // Holds the state lock through a 30s backoff on the session fetch.
        let refresh = {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .reauthenticate(None, &CancellationToken::new())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;

        let cancel = CancellationToken::new();
        let waiting = {
            let session = session.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                session
                    .retrier
                    .graphql::<UserDetailsData>(
                        &GraphqlRequest::user_details("sub-1"),
                        Some(&*session as &dyn Authenticator),
                        &cancel,
                    )
                    .await
            })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
        let cancelled_at = Instant::now();

        let err = waiting.await.unwrap().unwrap_err();
        assert!(err.is_cancelled(), "{err:?}");
        assert!(cancelled_at.elapsed() < Duration::from_secs(1));
        assert_eq!(transport.count("GetUserDetails"), 0);

        refresh.await.unwrap().unwrap();
        assert_eq!(transport.count(SESSION_KEY), 2);
        assert_eq!(
            session.bearer_token(&CancellationToken::new()).await.unwrap().as_deref(),
            Some("tok-2")
        );
    }
}
