//! Bounded retry loop around [`Transport`], driven by backon.
//!
//! Every attempt takes the client-wide rate-limit permit, sends once, and the
//! failure is classified with [`RetryAction`]. The attempt cap is shared by all
//! failure kinds, re-authentication included; the wait before each retry is
//! picked per failure from the [`RetryPolicy`] table.

use async_trait::async_trait;
use backon::Retryable;
use leonai_schema::{GraphqlRequest, GraphqlResponse};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::LeonardoError;
use crate::leonardo::policy::{RetryAction, RetryPolicy};
use crate::leonardo::ratelimit::RateLimiter;
use crate::leonardo::transport::{ApiRequest, Transport};
use crate::utils::artifacts::DebugArtifacts;

/// Source of the bearer token for authenticated calls.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Token currently held, if any. Waits out an in-flight refresh unless
    /// `cancel` fires first.
    async fn bearer_token(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, LeonardoError>;

    /// Replace the session unless it already moved past `stale`.
    async fn reauthenticate(
        &self,
        stale: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<(), LeonardoError>;
}

/// Decoded payload plus the raw body it came from.
#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub data: T,
    pub raw: Vec<u8>,
}

/// Bookkeeping shared by the attempts of one call.
#[derive(Debug, Default)]
struct CallState {
    attempts: AtomicUsize,
    backoff_rounds: AtomicUsize,
    reauth_pending: AtomicBool,
    last_bearer: Mutex<Option<String>>,
}

impl CallState {
    fn last_bearer(&self) -> Option<String> {
        self.last_bearer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember_bearer(&self, bearer: Option<&str>) {
        *self.last_bearer.lock().unwrap_or_else(PoisonError::into_inner) =
            bearer.map(str::to_string);
    }
}

pub struct Retrier {
    transport: Arc<dyn Transport>,
    limiter: RateLimiter,
    policy: RetryPolicy,
    artifacts: DebugArtifacts,
}

impl Retrier {
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: RateLimiter,
        policy: RetryPolicy,
        artifacts: DebugArtifacts,
    ) -> Self {
        Self {
            transport,
            limiter,
            policy,
            artifacts,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn artifacts(&self) -> &DebugArtifacts {
        &self.artifacts
    }

    /// Send with retries and return the raw body of the first successful attempt.
    ///
    /// Exhausting the cap returns the last error as observed.
    pub async fn call_raw(
        &self,
        request: &ApiRequest,
        auth: Option<&dyn Authenticator>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, LeonardoError> {
        let state = CallState::default();
        let state = &state;

        let op = move || self.attempt(request, auth, state, cancel);
        let retried = op
            .retry(self.policy.attempt_budget())
            .when(|err: &LeonardoError| RetryAction::for_error(err) != RetryAction::Fail)
            .adjust(|err: &LeonardoError, budget: Option<Duration>| {
                self.next_delay(request, err, budget, state)
            })
            .notify(|err: &LeonardoError, wait: Duration| {
                if RetryAction::for_error(err) == RetryAction::Reauthenticate {
                    warn!(path = %request.path, "Bearer token rejected, re-authenticating");
                    state.reauth_pending.store(true, Ordering::SeqCst);
                }
                warn!(
                    path = %request.path,
                    attempt = state.attempts.load(Ordering::SeqCst),
                    wait_secs = wait.as_secs(),
                    error = %err,
                    "Retrying Leonardo call"
                );
            });

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(LeonardoError::Cancelled),
            result = retried => result,
        }
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        auth: Option<&dyn Authenticator>,
        cancel: &CancellationToken,
        target: &'static str,
    ) -> Result<Reply<T>, LeonardoError> {
        let raw = self.call_raw(request, auth, cancel).await?;
        match serde_json::from_slice::<T>(&raw) {
            Ok(data) => Ok(Reply { data, raw }),
            Err(source) => {
                self.artifacts.write(&raw).await;
                Err(LeonardoError::Decode { target, source })
            }
        }
    }

    /// Send a GraphQL operation and unwrap its `data`.
    pub async fn graphql<T: DeserializeOwned + Default>(
        &self,
        query: &GraphqlRequest,
        auth: Option<&dyn Authenticator>,
        cancel: &CancellationToken,
    ) -> Result<Reply<T>, LeonardoError> {
        let request = ApiRequest::graphql(query)?;
        let reply: Reply<GraphqlResponse<T>> = self
            .call(&request, auth, cancel, query.operation_name)
            .await?;
        Ok(Reply {
            data: reply.data.data,
            raw: reply.raw,
        })
    }

    async fn attempt(
        &self,
        request: &ApiRequest,
        auth: Option<&dyn Authenticator>,
        state: &CallState,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, LeonardoError> {
        state.attempts.fetch_add(1, Ordering::SeqCst);

        let bearer = match auth {
            Some(auth) => {
                if state.reauth_pending.load(Ordering::SeqCst) {
                    auth.reauthenticate(state.last_bearer().as_deref(), cancel)
                        .await?;
                    state.reauth_pending.store(false, Ordering::SeqCst);
                }
                auth.bearer_token(cancel).await?
            }
            None => None,
        };
        state.remember_bearer(bearer.as_deref());

        let _permit = self.limiter.acquire(cancel).await?;
        self.transport.send(request, bearer.as_deref()).await
    }

    /// Wait before the next attempt, or `None` once the attempt budget is spent.
    fn next_delay(
        &self,
        request: &ApiRequest,
        err: &LeonardoError,
        budget: Option<Duration>,
        state: &CallState,
    ) -> Option<Duration> {
        if budget.is_none() {
            warn!(
                path = %request.path,
                attempt = state.attempts.load(Ordering::SeqCst),
                error = %err,
                "Leonardo call exhausted its attempts"
            );
            return None;
        }

        match RetryAction::for_error(err) {
            RetryAction::Immediate => Some(Duration::ZERO),
            RetryAction::Backoff | RetryAction::Reauthenticate => {
                let round = state.backoff_rounds.fetch_add(1, Ordering::SeqCst) + 1;
                Some(self.policy.backoff_delay(round))
            }
            RetryAction::Fail => None,
        }
    }
}
