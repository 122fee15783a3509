use reqwest::cookie::Jar;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::config::{Config, JobResolvedConfig};
use crate::error::{JobError, LeonardoError};
use crate::leonardo::job::{JobDriver, MotionResult};
use crate::leonardo::policy::RetryPolicy;
use crate::leonardo::ratelimit::RateLimiter;
use crate::leonardo::retry::Retrier;
use crate::leonardo::session::{CookieStore, SessionManager, dump_cookies, load_cookies};
use crate::leonardo::transport::{HttpTransport, Transport};

/// Leonardo web client. One instance owns one browser session; all of its
/// calls share a rate limiter and a bearer token.
pub struct LeonardoClient {
    retrier: Arc<Retrier>,
    session: Arc<SessionManager>,
    jar: Arc<Jar>,
    cookie_store: Arc<dyn CookieStore>,
    app_url: Url,
    job: JobResolvedConfig,
}

impl LeonardoClient {
    pub fn new(cfg: &Config, cookie_store: Arc<dyn CookieStore>) -> Result<Self, LeonardoError> {
        let jar = Arc::new(Jar::default());
        let transport = HttpTransport::new(&cfg.client(), jar.clone(), cfg.basic.debug_artifacts())?;
        Ok(Self::with_transport(cfg, Arc::new(transport), jar, cookie_store))
    }

    /// Build on top of an arbitrary transport sharing `jar`.
    pub fn with_transport(
        cfg: &Config,
        transport: Arc<dyn Transport>,
        jar: Arc<Jar>,
        cookie_store: Arc<dyn CookieStore>,
    ) -> Self {
        let client = cfg.client();
        let retrier = Arc::new(Retrier::new(
            transport,
            RateLimiter::new(client.wait),
            RetryPolicy::new(client.retry_max_times, client.backoff),
            cfg.basic.debug_artifacts(),
        ));
        Self {
            session: Arc::new(SessionManager::new(retrier.clone())),
            retrier,
            jar,
            cookie_store,
            app_url: client.app_url,
            job: cfg.job(),
        }
    }

    /// Load the stored cookie, authenticate and validate the account identity.
    pub async fn start(&self, cancel: &CancellationToken) -> Result<(), LeonardoError> {
        let cookie = self.cookie_store.get_cookie().await?;
        if cookie.is_empty() {
            return Err(LeonardoError::Cookie("cookie is empty".into()));
        }
        let loaded = load_cookies(&self.jar, &self.app_url, &cookie)?;
        info!(cookies = loaded, "Loaded browser cookies");

        self.session.ensure_authenticated(cancel).await
    }

    /// Persist the (possibly rotated) session cookies.
    pub async fn stop(&self) -> Result<(), LeonardoError> {
        let cookie = dump_cookies(&self.jar, &self.app_url)?;
        if cookie.is_empty() {
            warn!("Cookie jar is empty, keeping the stored cookie");
            return Ok(());
        }
        self.cookie_store.set_cookie(&cookie).await
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.user_id()
    }

    /// Upload a local `.jpg`/`.jpeg`/`.png` and return its asset id.
    pub async fn upload(&self, path: &Path, cancel: &CancellationToken) -> Result<String, JobError> {
        self.driver().upload(path, cancel).await
    }

    /// Submit a motion job for an uploaded asset and wait for its video.
    pub async fn create_motion(
        &self,
        image_id: &str,
        motion_strength: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<MotionResult, JobError> {
        self.driver()
            .create_motion(image_id, motion_strength, cancel)
            .await
    }

    pub async fn animate(
        &self,
        path: &Path,
        motion_strength: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<MotionResult, JobError> {
        let image_id = self.upload(path, cancel).await?;
        self.create_motion(&image_id, motion_strength, cancel).await
    }

    fn driver(&self) -> JobDriver<'_> {
        JobDriver {
            retrier: &self.retrier,
            session: &self.session,
            cfg: &self.job,
        }
    }
}
