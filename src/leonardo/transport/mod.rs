//! One HTTP call per invocation: endpoint resolution, header profile, body
//! encoding and envelope classification. Waiting and retrying live in
//! [`super::retry`].

mod headers;

pub use headers::{BROWSER_USER_AGENT, HeaderProfile};

use async_trait::async_trait;
use leonai_schema::{GraphqlErrorEnvelope, GraphqlRequest};
use reqwest::Method;
use reqwest::cookie::Jar;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::ClientResolvedConfig;
use crate::error::LeonardoError;
use crate::leonardo::multipart::MultipartBody;
use crate::utils::artifacts::DebugArtifacts;
use crate::utils::logging::with_pretty_json_debug;

/// Logical path of the cookie-authenticated session fetch.
pub const SESSION_PATH: &str = "api/auth/session";
/// Logical path of the bearer-authenticated GraphQL endpoint.
pub const GRAPHQL_PATH: &str = "graphql";

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Vec<u8>),
    Multipart(MultipartBody),
}

impl RequestBody {
    pub fn content_type(&self) -> String {
        match self {
            RequestBody::Multipart(form) => form.content_type(),
            RequestBody::Empty | RequestBody::Json(_) => JSON_CONTENT_TYPE.to_string(),
        }
    }
}

/// A request that can be sent any number of times by the retry loop.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn post_json<T: Serialize + ?Sized>(
        path: impl Into<String>,
        body: &T,
    ) -> Result<Self, LeonardoError> {
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Json(serde_json::to_vec(body)?),
        })
    }

    pub fn graphql(request: &GraphqlRequest) -> Result<Self, LeonardoError> {
        Self::post_json(GRAPHQL_PATH, request)
    }

    pub fn post_multipart(url: impl Into<String>, form: MultipartBody) -> Self {
        Self {
            method: Method::POST,
            path: url.into(),
            body: RequestBody::Multipart(form),
        }
    }

    /// GraphQL operation name, when the body is a GraphQL envelope.
    pub fn operation_name(&self) -> Option<String> {
        let RequestBody::Json(raw) = &self.body else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_slice(raw).ok()?;
        value
            .get("operationName")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Sends exactly one request and returns the raw 2xx body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>)
    -> Result<Vec<u8>, LeonardoError>;
}

/// Base URLs selected by logical-path prefix.
#[derive(Debug, Clone)]
pub struct Endpoints {
    api: Url,
    app: Url,
}

impl Endpoints {
    pub fn new(api: Url, app: Url) -> Self {
        Self { api, app }
    }

    /// `http...` is taken verbatim, `api...` joins the app host, anything else
    /// joins the GraphQL host.
    pub fn resolve(&self, path: &str) -> Result<Url, LeonardoError> {
        if path.starts_with("http") {
            Ok(Url::parse(path)?)
        } else if path.starts_with("api") {
            Ok(self.app.join(path)?)
        } else {
            Ok(self.api.join(path)?)
        }
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoints: Endpoints,
    artifacts: DebugArtifacts,
}

impl HttpTransport {
    pub fn new(
        cfg: &ClientResolvedConfig,
        jar: Arc<Jar>,
        artifacts: DebugArtifacts,
    ) -> Result<Self, LeonardoError> {
        let mut builder = reqwest::Client::builder()
            .cookie_provider(jar)
            .connect_timeout(Duration::from_secs(10))
            .timeout(cfg.request_timeout);

        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            endpoints: Endpoints::new(cfg.api_url.clone(), cfg.app_url.clone()),
            artifacts,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Vec<u8>, LeonardoError> {
        let url = self.endpoints.resolve(&request.path)?;
        let content_type = request.body.content_type();
        let headers = HeaderProfile::select(&request.path, &content_type).headers(
            &url,
            &content_type,
            bearer,
        )?;

        debug!(method = %request.method, path = %request.path, "Leonardo request");

        let builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers);
        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(raw) => builder.body(raw.clone()),
            RequestBody::Multipart(form) => builder.body(form.bytes().to_vec()),
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();

        with_pretty_json_debug(&body, |rendered| {
            debug!(%status, path = %request.path, body = %rendered, "Leonardo response");
        });

        if !status.is_success() {
            self.artifacts.write(&body).await;
            return Err(LeonardoError::upstream_status(status, &body));
        }

        if let Some(err) = envelope_error(&body) {
            self.artifacts.write(&body).await;
            return Err(err);
        }

        Ok(body)
    }
}

/// First error code and joined messages of a non-empty `errors` list.
pub(crate) fn envelope_error(body: &[u8]) -> Option<LeonardoError> {
    let envelope: GraphqlErrorEnvelope = serde_json::from_slice(body).ok()?;
    let message = envelope.summary()?;
    let code = envelope
        .errors
        .into_iter()
        .next()
        .map(|e| e.extensions.code)
        .unwrap_or_default();
    Some(LeonardoError::Api { code, message })
}
