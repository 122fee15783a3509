//! In-memory [`Transport`] double keyed by logical operation.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::LeonardoError;
use crate::leonardo::transport::{ApiRequest, SESSION_PATH, Transport};

pub(crate) const SESSION_KEY: &str = "session";
pub(crate) const UPLOAD_KEY: &str = "upload";

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Body(Value),
    Raw(Vec<u8>),
    Status(u16),
    Api(&'static str),
    Timeout,
}

impl Scripted {
    fn materialize(&self) -> Result<Vec<u8>, LeonardoError> {
        match self {
            Scripted::Body(value) => Ok(serde_json::to_vec(value).expect("serialize body")),
            Scripted::Raw(raw) => Ok(raw.clone()),
            Scripted::Status(code) => Err(LeonardoError::upstream_status(
                StatusCode::from_u16(*code).expect("valid status"),
                b"scripted",
            )),
            Scripted::Api(code) => Err(LeonardoError::Api {
                code: (*code).to_string(),
                message: format!("scripted ({code})"),
            }),
            Scripted::Timeout => Err(LeonardoError::Transport {
                timeout: true,
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "scripted timeout",
                )),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub key: String,
    pub bearer: Option<String>,
    pub request: ApiRequest,
}

/// Replies are consumed in order per key; the last one repeats.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, key: &str, replies: impl IntoIterator<Item = Scripted>) {
        self.replies
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .extend(replies);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.key).collect()
    }

    pub fn count(&self, key: &str) -> usize {
        self.calls().iter().filter(|c| c.key == key).count()
    }

    fn key_of(request: &ApiRequest) -> String {
        if request.path == SESSION_PATH {
            SESSION_KEY.to_string()
        } else if request.path.starts_with("http") {
            UPLOAD_KEY.to_string()
        } else {
            request
                .operation_name()
                .unwrap_or_else(|| request.path.clone())
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Vec<u8>, LeonardoError> {
        let key = Self::key_of(request);
        self.calls.lock().unwrap().push(RecordedCall {
            key: key.clone(),
            bearer: bearer.map(str::to_string),
            request: request.clone(),
        });

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            let queue = replies
                .get_mut(&key)
                .unwrap_or_else(|| panic!("no scripted reply for {key}"));
            if queue.len() > 1 {
                queue.pop_front().expect("non-empty queue")
            } else {
                queue.front().cloned().expect("non-empty queue")
            }
        };
        reply.materialize()
    }
}

/// Unsigned three-segment token with the given subject and nested account id.
pub(crate) fn make_jwt(sub: &str, account_id: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let hasura = json!({ "x-hasura-user-id": account_id }).to_string();
    let payload = json!({
        "sub": sub,
        "https://hasura.io/jwt/claims": hasura,
    });
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{payload}.c2ln")
}

pub(crate) fn session_body(token: &str, expiry_unix: i64) -> Scripted {
    Scripted::Body(json!({
        "user": { "name": "tester", "email": "t@example.com", "sub": "sub-1" },
        "expires": "2099-01-01T00:00:00.000Z",
        "accessToken": token,
        "accessTokenIssuedAt": expiry_unix - 3600,
        "accessTokenExpiry": expiry_unix,
        "serverTimestamp": expiry_unix - 3600,
    }))
}

pub(crate) fn user_body(id: &str) -> Scripted {
    Scripted::Body(json!({ "data": { "users": [ { "id": id, "username": "tester" } ] } }))
}
