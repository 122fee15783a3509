//! Browser header profiles. Requests without a plausible browser fingerprint are
//! rejected as bot traffic, so every call carries one of three fixed sets.

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONNECTION, CONTENT_TYPE, HeaderMap, HeaderName,
    HeaderValue, ORIGIN, REFERER, USER_AGENT,
};
use url::Url;

use crate::error::LeonardoError;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
const SEC_CH_UA: &str = r#""Not A(Brand";v="99", "Google Chrome";v="121", "Chromium";v="121""#;
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";
const APP_ORIGIN: &str = "https://app.leonardo.ai";
const APP_REFERER: &str = "https://app.leonardo.ai/";

/// Which browser fingerprint a request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProfile {
    /// Direct-to-storage multipart upload.
    Upload,
    /// Cookie-authenticated web app host (`api/...` paths).
    Session,
    /// Bearer-authenticated GraphQL host.
    Bearer,
}

impl HeaderProfile {
    /// Multipart content wins over the path prefix.
    pub fn select(path: &str, content_type: &str) -> Self {
        if content_type.starts_with("multipart/form-data") {
            HeaderProfile::Upload
        } else if path.starts_with("api") {
            HeaderProfile::Session
        } else {
            HeaderProfile::Bearer
        }
    }

    pub fn headers(
        self,
        url: &Url,
        content_type: &str,
        bearer: Option<&str>,
    ) -> Result<HeaderMap, LeonardoError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, header_value(content_type)?);
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(ORIGIN, HeaderValue::from_static(APP_ORIGIN));
        headers.insert(REFERER, HeaderValue::from_static(APP_REFERER));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert("sec-ch-ua", HeaderValue::from_static(SEC_CH_UA));
        headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
        headers.insert("sec-ch-ua-platform", HeaderValue::from_static(r#""Windows""#));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));

        match self {
            HeaderProfile::Upload => {
                headers.insert(ACCEPT, HeaderValue::from_static("*"));
                headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
            }
            HeaderProfile::Session => {
                headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
                headers.insert(authority(), authority_of(url)?);
                headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
            }
            HeaderProfile::Bearer => {
                headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
                headers.insert(authority(), authority_of(url)?);
                headers.insert("sec-fetch-site", HeaderValue::from_static("same-site"));
                if let Some(token) = bearer {
                    headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
                }
            }
        }
        Ok(headers)
    }
}

fn authority() -> HeaderName {
    HeaderName::from_static("authority")
}

fn authority_of(url: &Url) -> Result<HeaderValue, LeonardoError> {
    let host = url.host_str().ok_or(LeonardoError::MissingField("url.host"))?;
    match url.port() {
        Some(port) => header_value(&format!("{host}:{port}")),
        None => header_value(host),
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, LeonardoError> {
    Ok(HeaderValue::from_str(raw)?)
}
