//! Cookie persistence and the `name=value; ...` cookie-header format.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore as _, Jar};
use std::path::PathBuf;
use url::Url;

use crate::error::LeonardoError;

/// Where the browser session cookie lives between runs.
#[async_trait]
pub trait CookieStore: Send + Sync {
    async fn get_cookie(&self) -> Result<String, LeonardoError>;
    async fn set_cookie(&self, cookie: &str) -> Result<(), LeonardoError>;
}

/// Flat-file store holding one cookie header line.
#[derive(Debug, Clone)]
pub struct FileCookieStore {
    path: PathBuf,
}

impl FileCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CookieStore for FileCookieStore {
    async fn get_cookie(&self) -> Result<String, LeonardoError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(raw.trim().to_string())
    }

    async fn set_cookie(&self, cookie: &str) -> Result<(), LeonardoError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, cookie).await?;
        Ok(())
    }
}

/// Load a `name=value; name2=value2` header into `jar` for `url`.
///
/// Blank segments are skipped; a segment without `=` is rejected. Values
/// containing `"` are URL-escaped.
pub fn load_cookies(jar: &Jar, url: &Url, raw: &str) -> Result<usize, LeonardoError> {
    let mut loaded = 0;
    for segment in raw.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (name, value) = segment
            .split_once('=')
            .ok_or_else(|| LeonardoError::Cookie(format!("invalid cookie segment {segment:?}")))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(LeonardoError::Cookie(format!(
                "cookie without a name: {segment:?}"
            )));
        }
        let value = value.trim();
        let value = if value.contains('"') {
            url::form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>()
        } else {
            value.to_string()
        };
        jar.add_cookie_str(&format!("{name}={value}"), url);
        loaded += 1;
    }
    Ok(loaded)
}

/// Current cookies the jar would send to `url`, as one header line.
pub fn dump_cookies(jar: &Jar, url: &Url) -> Result<String, LeonardoError> {
    let Some(header) = jar.cookies(url) else {
        return Ok(String::new());
    };
    header
        .to_str()
        .map(str::to_string)
        .map_err(|e| LeonardoError::Cookie(format!("cookie header is not text: {e}")))
}
