//! `multipart/form-data` bodies with a browser-style boundary.
//!
//! Signed storage policies are order-sensitive, so parts are written exactly in
//! insertion order.

use rand::Rng;

const BOUNDARY_PREFIX: &str = "----WebKitFormBoundary";
const BOUNDARY_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";
const BOUNDARY_ID_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn builder() -> MultipartBuilder {
        MultipartBuilder::with_boundary(webkit_boundary())
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug)]
pub struct MultipartBuilder {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBuilder {
    pub fn with_boundary(boundary: String) -> Self {
        Self {
            boundary,
            bytes: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.bytes.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape_quotes(name)
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(value.as_bytes());
        self
    }

    pub fn file(mut self, name: &str, filename: &str, contents: &[u8]) -> Self {
        self.open_part();
        self.bytes.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                escape_quotes(name),
                escape_quotes(filename)
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(contents);
        self
    }

    pub fn finish(mut self) -> MultipartBody {
        if !self.bytes.is_empty() {
            self.bytes.extend_from_slice(b"\r\n");
        }
        self.bytes
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        MultipartBody {
            boundary: self.boundary,
            bytes: self.bytes,
        }
    }

    fn open_part(&mut self) {
        if !self.bytes.is_empty() {
            self.bytes.extend_from_slice(b"\r\n");
        }
        self.bytes
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}

fn webkit_boundary() -> String {
    let mut rng = rand::rng();
    let id: String = (0..BOUNDARY_ID_LEN)
        .map(|_| BOUNDARY_CHARS[rng.random_range(0..BOUNDARY_CHARS.len())] as char)
        .collect();
    format!("{BOUNDARY_PREFIX}{id}")
}

fn escape_quotes(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
