use serde::Deserialize;

/// Response of the cookie-authenticated `api/auth/session` endpoint.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub user: Option<SessionUser>,
    pub expires: String,
    pub access_token: String,
    pub access_token_issued_at: i64,
    /// Unix seconds.
    pub access_token_expiry: i64,
    pub server_timestamp: i64,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
    pub sub: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_session_descriptor_leniently() {
        let raw = r#"{
            "user": null,
            "expires": "2030-01-01T00:00:00.000Z",
            "accessToken": "a.b.c",
            "accessTokenIssuedAt": 1700000000,
            "accessTokenExpiry": 1700003600,
            "serverTimestamp": 1700000001
        }"#;
        let parsed: SessionDescriptor = serde_json::from_str(raw).expect("decode");
        assert!(parsed.user.is_none());
        assert_eq!(parsed.server_timestamp, 1_700_000_001);

        let raw = r#"{"accessToken":"a.b.c","accessTokenExpiry":1700003600}"#;
        let parsed: SessionDescriptor = serde_json::from_str(raw).expect("decode");
        assert_eq!(parsed.access_token, "a.b.c");
        assert_eq!(parsed.access_token_expiry, 1_700_003_600);
        assert!(parsed.expires.is_empty());
    }
}
