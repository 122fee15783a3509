use base64::Engine as _;
use serde_json::Value;

/// Decode the payload JSON ("claims") from a three-part JWT.
///
/// Signature-agnostic: the token is never verified, only the middle segment is
/// base64url-decoded and parsed.
pub(crate) fn decode_jwt_claims(jwt: &str) -> Option<Value> {
    let mut parts = jwt.split('.');
    let (Some(_header), Some(payload_b64), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    // Most JWTs are base64url without padding, but some toolchains may include padding.
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE.decode(payload_b64))
        .ok()?;

    serde_json::from_slice(&bytes).ok()
}
