use serde_json::Value;

use crate::error::LeonardoError;
use crate::utils::jwt::decode_jwt_claims;

const HASURA_CLAIMS_KEY: &str = "https://hasura.io/jwt/claims";
const HASURA_USER_ID_KEY: &str = "x-hasura-user-id";

/// Identity carried by the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: String,
    pub account_id: String,
}

impl TokenClaims {
    /// Both the subject and the nested account id must be present and non-empty.
    pub fn from_token(token: &str) -> Result<Self, LeonardoError> {
        let claims = decode_jwt_claims(token)
            .ok_or_else(|| LeonardoError::Auth("bearer token is not a decodable JWT".into()))?;

        let sub = claims
            .get("sub")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if sub.is_empty() {
            return Err(LeonardoError::Auth("token has no subject".into()));
        }

        // The nested block arrives either as an object or as a JSON-encoded string.
        let nested = match claims.get(HASURA_CLAIMS_KEY) {
            Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).ok(),
            Some(value @ Value::Object(_)) => Some(value.clone()),
            _ => None,
        };
        let account_id = nested
            .as_ref()
            .and_then(|n| n.get(HASURA_USER_ID_KEY))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if account_id.is_empty() {
            return Err(LeonardoError::Auth("token has no account id".into()));
        }

        Ok(Self { sub, account_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leonardo::testing::make_jwt;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;

    fn token_with(payload: &Value) -> String {
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    #[test]
    fn reads_string_encoded_nested_claims() {
        let claims = TokenClaims::from_token(&make_jwt("sub-1", "acct-1")).unwrap();
        assert_eq!(
            claims,
            TokenClaims {
                sub: "sub-1".into(),
                account_id: "acct-1".into()
            }
        );
    }

    #[test]
    fn reads_object_nested_claims() {
        let token = token_with(&json!({
            "sub": "s",
            HASURA_CLAIMS_KEY: { HASURA_USER_ID_KEY: "acct" },
        }));
        assert_eq!(TokenClaims::from_token(&token).unwrap().account_id, "acct");
    }

    #[test]
    fn empty_subject_or_account_is_an_auth_error() {
        for token in [
            make_jwt("", "acct"),
            make_jwt("sub", ""),
            token_with(&json!({ "sub": "s" })),
            "not-a-jwt".to_string(),
        ] {
            assert!(matches!(
                TokenClaims::from_token(&token),
                Err(LeonardoError::Auth(_))
            ));
        }
    }
}
