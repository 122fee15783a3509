use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::queries;

/// Outbound GraphQL request envelope.
///
/// Field order matches the web app (`operationName`, `variables`, `query`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub operation_name: &'static str,
    pub variables: Value,
    pub query: &'static str,
}

impl GraphqlRequest {
    pub fn create_upload_init_image(file_type: &str, extension: &str) -> Self {
        Self {
            operation_name: "CreateUploadInitImage",
            variables: json!({
                "arg1": {
                    "fileType": file_type,
                    "extension": extension,
                }
            }),
            query: queries::CREATE_UPLOAD_INIT_IMAGE,
        }
    }

    pub fn create_motion_svd_generation_job(image_id: &str, motion_strength: u32) -> Self {
        Self {
            operation_name: "CreateMotionSvdGenerationJob",
            variables: json!({
                "arg1": {
                    "imageId": image_id,
                    "isPublic": false,
                    "isInitImage": true,
                    "isVariation": false,
                    "motionStrength": motion_strength,
                }
            }),
            query: queries::CREATE_MOTION_SVD_GENERATION_JOB,
        }
    }

    /// Status lookup restricted to terminal states of a single generation.
    pub fn generation_statuses(generation_id: &str) -> Self {
        Self {
            operation_name: "GetAIGenerationFeedStatuses",
            variables: json!({
                "where": {
                    "status": { "_in": ["COMPLETE", "FAILED"] },
                    "id": { "_in": [generation_id] },
                }
            }),
            query: queries::GET_AI_GENERATION_FEED_STATUSES,
        }
    }

    /// Personal (non-team, non-canvas) feed of the given user, newest first.
    pub fn generation_feed(user_id: &str, limit: u32) -> Self {
        Self {
            operation_name: "GetAIGenerationFeed",
            variables: json!({
                "where": {
                    "userId": { "_eq": user_id },
                    "teamId": { "_is_null": true },
                    "canvasRequest": { "_eq": false },
                    "universalUpscaler": { "_is_null": true },
                    "isStoryboard": { "_eq": false },
                },
                "offset": 0,
                "limit": limit,
            }),
            query: queries::GET_AI_GENERATION_FEED,
        }
    }

    pub fn user_details(user_sub: &str) -> Self {
        Self {
            operation_name: "GetUserDetails",
            variables: json!({ "userSub": user_sub }),
            query: queries::GET_USER_DETAILS,
        }
    }
}

/// `{ "data": ... }` success envelope.
///
/// A missing or null `data` decodes to `T::default()`; the state machine
/// treats empty results explicitly instead of failing the decode.
#[derive(Debug, Default, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct GraphqlResponse<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: T,
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sibling `errors` list of a GraphQL response.
#[derive(Debug, Default, Deserialize)]
pub struct GraphqlErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct GraphqlError {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub extensions: GraphqlErrorExtensions,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct GraphqlErrorExtensions {
    /// Machine-readable code, e.g. `invalid-jwt`.
    #[serde(default)]
    pub code: String,
}

impl GraphqlErrorEnvelope {
    /// Joined `message (code)` list, or `None` when there are no errors.
    pub fn summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.extensions.code))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatusData;

    #[test]
    fn request_serializes_in_web_app_field_order() {
        let req = GraphqlRequest::user_details("sub-1");
        let raw = serde_json::to_string(&req).expect("serialize request");

        let op = raw.find("operationName").expect("operationName present");
        let vars = raw.find("variables").expect("variables present");
        let query = raw.find("\"query\"").expect("query present");
        assert!(op < vars && vars < query);
        assert!(raw.contains(r#""variables":{"userSub":"sub-1"}"#));
    }

    #[test]
    fn status_request_filters_terminal_states_of_one_generation() {
        let req = GraphqlRequest::generation_statuses("gen-1");
        assert_eq!(
            req.variables,
            json!({
                "where": {
                    "status": { "_in": ["COMPLETE", "FAILED"] },
                    "id": { "_in": ["gen-1"] },
                }
            })
        );
    }

    #[test]
    fn null_data_decodes_to_default() {
        let parsed: GraphqlResponse<StatusData> =
            serde_json::from_str(r#"{"data":null}"#).expect("decode");
        assert!(parsed.data.generations.is_empty());

        let parsed: GraphqlResponse<StatusData> = serde_json::from_str("{}").expect("decode");
        assert!(parsed.data.generations.is_empty());
    }

    #[test]
    fn error_envelope_summary_lists_every_error() {
        let raw = r#"{"errors":[
            {"message":"Could not verify JWT","extensions":{"code":"invalid-jwt"}},
            {"message":"other","extensions":{}}
        ]}"#;
        let parsed: GraphqlErrorEnvelope = serde_json::from_str(raw).expect("decode");

        assert_eq!(parsed.errors[0].extensions.code, "invalid-jwt");
        assert_eq!(
            parsed.summary().as_deref(),
            Some("Could not verify JWT (invalid-jwt), other ()")
        );
        assert!(GraphqlErrorEnvelope::default().summary().is_none());
    }
}
