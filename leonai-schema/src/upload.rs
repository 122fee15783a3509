use serde::Deserialize;

use crate::graphql::null_as_default;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUploadData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub upload_init_image: UploadInitImage,
}

/// Signed direct-to-storage upload target.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UploadInitImage {
    /// Asset ID to reference in the generation request.
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// JSON-encoded [`UploadPolicyFields`].
    #[serde(deserialize_with = "null_as_default")]
    pub fields: String,
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

/// Signed upload policy form fields.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UploadPolicyFields {
    #[serde(rename = "Content-Type")]
    pub content_type: String,
    pub bucket: String,
    #[serde(rename = "X-Amz-Algorithm")]
    pub algorithm: String,
    #[serde(rename = "X-Amz-Credential")]
    pub credential: String,
    #[serde(rename = "X-Amz-Date")]
    pub date: String,
    #[serde(rename = "X-Amz-Security-Token")]
    pub security_token: String,
    pub key: String,
    #[serde(rename = "Policy")]
    pub policy: String,
    #[serde(rename = "X-Amz-Signature")]
    pub signature: String,
}

impl UploadPolicyFields {
    /// Form fields in the order the storage policy expects them, before the file part.
    pub fn ordered(&self) -> [(&'static str, &str); 9] {
        [
            ("Content-Type", &self.content_type),
            ("bucket", &self.bucket),
            ("X-Amz-Algorithm", &self.algorithm),
            ("X-Amz-Credential", &self.credential),
            ("X-Amz-Date", &self.date),
            ("X-Amz-Security-Token", &self.security_token),
            ("key", &self.key),
            ("Policy", &self.policy),
            ("X-Amz-Signature", &self.signature),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_fields_decode_from_embedded_json_string() {
        let raw = r#"{"data":{"uploadInitImage":{
            "id":"asset-1",
            "fields":"{\"Content-Type\":\"image/png\",\"bucket\":\"b\",\"X-Amz-Algorithm\":\"AWS4-HMAC-SHA256\",\"X-Amz-Credential\":\"c\",\"X-Amz-Date\":\"d\",\"X-Amz-Security-Token\":\"t\",\"key\":\"k\",\"Policy\":\"p\",\"X-Amz-Signature\":\"s\"}",
            "key":"k",
            "url":"https://bucket.example/",
            "__typename":"UploadInitImageOutput"
        }}}"#;
        let envelope: crate::GraphqlResponse<CreateUploadData> =
            serde_json::from_str(raw).expect("decode envelope");
        let target = envelope.data.upload_init_image;
        assert_eq!(target.id, "asset-1");

        let fields: UploadPolicyFields =
            serde_json::from_str(&target.fields).expect("decode fields");
        let names: Vec<_> = fields.ordered().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            [
                "Content-Type",
                "bucket",
                "X-Amz-Algorithm",
                "X-Amz-Credential",
                "X-Amz-Date",
                "X-Amz-Security-Token",
                "key",
                "Policy",
                "X-Amz-Signature",
            ]
        );
        assert_eq!(fields.ordered()[6].1, "k");
    }

    #[test]
    fn null_upload_target_decodes_to_empty_fields() {
        let envelope: crate::GraphqlResponse<CreateUploadData> =
            serde_json::from_str(r#"{"data":{"uploadInitImage":null}}"#).expect("decode");
        assert!(envelope.data.upload_init_image.url.is_empty());

        let envelope: crate::GraphqlResponse<CreateUploadData> = serde_json::from_str(
            r#"{"data":{"uploadInitImage":{"id":null,"fields":null,"key":null,"url":"https://b/"}}}"#,
        )
        .expect("decode");
        let target = envelope.data.upload_init_image;
        assert!(target.id.is_empty());
        assert!(target.fields.is_empty());
        assert_eq!(target.url, "https://b/");
    }
}
