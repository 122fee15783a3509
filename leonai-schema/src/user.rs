use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::graphql::null_as_default;

#[derive(Debug, Default, Deserialize)]
pub struct UserDetailsData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Plan, credit balances, team memberships etc. Never consulted.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
