//! Session bootstrap step definitions

use crate::types::{Method, StringMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One token-harvesting step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthStep {
    /// Call a JSON endpoint and read the token from the response
    /// (e.g. a guest-token activation endpoint)
    JsonToken {
        /// Token endpoint URL
        url: String,
        /// HTTP method
        #[serde(default = "default_token_method")]
        method: Method,
        /// Extra headers for the token request
        #[serde(default)]
        headers: StringMap,
        /// Optional JSON body
        #[serde(default)]
        body: Option<Value>,
        /// Path to the token in the response
        token_path: String,
        /// Header to put the token in
        header: String,
        /// Prefix prepended to the token (e.g. "Bearer ")
        #[serde(default)]
        prefix: Option<String>,
    },

    /// Fetch an HTML page and capture the token with a regex
    HtmlToken {
        /// Page URL
        url: String,
        /// Regex whose first capture group is the token
        pattern: String,
        /// Header to put the token in
        header: String,
        /// Fail when the token is not on the page (otherwise warn)
        #[serde(default)]
        required: bool,
    },
}

fn default_token_method() -> Method {
    Method::POST
}

impl AuthStep {
    /// Header this step fills in
    pub fn header(&self) -> &str {
        match self {
            AuthStep::JsonToken { header, .. } | AuthStep::HtmlToken { header, .. } => header,
        }
    }

    /// URL this step requests
    pub fn url(&self) -> &str {
        match self {
            AuthStep::JsonToken { url, .. } | AuthStep::HtmlToken { url, .. } => url,
        }
    }
}
