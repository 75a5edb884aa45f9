//! Contract errors: presence checks and enum parsing

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("invalid record: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Expected one of intent, ner, t2sql, e2e or mixed
    #[error("unknown task type '{0}'")]
    InvalidTaskKind(String),

    /// Expected one of intent, ner, t2sql or e2e
    #[error("unknown agent module '{0}'")]
    InvalidAgentModule(String),

    #[error("unknown endpoint kind '{0}'")]
    InvalidEndpointKind(String),
}

/// Problem+JSON error response format as per RFC 7807
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub detail: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty", default)]
    pub errors: std::collections::HashMap<String, Vec<String>>,
}
