//! Failures of calls to the hub REST service

use avh_api_contract::ProblemDetails;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("request to the hub failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not decode hub response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid hub URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    ApiContract(#[from] avh_api_contract::ApiContractError),

    #[error("bad credentials: {0}")]
    Auth(String),

    /// Non-2xx response carrying a problem+json body
    #[error("hub answered {status}: {} ({})", details.title, details.detail)]
    ServerError {
        status: StatusCode,
        details: ProblemDetails,
    },

    /// Non-2xx response with any other body
    #[error("hub answered {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

pub type RestClientResult<T> = Result<T, RestClientError>;
