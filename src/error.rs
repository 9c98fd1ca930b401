#[derive(thiserror::Error, Debug)]
pub enum StratzError {
    #[error("STRATZ config missing (token present: {token}, endpoint present: {endpoint})")]
    ConfigMissing { token: bool, endpoint: bool },
    #[error("Invalid STRATZ config: {0}")]
    InvalidConfig(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("Content script not reachable")]
    DeliveryUnreachable,
    #[error("Request {0} superseded by a newer request")]
    Superseded(u64),
    #[error("Invalid player id: {0}")]
    InvalidPlayerId(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

impl StratzError {
    /// True for the failures a single GraphQL call can produce.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            StratzError::Http(_)
                | StratzError::Json(_)
                | StratzError::ApiError { .. }
                | StratzError::GraphQl(_)
        )
    }
}
