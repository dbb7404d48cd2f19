use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PodError>;

#[derive(Error, Debug)]
pub enum PodError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned {status}")]
    Status {
        method: &'static str,
        url: String,
        status: StatusCode,
    },

    #[error("Malformed turtle: {0}")]
    Turtle(#[from] rio_turtle::TurtleError),

    #[error("Invalid base IRI: {0}")]
    BaseIri(#[from] oxiri::IriParseError),

    #[error("Malformed URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Serialization failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PodError {
    /// The server answered 404, the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PodError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
