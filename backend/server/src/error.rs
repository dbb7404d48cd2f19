use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pod::PodError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("No contacts resource, log in first")]
    NotBound,

    #[error("No contact at index {0}")]
    UnknownContact(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pod error: {0}")]
    Pod(#[from] PodError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotLoggedIn { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotBound { .. } => StatusCode::CONFLICT,
            AppError::UnknownContact { .. } => StatusCode::NOT_FOUND,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Pod(PodError::Auth(_)) => StatusCode::UNAUTHORIZED,
            AppError::Pod { .. } => StatusCode::BAD_GATEWAY,
        };

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use pod::PodError;

    use super::AppError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotLoggedIn.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::UnknownContact(3).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Pod(PodError::Auth("state mismatch".to_string()))
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
