use crate::forms::FormKind;
use crate::storage::StoreError;
use crate::tasks::Cancelled;
use crate::validation::ValidationError;
use axum::{Json, http::StatusCode};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid credentials")]
    Authentication,
    #[error(transparent)]
    StorageUnavailable(#[from] StoreError),
    #[error("Please sign in to continue")]
    Unauthenticated,
    #[error("{0} is already being submitted")]
    SubmissionInFlight(FormKind),
    #[error("Request was cancelled")]
    Cancelled(#[from] Cancelled),
    #[error("failed to render page: {0}")]
    Render(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

impl PortalError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Authentication | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::SubmissionInFlight(_) => StatusCode::CONFLICT,
            Self::StorageUnavailable(_) | Self::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Authentication => "authentication",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Unauthenticated => "unauthenticated",
            Self::SubmissionInFlight(_) => "submission_in_flight",
            Self::Cancelled(_) => "cancelled",
            Self::Render(_) => "internal",
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            kind: self.kind(),
            focus: match self {
                Self::Validation(err) => err.focus(),
                _ => None,
            },
            redirect: match self {
                Self::Unauthenticated => Some(crate::gate::LOGIN_URL),
                _ => None,
            },
        }
    }
}

impl axum::response::IntoResponse for PortalError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self.body())).into_response()
    }
}
