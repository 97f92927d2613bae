use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use shared::{ErrorCode, ErrorResponse, PollError, ValidationError};
use crate::store::StoreError;

#[derive(Error, Debug, Serialize)]
pub enum ApiError {
    #[error("Poll not found")]
    NotFound,
    #[error("Invalid poll ID")]
    InvalidId,
    #[error("Only admins can manage polls")]
    Forbidden,
    #[error("{0}")]
    Invalid(String),
    #[error("Poll is closed")]
    PollClosed,
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("The poll changed while saving, please try again")]
    Conflict,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::NotFound => Status::NotFound,
            ApiError::InvalidId => Status::BadRequest,
            ApiError::Forbidden => Status::Forbidden,
            ApiError::Invalid(_) => Status::BadRequest,
            ApiError::PollClosed => Status::Conflict,
            ApiError::UnknownOption(_) => Status::BadRequest,
            ApiError::Conflict => Status::Conflict,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::NotFound => ErrorCode::NotFound,
            ApiError::InvalidId => ErrorCode::InvalidInput,
            ApiError::Forbidden => ErrorCode::Unauthorized,
            ApiError::Invalid(_) => ErrorCode::ValidationFailed,
            ApiError::PollClosed => ErrorCode::PollClosed,
            ApiError::UnknownOption(_) => ErrorCode::InvalidInput,
            ApiError::Conflict => ErrorCode::Conflict,
            ApiError::Internal(_) => ErrorCode::SystemError,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        match self {
            // Store details stay in the logs.
            ApiError::Internal(_) => ErrorResponse::new(ErrorCode::SystemError, "Failed to reach the poll store"),
            other => ErrorResponse::new(other.code(), other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Conflict { .. } => ApiError::Conflict,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Invalid(err.to_string())
    }
}

impl From<PollError> for ApiError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Inactive => ApiError::PollClosed,
            PollError::UnknownOption(option) => ApiError::UnknownOption(option),
            PollError::Invalid(e) => e.into(),
            dup @ PollError::DuplicateBallots { .. } => ApiError::Internal(dup.to_string()),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if let ApiError::Internal(detail) = &self {
            error!("{} {} failed: {}", req.method(), req.uri(), detail);
        }

        rocket::Response::build_from(Json(self.to_response()).respond_to(req)?)
            .status(status)
            .ok()
    }
}
