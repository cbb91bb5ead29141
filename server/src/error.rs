use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use thiserror::Error;
use todo_shared::MessageResponse;

use crate::store::StoreError;

pub const NOT_FOUND_MESSAGE: &str = "Todo not found";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Body that could not be decoded into a payload.
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// Path segment that cannot name any todo.
    #[error("invalid todo id: {0}")]
    UnknownId(String),
}

impl From<BlockingError> for ApiError {
    fn from(err: BlockingError) -> Self {
        ApiError::Store(StoreError::Infrastructure(err.to_string()))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::Validation(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(StoreError::NotFound(_)) | ApiError::UnknownId(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Store(StoreError::Infrastructure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Store(StoreError::NotFound(_)) | ApiError::UnknownId(_) => {
                NOT_FOUND_MESSAGE.to_string()
            }
            ApiError::Store(StoreError::Infrastructure(detail)) => {
                error!("store failure: {detail}");
                "Error processing todo".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(MessageResponse::new(message))
    }
}
