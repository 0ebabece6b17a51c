use crate::application_port::*;
use crate::domain_port::StoreError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if err.find::<BodyDeserializeError>().is_some() {
        ApiErrorCode::BadRequest
    } else if err.find::<reject::UnsupportedMediaType>().is_some() {
        ApiErrorCode::UnsupportedMediaType
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else {
        ApiErrorCode::internal(format!("Unhandled rejection: {:?}", err))
    };

    let json = warp::reply::json(&ErrorResponse {
        error: ApiError {
            message: code.to_string(),
            code: code.clone(),
        },
    });
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("No bearer token supplied")]
    NoToken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Refresh token missing")]
    MissingToken,
    #[error("Refresh token is not registered")]
    NotRegistered,
    #[error("Malformed request body")]
    BadRequest,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Request body must be application/json")]
    UnsupportedMediaType,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::NoToken | ApiErrorCode::MissingToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::InvalidToken | ApiErrorCode::NotRegistered => StatusCode::FORBIDDEN,
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<GuardError> for ApiErrorCode {
    fn from(error: GuardError) -> Self {
        match error {
            GuardError::NoToken => ApiErrorCode::NoToken,
            GuardError::InvalidToken => ApiErrorCode::InvalidToken,
        }
    }
}

impl From<RenewError> for ApiErrorCode {
    fn from(error: RenewError) -> Self {
        match error {
            RenewError::MissingToken => ApiErrorCode::MissingToken,
            RenewError::NotRegistered => ApiErrorCode::NotRegistered,
            // the reason stays server-side
            RenewError::VerificationFailed(_) => ApiErrorCode::InvalidToken,
            RenewError::Sign(e) => ApiErrorCode::internal(e),
            RenewError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<LoginError> for ApiErrorCode {
    fn from(error: LoginError) -> Self {
        ApiErrorCode::internal(error)
    }
}

impl From<StoreError> for ApiErrorCode {
    fn from(error: StoreError) -> Self {
        ApiErrorCode::internal(error)
    }
}
