use super::error::*;
use crate::application_port::{PostService, SessionService};
use crate::domain_model::{Claims, RefreshToken};
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{self, reject};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

pub async fn login(
    body: LoginRequest,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let tokens = session_service
        .login(Claims::new(body.username))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&tokens))
}

pub async fn list_posts(
    identity: Claims,
    post_service: Arc<dyn PostService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let posts = post_service.list_for(&identity.username).await;
    Ok(warp::reply::json(&posts))
}

/// Body of the renewal and logout endpoints. An empty body counts as a
/// request without a token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenRequest {
    pub fn parse(body: &Bytes) -> Result<Self, ApiErrorCode> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(TokenRequest::default());
        }
        serde_json::from_slice(body).map_err(|_| ApiErrorCode::BadRequest)
    }

    fn refresh_token(self) -> Option<RefreshToken> {
        self.token.map(RefreshToken)
    }
}

pub async fn renew(
    body: TokenRequest,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let refresh_token = body.refresh_token();
    let renewed = session_service
        .renew(refresh_token.as_ref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&renewed))
}

pub async fn logout(
    body: TokenRequest,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if let Some(refresh_token) = body.refresh_token() {
        session_service
            .logout(&refresh_token)
            .await
            .map_err(ApiErrorCode::from)
            .map_err(reject::custom)?;
    }
    Ok(StatusCode::NO_CONTENT)
}
