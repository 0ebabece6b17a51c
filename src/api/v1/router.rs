use super::error::*;
use super::handler::{self, TokenRequest};
use crate::application_port::AuthGuard;
use crate::domain_model::Claims;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::hyper::body::Bytes;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and_then(handler::login);

    let posts = warp::path("posts")
        .or(warp::path("post"))
        .unify()
        .and(warp::path::end())
        .and(warp::get())
        .and(with_identity(server.auth_guard.clone()))
        .and(with(server.post_service.clone()))
        .and_then(handler::list_posts);

    let renew = warp::path("createtoken")
        .and(warp::path::end())
        .and(warp::post())
        .and(token_body())
        .and(with(server.session_service.clone()))
        .and_then(handler::renew);

    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::delete())
        .and(token_body())
        .and(with(server.session_service.clone()))
        .and_then(handler::logout);

    // paths are matched before methods so unknown routes stay 404
    login.or(posts).or(renew).or(logout)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Runs the auth guard and extracts the caller's claims.
fn with_identity(
    auth_guard: Arc<dyn AuthGuard>,
) -> impl Filter<Extract = (Claims,), Error = warp::Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: http::HeaderMap| {
        let auth_guard = auth_guard.clone();
        async move {
            // a non-ASCII header value is treated like an absent one
            let authorization = headers
                .get(http::header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());
            auth_guard
                .authenticate(authorization)
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}

fn token_body() -> impl Filter<Extract = (TokenRequest,), Error = warp::Rejection> + Clone {
    warp::body::bytes().and_then(|body: Bytes| async move {
        TokenRequest::parse(&body).map_err(reject::custom)
    })
}
