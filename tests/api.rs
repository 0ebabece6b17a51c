use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokengate::api;
use tokengate::application_impl::SessionConfig;
use tokengate::domain_model::SecretKey;
use tokengate::infra_memory::MemoryRevocationStore;
use tokengate::server::Server;
use warp::Filter;
use warp::http::StatusCode;

fn config(access_ttl: Duration, rotate: bool) -> SessionConfig {
    SessionConfig {
        access_secret: SecretKey::new("test-access-secret"),
        refresh_secret: SecretKey::new("test-refresh-secret"),
        access_ttl,
        refresh_ttl: None,
        rotate_refresh_tokens: rotate,
    }
}

fn app(
    cfg: SessionConfig,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    let server = Arc::new(Server::with_store(
        cfg,
        Arc::new(MemoryRevocationStore::new()),
    ));
    api::v1::routes(server).recover(api::v1::recover_error)
}

fn body(resp: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(resp.body()).unwrap()
}

async fn login<F>(filter: &F, username: &str) -> (String, String)
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let resp = warp::test::request()
        .method("POST")
        .path("/login")
        .json(&json!({ "username": username }))
        .reply(filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let b = body(&resp);
    (
        b["accessToken"].as_str().unwrap().to_string(),
        b["refreshToken"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn full_session_lifecycle() {
    let filter = app(config(Duration::from_secs(1), false));

    let (access, refresh) = login(&filter, "Kyle").await;

    let resp = warp::test::request()
        .method("GET")
        .path("/posts")
        .header("authorization", format!("Bearer {}", access))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(&resp), json!([{ "username": "Kyle", "title": "Post 1" }]));

    tokio::time::sleep(Duration::from_secs(2)).await;

    let resp = warp::test::request()
        .method("GET")
        .path("/posts")
        .header("authorization", format!("Bearer {}", access))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(&resp)["error"]["code"], "InvalidToken");

    let resp = warp::test::request()
        .method("POST")
        .path("/createtoken")
        .json(&json!({ "token": refresh }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let renewed = body(&resp);
    assert!(renewed.get("refreshToken").is_none());
    let fresh_access = renewed["accessToken"].as_str().unwrap().to_string();

    let resp = warp::test::request()
        .method("GET")
        .path("/post")
        .header("authorization", format!("Bearer {}", fresh_access))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(&resp), json!([{ "username": "Kyle", "title": "Post 1" }]));

    let resp = warp::test::request()
        .method("DELETE")
        .path("/logout")
        .json(&json!({ "token": refresh }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.body().is_empty());

    let resp = warp::test::request()
        .method("POST")
        .path("/createtoken")
        .json(&json!({ "token": refresh }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(&resp)["error"]["code"], "NotRegistered");
}

#[tokio::test]
async fn posts_are_scoped_to_caller() {
    let filter = app(config(Duration::from_secs(15), false));
    let (access, _) = login(&filter, "Jim").await;

    let resp = warp::test::request()
        .method("GET")
        .path("/posts")
        .header("authorization", format!("Bearer {}", access))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(&resp), json!([{ "username": "Jim", "title": "Post 2" }]));
}

#[tokio::test]
async fn posts_without_token_is_unauthorized() {
    let filter = app(config(Duration::from_secs(15), false));

    let resp = warp::test::request()
        .method("GET")
        .path("/posts")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&resp)["error"]["code"], "NoToken");

    let resp = warp::test::request()
        .method("GET")
        .path("/posts")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_or_foreign_tokens_are_forbidden() {
    let filter = app(config(Duration::from_secs(15), false));
    let (access, refresh) = login(&filter, "Kyle").await;

    let mut tampered = access.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    // a refresh token is signed with the other secret
    for token in [tampered, refresh, "garbage".to_string()] {
        let resp = warp::test::request()
            .method("GET")
            .path("/posts")
            .header("authorization", format!("Bearer {}", token))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body(&resp)["error"]["code"], "InvalidToken");
    }
}

#[tokio::test]
async fn renewal_error_statuses() {
    let filter = app(config(Duration::from_secs(15), false));
    let (access, _) = login(&filter, "Kyle").await;

    let resp = warp::test::request()
        .method("POST")
        .path("/createtoken")
        .json(&json!({}))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&resp)["error"]["code"], "MissingToken");

    let resp = warp::test::request()
        .method("POST")
        .path("/createtoken")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // access tokens are never registered as refresh tokens
    let resp = warp::test::request()
        .method("POST")
        .path("/createtoken")
        .json(&json!({ "token": access }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(&resp)["error"]["code"], "NotRegistered");

    let resp = warp::test::request()
        .method("POST")
        .path("/createtoken")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rotation_returns_new_refresh_token() {
    let filter = app(config(Duration::from_secs(15), true));
    let (_, refresh) = login(&filter, "Kyle").await;

    let resp = warp::test::request()
        .method("POST")
        .path("/createtoken")
        .json(&json!({ "token": refresh }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let next = body(&resp)["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(next, refresh);

    let resp = warp::test::request()
        .method("POST")
        .path("/createtoken")
        .json(&json!({ "token": refresh }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = warp::test::request()
        .method("POST")
        .path("/createtoken")
        .json(&json!({ "token": next }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let filter = app(config(Duration::from_secs(15), false));
    let (_, refresh) = login(&filter, "Kyle").await;

    for _ in 0..2 {
        let resp = warp::test::request()
            .method("DELETE")
            .path("/logout")
            .json(&json!({ "token": refresh }))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    let resp = warp::test::request()
        .method("DELETE")
        .path("/logout")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn login_rejects_undecodable_body() {
    let filter = app(config(Duration::from_secs(15), false));

    let resp = warp::test::request()
        .method("POST")
        .path("/login")
        .json(&json!({ "name": "Kyle" }))
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&resp)["error"]["code"], "BadRequest");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let filter = app(config(Duration::from_secs(15), false));

    let resp = warp::test::request()
        .method("GET")
        .path("/nowhere")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_rejects_non_json_content_type() {
    let filter = app(config(Duration::from_secs(15), false));

    let resp = warp::test::request()
        .method("POST")
        .path("/login")
        .header("content-type", "text/plain")
        .body(r#"{"username":"Kyle"}"#)
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body(&resp)["error"]["code"], "UnsupportedMediaType");
}

#[tokio::test]
async fn known_route_with_wrong_method_is_not_allowed() {
    let filter = app(config(Duration::from_secs(15), false));

    let resp = warp::test::request()
        .method("GET")
        .path("/login")
        .reply(&filter)
        .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body(&resp)["error"]["code"], "MethodNotAllowed");
}
