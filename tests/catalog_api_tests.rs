mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use book_catalog::db::UserRepository;
use book_catalog::domain::UserId;
use book_catalog::models::UserStatus;
use book_catalog::security::{JwtTokenIssuer, TokenIssuer};
use common::{PASSWORD, TestApp, body_json, body_text, spawn_app};
use serde_json::json;
use std::time::Duration;

/// Signs a token with the app's own secret, bypassing the signin gate.
fn token_for(app: &TestApp, id: UserId) -> String {
    let issuer = JwtTokenIssuer::new(
        &app.state.config().auth.jwt_secret,
        Duration::from_secs(3600),
    );
    issuer.issue(id).unwrap().token
}

async fn signed_up_user_id(app: &TestApp, username: &str) -> UserId {
    let resp = app
        .post_json(
            "/api/v1/auth/signup",
            &json!({
                "username": username,
                "password": PASSWORD,
                "firstname": "Bob",
                "lastname": "Builder",
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    app.state
        .store()
        .users()
        .get_by_username(username)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn health_and_readiness() {
    let app = spawn_app().await;

    let resp = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(body_text(resp).await, "OK");

    let resp = app
        .send(
            Request::builder()
                .uri("/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = spawn_app().await;

    let resp = app
        .send(
            Request::builder()
                .uri("/api/v1/book")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["code"], "ERR-011");

    let resp = app.authed("GET", "/api/v1/book", "garbage.token.here").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let problem = body_json(resp).await;
    assert_eq!(problem["code"], "ERR-012");
    assert_eq!(problem["instance"], "/api/v1/book");
    assert!(problem["timestamp"].is_string());
}

#[tokio::test]
async fn token_for_not_activated_user_is_rejected() {
    let app = spawn_app().await;
    let id = signed_up_user_id(&app, "bob@example.com").await;

    let resp = app.authed("GET", "/api/v1/user", &token_for(&app, id)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["code"], "ERR-015");
}

#[tokio::test]
async fn token_for_locked_user_is_forbidden() {
    let app = spawn_app().await;
    let id = signed_up_user_id(&app, "bob@example.com").await;
    app.state
        .store()
        .users()
        .update_status("bob@example.com", &UserStatus::Other("locked".to_string()))
        .await
        .unwrap();

    let resp = app.authed("GET", "/api/v1/book", &token_for(&app, id)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["code"], "ERR-003");
}

#[tokio::test]
async fn token_for_missing_user_is_unauthorized() {
    let app = spawn_app().await;

    let resp = app
        .authed("GET", "/api/v1/user", &token_for(&app, UserId::new(4242)))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["code"], "ERR-002");
}

#[tokio::test]
async fn unknown_route_is_a_problem_document() {
    let app = spawn_app().await;

    let resp = app
        .send(
            Request::builder()
                .uri("/api/v1/nothing-here")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    assert_eq!(body_json(resp).await["code"], "ERR-004");
}

#[tokio::test]
async fn responses_are_gzipped_on_request() {
    let app = spawn_app().await;

    let resp = app
        .send(
            Request::builder()
                .uri("/api/v1/nothing-here")
                .header(header::ACCEPT_ENCODING, "gzip")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get(header::CONTENT_ENCODING).unwrap(), "gzip");
}

#[tokio::test]
async fn current_user_profile_round_trip() {
    let app = spawn_app().await;
    let token = app.active_user_token("alice@example.com").await;

    let resp = app.authed("GET", "/api/v1/user", &token).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user = body_json(resp).await;
    assert_eq!(user["username"], "alice@example.com");
    assert_eq!(user["info"]["firstname"], "Alice");
    assert_eq!(user["info"]["email"], "alice@example.com");

    let resp = app
        .json_request(
            "PUT",
            "/api/v1/user/info",
            &json!({
                "firstname": "Alicia",
                "lastname": "Liddell",
                "email": "alicia@example.org",
            }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let user = body_json(app.authed("GET", "/api/v1/user", &token).await).await;
    assert_eq!(user["info"]["firstname"], "Alicia");
    assert_eq!(user["info"]["email"], "alicia@example.org");
}

#[tokio::test]
async fn author_crud() {
    let app = spawn_app().await;
    let token = app.active_user_token("alice@example.com").await;

    let resp = app
        .json_request(
            "POST",
            "/api/v1/author",
            &json!({ "name": "Frank Herbert", "dob": "1920-10-08" }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["id"].as_i64().unwrap();
    assert!(id > 0);

    let author = body_json(
        app.authed("GET", &format!("/api/v1/author/{id}"), &token)
            .await,
    )
    .await;
    assert_eq!(author["name"], "Frank Herbert");
    assert_eq!(author["dob"], "1920-10-08");

    let resp = app
        .json_request(
            "PUT",
            &format!("/api/v1/author/{id}"),
            &json!({ "name": "Franklin Herbert", "dob": "1920-10-08" }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let list = body_json(app.authed("GET", "/api/v1/author", &token).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Franklin Herbert");

    let resp = app
        .authed("DELETE", &format!("/api/v1/author/{id}"), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .authed("GET", &format!("/api/v1/author/{id}"), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["title"], "Problem getting author");

    let resp = app
        .authed("DELETE", &format!("/api/v1/author/{id}"), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let list = body_json(app.authed("GET", "/api/v1/author", &token).await).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn book_crud() {
    let app = spawn_app().await;
    let token = app.active_user_token("alice@example.com").await;

    let author_id = body_json(
        app.json_request(
            "POST",
            "/api/v1/author",
            &json!({ "name": "Frank Herbert", "dob": "1920-10-08" }),
            Some(&token),
        )
        .await,
    )
    .await["id"]
        .as_i64()
        .unwrap();

    let book = json!({
        "title": "Dune",
        "description": "Spice and sand",
        "isbn": "9780441013593",
        "author_id": author_id,
        "price": "15.99",
    });

    let resp = app
        .json_request("POST", "/api/v1/book", &book, Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["id"].as_i64().unwrap();

    let fetched = body_json(
        app.authed("GET", &format!("/api/v1/book/{id}"), &token)
            .await,
    )
    .await;
    assert_eq!(fetched["title"], "Dune");
    assert_eq!(fetched["author_id"], author_id);
    assert_eq!(fetched["price"].as_f64(), Some(15.99));

    let mut updated = book.clone();
    updated["title"] = json!("Dune Messiah");
    let resp = app
        .json_request("PUT", &format!("/api/v1/book/{id}"), &updated, Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let list = body_json(app.authed("GET", "/api/v1/book", &token).await).await;
    assert_eq!(list[0]["title"], "Dune Messiah");

    let resp = app
        .authed("DELETE", &format!("/api/v1/book/{id}"), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .authed("GET", &format!("/api/v1/book/{id}"), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_rejects_bad_input() {
    let app = spawn_app().await;
    let token = app.active_user_token("alice@example.com").await;

    let resp = app
        .json_request(
            "POST",
            "/api/v1/book",
            &json!({
                "title": "Orphan",
                "description": "No author",
                "isbn": "123",
                "author_id": 999,
                "price": 5,
            }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["title"], "Problem creating book");

    let resp = app
        .json_request(
            "POST",
            "/api/v1/book",
            &json!({
                "title": "Free",
                "description": "Costs nothing",
                "isbn": "123",
                "author_id": 1,
                "price": 0,
            }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "ERR-007");

    let resp = app.authed("GET", "/api/v1/book/0", &token).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.authed("GET", "/api/v1/book/abc", &token).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
