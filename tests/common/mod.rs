#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use book_catalog::api::AppState;
use book_catalog::config::Config;
use book_catalog::mail::MailTransport;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const PASSWORD: &str = "Secret123";

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Keeps every message in memory so tests can pull one-time codes out of it.
#[derive(Default)]
pub struct CapturingMail {
    sent: Mutex<Vec<SentMail>>,
}

impl CapturingMail {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> SentMail {
        self.sent.lock().unwrap().last().cloned().expect("no mail sent")
    }

    pub fn last_otp(&self) -> String {
        let body = self.last().body;
        let start = body.find("otp=").expect("mail has no otp link") + 4;
        body[start..start + 64].to_string()
    }
}

#[async_trait]
impl MailTransport for CapturingMail {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: recipients.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mail: Arc<CapturingMail>,
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    let db_path = std::env::temp_dir().join(format!("book-catalog-it-{}.db", uuid::Uuid::new_v4()));
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.auth.jwt_secret = "0123456789abcdef0123456789abcdef0123456789abcdef".to_string();
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let mail = Arc::new(CapturingMail::default());
    let state = book_catalog::api::create_app_state_with_transport(config, mail.clone(), None)
        .await
        .expect("Failed to create app state");
    TestApp {
        router: book_catalog::api::router(state.clone()),
        state,
        mail,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        self.json_request("POST", uri, body, None).await
    }

    pub async fn json_request(
        &self,
        method: &str,
        uri: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn authed(&self, method: &str, uri: &str, token: &str) -> Response {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Signs up, activates and signs in `username`, returning the access token.
    pub async fn active_user_token(&self, username: &str) -> String {
        let resp = self
            .post_json(
                "/api/v1/auth/signup",
                &serde_json::json!({
                    "username": username,
                    "password": PASSWORD,
                    "firstname": "Alice",
                    "lastname": "Liddell",
                }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let otp = self.mail.last_otp();
        let resp = self
            .post_json(
                "/api/v1/auth/activation/activate",
                &serde_json::json!({ "otp": otp }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = self
            .post_json(
                "/api/v1/auth/signin",
                &serde_json::json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
