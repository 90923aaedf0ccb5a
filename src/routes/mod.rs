pub mod admin;
pub mod categories;
pub mod rsvp;

use axum::Router;
use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(rsvp::router())
        .merge(categories::router())
        .merge(admin::router())
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, Response};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth::jwt;
    use crate::config::Config;
    use crate::models::couple::{Couple, NewCouple, Side};
    use crate::notify::{Mailer, RecordingMailer};
    use crate::store::{MemoryStore, Store};
    use crate::AppState;

    pub struct TestApp {
        pub state: AppState,
        pub bride: Couple,
        pub bride_token: String,
    }

    impl TestApp {
        pub async fn new() -> Self {
            let (mailer, _outbox) = RecordingMailer::new();
            let config = Config::for_tests();
            let store = Store::Memory(MemoryStore::new());
            let bride = store
                .create_couple(&NewCouple {
                    name: "Diamond".into(),
                    email: "bride@example.com".into(),
                    side: Side::Bride,
                })
                .await
                .unwrap();
            let bride_token = jwt::create_token(bride.id, bride.side, &config.jwt_secret).unwrap();
            let state = AppState::new(config, store, Mailer::Recording(mailer));

            Self {
                state,
                bride,
                bride_token,
            }
        }

        pub fn router(&self) -> Router {
            crate::app(self.state.clone())
        }

        pub async fn request(
            &self,
            method: Method,
            uri: &str,
            body: Option<Value>,
            token: Option<&str>,
        ) -> (u16, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header("authorization", format!("Bearer {token}"));
            }
            let request = match body {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router().oneshot(request).await.unwrap();
            read_json(response).await
        }

        pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
            self.request(method, uri, body, Some(&self.bride_token)).await
        }
    }

    async fn read_json(response: Response<Body>) -> (u16, Value) {
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
