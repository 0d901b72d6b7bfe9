//! REST gateway implementation.
//!
//! Speaks JSON to a goal backend:
//! `GET /goals`, `PATCH /goals/{id}`, `POST /goals`, `POST /auth/login`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use goalpost_core::error::GatewayError;
use goalpost_core::model::{Credentials, Goal, NewGoal, UpdateAck, UserProfile};
use goalpost_core::traits::SyncGateway;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP gateway backed by a reqwest client.
pub struct HttpGateway {
    base_url: Url,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid gateway URL: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "gateway URL cannot be used as a base: {base_url}"
        );
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url,
            timeout_secs: timeout.as_secs(),
            client,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        missing: impl FnOnce() -> GatewayError,
    ) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        debug!(%request_id, %method, %url, "gateway request");

        let mut request = self
            .client
            .request(method, url)
            .header("x-request-id", request_id.to_string());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(self.timeout_secs)
            } else {
                GatewayError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::InvalidCredentials);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(missing());
        }
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(|e| GatewayError::Api {
            status: status.as_u16(),
            message: format!("failed to parse response: {e}"),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody {
    current_value: f64,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

#[async_trait]
impl SyncGateway for HttpGateway {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch_goals(&self) -> Result<Vec<Goal>, GatewayError> {
        let url = self.url(&["goals"]);
        self.send(Method::GET, url, None::<&()>, || {
            GatewayError::Unavailable("goals endpoint not found".into())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn update_goal(
        &self,
        goal_id: &str,
        current_value: f64,
    ) -> Result<UpdateAck, GatewayError> {
        let url = self.url(&["goals", goal_id]);
        let body = UpdateBody { current_value };
        self.send(Method::PATCH, url, Some(&body), || {
            GatewayError::NotFound(goal_id.to_string())
        })
        .await
    }

    #[instrument(skip(self, goal), fields(title = %goal.title))]
    async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, GatewayError> {
        let url = self.url(&["goals"]);
        self.send(Method::POST, url, Some(goal), || {
            GatewayError::Unavailable("goals endpoint not found".into())
        })
        .await
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<UserProfile, GatewayError> {
        let url = self.url(&["auth", "login"]);
        self.send(Method::POST, url, Some(credentials), || {
            GatewayError::Unavailable("login endpoint not found".into())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn goal_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": "Save Money",
            "description": "Monthly savings goal",
            "targetValue": 1000,
            "currentValue": 450,
            "unit": "$",
            "startDate": "2025-01-01",
            "endDate": "2025-01-31",
            "category": "Finance",
            "color": "#F59E0B"
        })
    }

    #[tokio::test]
    async fn fetches_goals() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/goals"))
            .and(header_exists("x-request-id"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([goal_json("goal-4")])),
            )
            .mount(&server)
            .await;

        let goals = gateway(&server).fetch_goals().await.unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].id, "goal-4");
        assert_eq!(goals[0].target_value, 1000.0);
    }

    #[tokio::test]
    async fn update_sends_current_value() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/goals/goal-3"))
            .and(body_json(serde_json::json!({"currentValue": 20.0})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let ack = gateway(&server).update_goal("goal-3", 20.0).await.unwrap();
        assert!(ack.success);
    }

    #[tokio::test]
    async fn update_unknown_goal_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/goals/goal-404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .update_goal("goal-404", 1.0)
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NotFound("goal-404".into()));
    }

    #[tokio::test]
    async fn create_returns_goal_with_assigned_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/goals"))
            .respond_with(ResponseTemplate::new(201).set_body_json(goal_json("goal-1700000000000")))
            .mount(&server)
            .await;

        let new_goal = NewGoal {
            title: "Save Money".into(),
            description: "Monthly savings goal".into(),
            target_value: 1000.0,
            current_value: 450.0,
            unit: "$".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            category: "Finance".into(),
            color: "#F59E0B".into(),
        };
        let goal = gateway(&server).create_goal(&new_goal).await.unwrap();
        assert_eq!(goal.id, "goal-1700000000000");
    }

    #[tokio::test]
    async fn bad_login_is_invalid_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .authenticate(&Credentials::new("demo@goalpost.dev", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::InvalidCredentials);
    }

    #[tokio::test]
    async fn server_error_carries_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/goals"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(serde_json::json!({"error": "maintenance"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).fetch_goals().await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Api {
                status: 503,
                message: "maintenance".into()
            }
        );
    }

    #[test]
    fn url_keeps_base_path() {
        let gateway = HttpGateway::new("http://localhost:8080/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            gateway.url(&["goals", "goal-1"]).as_str(),
            "http://localhost:8080/api/goals/goal-1"
        );
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(HttpGateway::new("not a url", Duration::from_secs(1)).is_err());
    }
}
