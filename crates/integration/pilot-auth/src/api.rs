//! pilotauth client
//!
//! `POST <api_host>/v2/pilotauth/` with the identity fields as query
//! parameters. A 2xx reply carries `{"dongle_id": ..., "access_token": ...}`.

use crate::{DeviceCredential, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const PILOTAUTH_PATH: &str = "v2/pilotauth/";

/// Fields submitted on registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PilotAuthRequest {
    pub imei: String,
    pub imei2: String,
    pub serial: String,
    pub public_key: String,
    pub register_token: String,
}

#[derive(Debug, Deserialize)]
struct PilotAuthResponse {
    dongle_id: String,
    access_token: String,
}

/// Remote auth endpoint
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn pilotauth(&self, request: &PilotAuthRequest) -> Result<DeviceCredential>;
}

/// HTTP client for the auth API
pub struct HttpAuthApi {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpAuthApi {
    /// Client for `api_host`; requests fail once `timeout` has elapsed
    pub fn new(api_host: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("pilot-register-{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: format!("{}/{}", api_host.trim_end_matches('/'), PILOTAUTH_PATH),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Parse the body of a successful reply
pub fn parse_credential(body: &str) -> Result<DeviceCredential> {
    let response: PilotAuthResponse =
        serde_json::from_str(body).map_err(|e| Error::Malformed(e.to_string()))?;
    Ok(DeviceCredential {
        dongle_id: response.dongle_id,
        access_token: response.access_token,
    })
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn pilotauth(&self, request: &PilotAuthRequest) -> Result<DeviceCredential> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(request)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        parse_credential(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn request() -> PilotAuthRequest {
        PilotAuthRequest {
            imei: "355001234567890".to_string(),
            imei2: "000000123456789".to_string(),
            serial: "cccccccc".to_string(),
            public_key: "-----BEGIN PUBLIC KEY-----\nabc+/=\n-----END PUBLIC KEY-----\n"
                .to_string(),
            register_token: "h.p.s".to_string(),
        }
    }

    #[test]
    fn test_parse_credential() {
        let cred = parse_credential(r#"{"dongle_id": "abc", "access_token": "tok", "extra": 1}"#)
            .unwrap();
        assert_eq!(cred.dongle_id, "abc");
        assert_eq!(cred.access_token, "tok");

        assert!(matches!(parse_credential("not json"), Err(Error::Malformed(_))));
        assert!(matches!(
            parse_credential(r#"{"dongle_id": "abc"}"#),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_endpoint_join() {
        let api = HttpAuthApi::new("https://api.example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.endpoint(), "https://api.example.com/v2/pilotauth/");
    }

    #[tokio::test]
    async fn test_pilotauth_success_sends_fields() {
        let router = Router::new().route(
            "/v2/pilotauth/",
            post(|Query(params): Query<HashMap<String, String>>| async move {
                let ok = params.get("imei").map(String::as_str) == Some("355001234567890")
                    && params.get("imei2").map(String::as_str) == Some("000000123456789")
                    && params.get("serial").map(String::as_str) == Some("cccccccc")
                    && params.get("register_token").map(String::as_str) == Some("h.p.s")
                    && params
                        .get("public_key")
                        .map_or(false, |k| k.contains("abc+/="));
                if ok {
                    (
                        StatusCode::OK,
                        Json(serde_json::json!({"dongle_id": "d0n6", "access_token": "t0k"})),
                    )
                } else {
                    (StatusCode::BAD_REQUEST, Json(serde_json::json!({})))
                }
            }),
        );
        let host = serve(router).await;

        let api = HttpAuthApi::new(&host, Duration::from_secs(5)).unwrap();
        let cred = api.pilotauth(&request()).await.unwrap();
        assert_eq!(
            cred,
            DeviceCredential {
                dongle_id: "d0n6".to_string(),
                access_token: "t0k".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_pilotauth_non_2xx() {
        let router = Router::new().route(
            "/v2/pilotauth/",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let host = serve(router).await;

        let api = HttpAuthApi::new(&host, Duration::from_secs(5)).unwrap();
        let result = api.pilotauth(&request()).await;
        assert!(matches!(result, Err(Error::Status(500))));
    }

    #[tokio::test]
    async fn test_pilotauth_malformed_body() {
        let router = Router::new().route("/v2/pilotauth/", post(|| async { "<html>" }));
        let host = serve(router).await;

        let api = HttpAuthApi::new(&host, Duration::from_secs(5)).unwrap();
        let result = api.pilotauth(&request()).await;
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[tokio::test]
    async fn test_pilotauth_times_out() {
        let router = Router::new().route(
            "/v2/pilotauth/",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let host = serve(router).await;

        let api = HttpAuthApi::new(&host, Duration::from_millis(200)).unwrap();
        let result = api.pilotauth(&request()).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_pilotauth_unreachable() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpAuthApi::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let result = api.pilotauth(&request()).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
