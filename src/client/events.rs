//! Client for the remote instance-events service.

use crate::models::{PlatformConfig, PlatformError};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// One recorded event on an application instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceEvent {
    /// Server-assigned identity, absent before the event is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The instance the event belongs to, on the form "{ownerId}/{guid}"
    pub instance_id: String,

    /// Party id of the instance owner
    pub instance_owner_party_id: String,

    /// Kind of event (created, saved, submitted, ...)
    pub event_type: String,

    /// When the event happened, stamped by the client on save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Everything else the service records, uninterpreted
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape of the event list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceEventList {
    #[serde(default)]
    instance_events: Vec<InstanceEvent>,
}

/// Thin client for the instance-events service.
///
/// No retries and no caching; non-success responses surface as
/// [`PlatformError::Api`] with the upstream status and body. The bearer
/// token is supplied per call by the hosting layer.
pub struct InstanceEventClient {
    client: reqwest::Client,
    base_url: String,
    subscription_key: Option<String>,
    subscription_key_header: String,
}

impl InstanceEventClient {
    /// Create a client from platform configuration.
    pub fn new(config: &PlatformConfig) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.storage_endpoint.trim_end_matches('/').to_string(),
            subscription_key: config.resolve_subscription_key(),
            subscription_key_header: config.subscription_key_header.clone(),
        })
    }

    /// Build headers for a request.
    fn headers(&self, token: &str) -> Result<HeaderMap, PlatformError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| PlatformError::InvalidResponse(format!("invalid token: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = &self.subscription_key {
            headers.insert(
                reqwest::header::HeaderName::from_bytes(self.subscription_key_header.as_bytes())
                    .map_err(|e| {
                        PlatformError::InvalidResponse(format!("invalid header name: {e}"))
                    })?,
                HeaderValue::from_str(key)
                    .map_err(|e| PlatformError::InvalidResponse(format!("invalid key: {e}")))?,
            );
        }

        Ok(headers)
    }

    /// List events recorded on an instance.
    ///
    /// `event_types` become repeated `eventTypes` query parameters; the
    /// time window is applied only when both ends are given.
    pub async fn list_events(
        &self,
        token: &str,
        instance_owner_party_id: &str,
        instance_id: &str,
        event_types: &[&str],
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<InstanceEvent>, PlatformError> {
        let url = format!(
            "{}/instances/{instance_owner_party_id}/{instance_id}/events",
            self.base_url
        );

        let mut query: Vec<(&str, &str)> = event_types
            .iter()
            .map(|event_type| ("eventTypes", *event_type))
            .collect();
        if let (Some(from), Some(to)) = (from, to) {
            query.push(("from", from));
            query.push(("to", to));
        }

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let list: InstanceEventList = response.json().await?;
        debug!(
            instance_id,
            events = list.instance_events.len(),
            "listed instance events"
        );
        Ok(list.instance_events)
    }

    /// Store an event, returning the server-assigned event id.
    ///
    /// The `created` timestamp is stamped with the current UTC time
    /// before sending; any caller-supplied value is overwritten.
    pub async fn save_event(
        &self,
        token: &str,
        mut event: InstanceEvent,
    ) -> Result<String, PlatformError> {
        event.created = Some(Utc::now());

        let url = format!("{}/instances/{}/events", self.base_url, event.instance_id);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(&event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let stored: InstanceEvent = response.json().await?;
        stored
            .id
            .ok_or_else(|| PlatformError::InvalidResponse("stored event has no id".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> InstanceEventClient {
        let config = PlatformConfig {
            storage_endpoint: server.url(),
            subscription_key: Some("sub-key".to_string()),
            ..PlatformConfig::default()
        };
        InstanceEventClient::new(&config).unwrap()
    }

    fn sample_event() -> InstanceEvent {
        InstanceEvent {
            id: None,
            instance_id: "512345/7dd3c208".to_string(),
            instance_owner_party_id: "512345".to_string(),
            event_type: "Saved".to_string(),
            created: None,
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_list_events_builds_repeated_query_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/instances/512345/7dd3c208/events")
            .match_query(Matcher::Exact(
                "eventTypes=Created&eventTypes=Saved&from=2024-01-01&to=2024-02-01".to_string(),
            ))
            .match_header("authorization", "Bearer tkn")
            .match_header("platform-subscription-key", "sub-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"instanceEvents": [
                    {"id": "e1", "instanceId": "512345/7dd3c208", "instanceOwnerPartyId": "512345", "eventType": "Created"},
                    {"id": "e2", "instanceId": "512345/7dd3c208", "instanceOwnerPartyId": "512345", "eventType": "Saved"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let events = client
            .list_events(
                "tkn",
                "512345",
                "7dd3c208",
                &["Created", "Saved"],
                Some("2024-01-01"),
                Some("2024-02-01"),
            )
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type, "Saved");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_events_omits_half_open_time_window() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/instances/512345/7dd3c208/events")
            .match_query(Matcher::Exact("eventTypes=Created".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"instanceEvents": []}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let events = client
            .list_events("tkn", "512345", "7dd3c208", &["Created"], Some("2024"), None)
            .await
            .unwrap();

        assert!(events.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_events_surfaces_status_and_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/instances/512345/7dd3c208/events")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("forbidden party")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .list_events("tkn", "512345", "7dd3c208", &[], None, None)
            .await
            .unwrap_err();

        match err {
            PlatformError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden party");
            }
            other => panic!("expected Api error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_save_event_stamps_created_and_returns_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/instances/512345/7dd3c208/events")
            .match_body(Matcher::PartialJsonString(
                r#"{"eventType": "Saved"}"#.to_string(),
            ))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": "a1b2", "instanceId": "512345/7dd3c208", "instanceOwnerPartyId": "512345", "eventType": "Saved", "created": "2024-03-01T12:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let id = client.save_event("tkn", sample_event()).await.unwrap();

        assert_eq!(id, "a1b2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_save_event_without_returned_id_is_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/instances/512345/7dd3c208/events")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"instanceId": "512345/7dd3c208", "instanceOwnerPartyId": "512345", "eventType": "Saved"}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.save_event("tkn", sample_event()).await.unwrap_err();
        assert!(matches!(err, PlatformError::InvalidResponse(_)));
    }
}
