// HTTP implementation of the relief API port
use crate::application::error::ApiError;
use crate::application::relief_api::ReliefApi;
use crate::domain::request::{AllocationRequest, DistrictRequest, NewDistrictRequest, ReviewPayload};
use crate::domain::resource::ResourceRecord;
use crate::domain::role::Role;
use crate::domain::snapshot::{ActivityLog, Alert, DashboardStats, District};
use crate::infrastructure::dto::{Envelope, ErrorBody, ResourceDto};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpReliefApi {
    client: reqwest::Client,
    base_url: String,
    scope: &'static str,
}

impl HttpReliefApi {
    pub fn new(base_url: &str, role: Role, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            scope: role.scope(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.scope, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let response = check_status(response).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_slice::<Envelope<T>>(&body)
            .map(Envelope::into_inner)
            .map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let response = self
            .client
            .request(method, &url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = ErrorBody::parse(&body);
    tracing::warn!("Relief API responded with {}: {:?}", status, message);
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ReliefApi for HttpReliefApi {
    async fn fetch_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get_json("dashboard/stats").await
    }

    async fn fetch_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.get_json("alerts").await
    }

    async fn fetch_districts(&self) -> Result<Vec<District>, ApiError> {
        self.get_json("districts").await
    }

    async fn fetch_resources(&self) -> Result<Vec<ResourceRecord>, ApiError> {
        let resources: Vec<ResourceDto> = self.get_json("resources").await?;
        Ok(resources.into_iter().map(ResourceDto::into_record).collect())
    }

    async fn fetch_activity_logs(&self) -> Result<Vec<ActivityLog>, ApiError> {
        self.get_json("activity-logs").await
    }

    async fn allocate_resource(&self, request: &AllocationRequest) -> Result<(), ApiError> {
        self.send_json(Method::POST, "resources/allocate", request).await
    }

    async fn fetch_district_requests(&self) -> Result<Vec<DistrictRequest>, ApiError> {
        self.get_json("district-requests").await
    }

    async fn create_district_request(&self, request: &NewDistrictRequest) -> Result<(), ApiError> {
        self.send_json(Method::POST, "district-requests", request).await
    }

    async fn review_district_request(&self, id: u64, payload: &ReviewPayload) -> Result<(), ApiError> {
        let path = format!("district-requests/{}/status", id);
        self.send_json(Method::PATCH, &path, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::{RequestStatus, ReviewDecision};
    use crate::domain::resource::ResourceType;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, patch, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(String, Value)>>>;

    async fn spawn_backend(captured: Captured) -> String {
        let router = Router::new()
            .route(
                "/provincial/dashboard/stats",
                get(|| async { Json(json!({"data": {"totalAlerts": 3, "pendingSos": 1}})) }),
            )
            .route(
                "/provincial/resources",
                get(|| async {
                    Json(json!([
                        {"id": 1, "name": "Water", "quantity": 100, "allocated": 60, "unit": "l"},
                        {"id": 2, "name": "Kits", "quantity": 5, "allocated": 0, "category": "misc"}
                    ]))
                }),
            )
            .route(
                "/provincial/district-requests",
                get(|| async {
                    Json(json!({"data": [{
                        "id": 7, "districtId": 3, "resourceType": "food", "quantity": 40,
                        "status": "pending", "createdAt": "2024-05-01T08:00:00Z"
                    }]}))
                }),
            )
            .route(
                "/provincial/resources/allocate",
                post(|State(captured): State<Captured>, Json(body): Json<Value>| async move {
                    captured.lock().unwrap().push(("allocate".to_string(), body));
                    StatusCode::CREATED
                }),
            )
            .route(
                "/provincial/district-requests/:id/status",
                patch(
                    |Path(id): Path<u64>, State(captured): State<Captured>, Json(body): Json<Value>| async move {
                        captured.lock().unwrap().push((format!("review:{}", id), body));
                        StatusCode::OK
                    },
                ),
            )
            .route(
                "/provincial/alerts",
                get(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"statusCode": 400, "message": ["limit must be positive"]})),
                    )
                }),
            )
            .route(
                "/provincial/districts",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .with_state(captured);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    async fn client() -> (HttpReliefApi, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let base_url = spawn_backend(captured.clone()).await;
        let api = HttpReliefApi::new(&base_url, Role::Provincial, Duration::from_secs(5)).unwrap();
        (api, captured)
    }

    #[tokio::test]
    async fn test_fetches_decode_wrapped_and_bare_bodies() {
        let (api, _captured) = client().await;

        let stats = api.fetch_stats().await.unwrap();
        assert_eq!(stats.total_alerts, 3);
        assert_eq!(stats.pending_sos, 1);

        let resources = api.fetch_resources().await.unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].resource_type, Some(ResourceType::Water));
        assert_eq!(resources[0].available(), 40);
        assert_eq!(resources[1].resource_type, None);

        let requests = api.fetch_district_requests().await.unwrap();
        assert_eq!(requests[0].id, 7);
        assert_eq!(requests[0].district_id, "3");
        assert_eq!(requests[0].status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_allocation_and_review_bodies() {
        let (api, captured) = client().await;

        api.allocate_resource(&AllocationRequest {
            resource_type: ResourceType::Water,
            district_id: "d1".to_string(),
            quantity: 30,
            purpose: None,
        })
        .await
        .unwrap();

        api.review_district_request(
            7,
            &ReviewPayload {
                status: ReviewDecision::Approved,
                notes: Some("Approved by province".to_string()),
            },
        )
        .await
        .unwrap();

        let captured = captured.lock().unwrap().clone();
        assert_eq!(
            captured,
            vec![
                (
                    "allocate".to_string(),
                    json!({"resourceType": "water", "districtId": "d1", "quantity": 30})
                ),
                (
                    "review:7".to_string(),
                    json!({"status": "approved", "notes": "Approved by province"})
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_responses() {
        let (api, _captured) = client().await;

        let err = api.fetch_alerts().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 400,
                message: Some("limit must be positive".to_string()),
            }
        );

        let err = api.fetch_districts().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                message: None,
            }
        );

        let err = api.fetch_activity_logs().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let api = HttpReliefApi::new("http://127.0.0.1:1", Role::National, Duration::from_secs(2)).unwrap();
        let err = api.fetch_stats().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
