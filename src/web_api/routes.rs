//! API Routes

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::alert_hub::AlertPayload;
use crate::endpoint;
use crate::error::Error;
use crate::models::ApiResponse;
use crate::state::AppState;
use crate::store::{CameraType, CreateCameraRequest, UpdateCameraRequest};

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(super::health_check))
        // Cameras
        .route("/api/cameras", get(list_cameras))
        .route("/api/cameras", post(create_camera))
        .route("/api/cameras/test-connection", post(test_connection))
        .route(
            "/api/cameras/:id",
            get(get_camera).put(update_camera).delete(delete_camera),
        )
        .route("/api/cameras/:id/check-status", post(check_status))
        // Alerts (read-only history)
        .route("/api/alerts", get(list_alerts))
        // WebSocket alert subscription
        .route("/ws/alerts/:user_id", get(websocket_handler))
        .with_state(state)
}

/// Owner scoping for list endpoints (auth is an external concern)
#[derive(Debug, Deserialize)]
struct OwnerQuery {
    user_id: String,
}

// ========================================
// Camera Handlers
// ========================================

async fn list_cameras(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> impl IntoResponse {
    let cameras = state.cameras.list_cameras(&query.user_id).await;
    Json(ApiResponse::success(cameras))
}

async fn get_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    match state.cameras.get_camera(&id).await {
        Some(camera) => Ok(Json(ApiResponse::success(camera))),
        None => Err(Error::NotFound(format!("Camera {} not found", id))),
    }
}

/// Create a camera.
///
/// The endpoint is probed synchronously on the request path; an unreachable
/// endpoint rejects the request before anything is persisted. On success the
/// thumbnail capture runs detached so the response never waits on it.
async fn create_camera(
    State(state): State<AppState>,
    Json(req): Json<CreateCameraRequest>,
) -> Result<impl IntoResponse, Error> {
    if !state.directory.exists(&req.user_id).await {
        return Err(Error::NotFound(format!("User {} not found", req.user_id)));
    }

    let verdict = state.prober.probe_raw(&req.ip_address).await;
    if !verdict.reachable {
        return Err(Error::Unreachable(
            "Camera is unreachable. Please check the IP address.".to_string(),
        ));
    }

    let camera = state.cameras.create_camera(req, verdict.status).await?;

    match verdict.frame {
        Some(frame) => state
            .thumbnails
            .clone()
            .spawn_store_frame(camera.clone(), frame),
        None => state.thumbnails.clone().spawn_capture(camera.clone()),
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::success(camera))))
}

async fn update_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCameraRequest>,
) -> Result<impl IntoResponse, Error> {
    let camera = state.cameras.update_camera(&id, req).await?;
    Ok(Json(ApiResponse::success(camera)))
}

/// Delete a camera; its alerts cascade
async fn delete_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let camera = state.cameras.delete_camera(&id).await?;
    let alerts_deleted = state.alerts.delete_for_camera(&camera.id).await;

    tracing::info!(
        camera_id = %camera.id,
        alerts_deleted = alerts_deleted,
        "Camera deleted"
    );

    Ok(Json(json!({"ok": true, "alerts_deleted": alerts_deleted})))
}

/// Probe a camera's endpoint and persist the latest status
async fn check_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let camera = state
        .cameras
        .get_camera(&id)
        .await
        .ok_or_else(|| Error::NotFound(format!("Camera {} not found", id)))?;

    let verdict = state.prober.probe_raw(&camera.ip_address).await;
    let updated = state.cameras.update_camera_status(&id, verdict.status).await?;

    if verdict.reachable {
        match verdict.frame {
            Some(frame) => state
                .thumbnails
                .clone()
                .spawn_store_frame(updated.clone(), frame),
            None => state.thumbnails.clone().spawn_capture(updated.clone()),
        }
    }

    Ok(Json(json!({
        "id": updated.id,
        "name": updated.name,
        "status": updated.status,
        "is_reachable": verdict.reachable,
    })))
}

#[derive(Debug, Deserialize)]
struct TestConnectionRequest {
    ip_address: String,
    #[serde(default)]
    camera_type: CameraType,
}

/// Probe an endpoint without persisting anything
async fn test_connection(
    State(state): State<AppState>,
    Json(req): Json<TestConnectionRequest>,
) -> Result<impl IntoResponse, Error> {
    if req.ip_address.is_empty() {
        return Err(Error::Validation("ip_address is required".to_string()));
    }

    let url = endpoint::derive_capture_url(&req.ip_address, None, req.camera_type);
    let verdict = state.prober.probe_raw(&url).await;

    Ok(Json(json!({
        "ip_address": req.ip_address,
        "url": url,
        "is_reachable": verdict.reachable,
        "status": verdict.status,
    })))
}

// ========================================
// Alert Handlers
// ========================================

/// Alert history for the cameras owned by a user, newest first
async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> impl IntoResponse {
    let cameras = state.cameras.list_cameras(&query.user_id).await;
    let camera_ids: Vec<String> = cameras.iter().map(|c| c.id.clone()).collect();
    let alerts = state.alerts.list_for_cameras(&camera_ids).await;

    let views: Vec<AlertPayload> = alerts
        .iter()
        .filter_map(|alert| {
            cameras
                .iter()
                .find(|c| c.id == alert.camera_id)
                .map(|camera| AlertPayload::new(alert, camera))
        })
        .collect();

    Json(ApiResponse::success(views))
}

// ========================================
// WebSocket Handler
// ========================================

/// WebSocket upgrade handler for alert subscriptions
async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state, user_id))
}

/// Handle an alert subscription connection.
///
/// Push-only: every payload published to the user's group while the
/// connection is open is forwarded verbatim; inbound frames are ignored.
async fn handle_websocket(mut socket: WebSocket, state: AppState, user_id: String) {
    // Unknown target user: close without joining any group
    if !state.directory.exists(&user_id).await {
        tracing::warn!(user_id = %user_id, "Rejecting alert subscription for unknown user");
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    let (mut sender, mut receiver) = socket.split();
    let (conn_id, mut rx) = state.hub.subscribe(&user_id).await;

    // Forward published alerts from the group to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Drain inbound frames until the peer goes away
    let recv_user = user_id.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    tracing::info!(user_id = %recv_user, "Alert subscriber disconnected");
                    break;
                }
                Ok(_) => {
                    // Push-only connection; inbound payloads are ignored
                }
                Err(e) => {
                    tracing::warn!(user_id = %recv_user, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    // Either task finishing means the connection is done
    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }

    state.hub.unsubscribe(&user_id, &conn_id).await;
}
