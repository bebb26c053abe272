#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use fieldnotes_model::api::routes::v1;
use fieldnotes_model::{
    ApiResponse, ErrorBody, ErrorEnvelope, MachineId, MachineRecord,
    NewServiceRequest, ServiceId, ServiceRecord, SparePart, SparePartId,
    UserId,
};
use image::{DynamicImage, Rgba, RgbaImage};
use qrcode::{Color, QrCode};
use serde_json::json;

pub const TOKEN: &str = "test-session-token";

/// What the mock API has seen.
#[derive(Debug, Default)]
pub struct MockApi {
    pub lookups: Mutex<Vec<String>>,
    pub services: Mutex<Vec<NewServiceRequest>>,
    pub logouts: AtomicUsize,
}

impl MockApi {
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn services(&self) -> Vec<NewServiceRequest> {
        self.services.lock().unwrap().clone()
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

pub fn machine() -> MachineRecord {
    MachineRecord {
        id: MachineId::new(7),
        machine_code: "MCH-001".into(),
        category: "Press".into(),
        brand: "Amada".into(),
        model: "HG-1003".into(),
        arrived_date: NaiveDate::from_ymd_opt(2023, 4, 2).unwrap(),
        location: "Hall B".into(),
        sub_location: Some("Bay 4".into()),
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn parts() -> Vec<SparePart> {
    [(11, "BOLT-22", "M8x40"), (12, "BELT-07", "V-Belt A42"), (13, "SEAL-01", "Bolt cap")]
        .into_iter()
        .map(|(id, code, model)| SparePart {
            id: SparePartId::new(id),
            part_code: code.into(),
            category: "Fastener".into(),
            brand: "Würth".into(),
            model: model.into(),
            arrived_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            quantity: 4,
            created_at: Utc::now(),
            updated_at: None,
        })
        .collect()
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorEnvelope {
        error: ErrorBody {
            message: message.into(),
            status: status.as_u16(),
        },
    };
    (status, Json(body)).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

async fn lookup(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Authentication required");
    }
    let id = params.get("id").cloned().unwrap_or_default();
    api.lookups.lock().unwrap().push(id.clone());
    match id.as_str() {
        "MCH-001" => Json(ApiResponse::success(machine())).into_response(),
        "BOOM" => error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        _ => error(StatusCode::NOT_FOUND, format!("Machine {id} not found")),
    }
}

async fn search(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Authentication required");
    }
    let needle = params.get("q").map(|q| q.to_lowercase());
    let hits: Vec<SparePart> = parts()
        .into_iter()
        .filter(|part| {
            needle.as_ref().is_none_or(|q| {
                part.part_code.to_lowercase().contains(q)
                    || part.model.to_lowercase().contains(q)
            })
        })
        .collect();
    Json(ApiResponse::success(hits)).into_response()
}

async fn create_service(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(request): Json<NewServiceRequest>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Authentication required");
    }
    if request.notes.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "notes is required");
    }
    api.services.lock().unwrap().push(request.clone());
    let record = ServiceRecord {
        id: ServiceId::new(1),
        machine_id: request.machine_id,
        spare_part_id: request.spare_part_id,
        performed_by: UserId::new(3),
        notes: request.notes,
        created_at: Utc::now(),
        updated_at: None,
    };
    (
        StatusCode::CREATED,
        Json(ApiResponse::success(record).with_message("Service logged".into())),
    )
        .into_response()
}

async fn logout(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Authentication required");
    }
    api.logouts.fetch_add(1, Ordering::SeqCst);
    Json(ApiResponse::success(json!({ "revoked": true }))).into_response()
}

/// Serve the mock API on an ephemeral port; returns its base URL.
pub async fn spawn_api() -> (String, Arc<MockApi>) {
    let api = Arc::new(MockApi::default());
    let app = Router::new()
        .route(v1::machines::LOOKUP, get(lookup))
        .route(v1::spare_parts::SEARCH, get(search))
        .route(v1::services::COLLECTION, post(create_service))
        .route(v1::auth::LOGOUT, post(logout))
        .with_state(Arc::clone(&api));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), api)
}

/// A 640x480 camera frame showing `payload` as a QR code centred on a
/// white background.
pub fn qr_frame(payload: &str) -> DynamicImage {
    let code = QrCode::new(payload.as_bytes()).unwrap();
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let scale = 10;
    let offset_x = (640 - modules * scale) / 2;
    let offset_y = (480 - modules * scale) / 2;

    let mut canvas = RgbaImage::from_pixel(640, 480, Rgba([255, 255, 255, 255]));
    for (index, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let (mx, my) = (index as u32 % modules, index as u32 / modules);
        for dy in 0..scale {
            for dx in 0..scale {
                canvas.put_pixel(
                    offset_x + mx * scale + dx,
                    offset_y + my * scale + dy,
                    Rgba([0, 0, 0, 255]),
                );
            }
        }
    }
    DynamicImage::ImageRgba8(canvas)
}

pub fn blank_frame() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        320,
        240,
        Rgba([255, 255, 255, 255]),
    ))
}
