use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use log::{debug, warn};
use serde::Serialize;

use crate::checkout::Checkout;
use crate::error::PaymentError;
use crate::order::OrderRequest;

pub const CREATE_PAYMENT_PATH: &str = "/api/yookassa-create";

/// Предел тела заказа. Читается только для POST.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<Checkout>,
}

#[derive(Serialize)]
struct Failure {
    success: bool,
    error: String,
}

pub fn router(checkout: Arc<Checkout>) -> Router {
    Router::new()
        .route("/", any(create_payment))
        .route(CREATE_PAYMENT_PATH, any(create_payment))
        .route("/health", get(health_check))
        .with_state(AppState { checkout })
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn create_payment(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().clone();
    debug!("{} {}", method, request.uri().path());
    let response = match method {
        Method::OPTIONS => StatusCode::OK.into_response(),
        Method::POST => match read_order(request).await {
            Ok(order) => match state.checkout.create_payment(order).await {
                Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
                Err(err) => failure(&err),
            },
            Err(err) => {
                warn!("Malformed order body: {}", err);
                failure(&err)
            }
        },
        _ => (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(Failure {
                success: false,
                error: "Method Not Allowed".to_owned(),
            }),
        )
            .into_response(),
    };
    with_cors(response)
}

async fn read_order(request: Request) -> Result<OrderRequest, PaymentError> {
    let body = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|err| PaymentError::InvalidBody(err.to_string()))?;
    serde_json::from_slice(&body).map_err(|err| PaymentError::InvalidBody(err.to_string()))
}

fn failure(err: &PaymentError) -> Response {
    (
        err.status_code(),
        Json(Failure {
            success: false,
            error: err.public_message(),
        }),
    )
        .into_response()
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
