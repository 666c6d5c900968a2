#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use flower_checkout::Config;
use serde_json::Value;

/// Запрос, который получила поддельная YooKassa.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub idempotence_key: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
pub struct FakeYooKassa {
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    reply: Arc<(StatusCode, Value)>,
}

impl FakeYooKassa {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn payments(
    State(fake): State<FakeYooKassa>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    fake.requests.lock().unwrap().push(Recorded {
        idempotence_key: header("Idempotence-Key"),
        authorization: header("Authorization"),
        body,
    });
    let (status, reply) = fake.reply.as_ref();
    (*status, Json(reply.clone()))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Поднимает поддельный `POST /v3/payments`, который всегда отвечает `reply`.
pub async fn spawn_gateway(status: StatusCode, reply: Value) -> (FakeYooKassa, SocketAddr) {
    let fake = FakeYooKassa {
        requests: Arc::new(Mutex::new(Vec::new())),
        reply: Arc::new((status, reply)),
    };
    let router = Router::new()
        .route("/v3/payments", post(payments))
        .with_state(fake.clone());
    (fake, serve(router).await)
}

pub fn config(gateway: SocketAddr) -> Config {
    let api_url = format!("http://{}/v3", gateway);
    Config::from_lookup(|key| {
        let value = match key {
            "YOOKASSA_SHOP_ID" => Some("123456"),
            "YOOKASSA_API_KEY" => Some("test_secret"),
            "YOOKASSA_RETURN_URL" => Some("https://flowers.example/success"),
            "TARIFFS" => Some("basic=500,standard=750,premium=1000"),
            "YOOKASSA_API_URL" => Some(api_url.as_str()),
            "YOOKASSA_TIMEOUT_SECS" => Some("5"),
            _ => None,
        };
        value.map(str::to_owned)
    })
    .unwrap()
}

/// Поднимает сервис, направленный на поддельную YooKassa, и возвращает его адрес.
pub async fn spawn_service(gateway: SocketAddr) -> String {
    let app = flower_checkout::app(&config(gateway)).unwrap();
    let addr = serve(app).await;
    format!("http://{}{}", addr, flower_checkout::handler::CREATE_PAYMENT_PATH)
}
