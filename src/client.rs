use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::GatewaySettings;
use crate::error::YooKassaError;
use crate::models::{ApiErrorBody, CreatePaymentRequest, Payment};

const IDEMPOTENCE_KEY_HEADER: &str = "Idempotence-Key";
const PAYMENTS_ENDPOINT: &str = "payments";

/// Создание платежа во внешнем шлюзе.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Один вызов = один запрос с новым ключом идемпотентности.
    async fn create_payment(&self, request: &CreatePaymentRequest)
    -> Result<Payment, YooKassaError>;
}

// --- Клиент YooKassa ---

#[derive(Clone)]
pub struct YooKassaClient {
    client: ReqwestClient,
    settings: GatewaySettings,
}

impl YooKassaClient {
    /// Создает клиент YooKassa API. Таймаут запроса берется из настроек.
    pub fn new(settings: GatewaySettings) -> Result<Self, YooKassaError> {
        let client = ReqwestClient::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(YooKassaClient { client, settings })
    }

    // Ключ генерируется на каждый вызов и не переиспользуется
    async fn send_request<T: Serialize>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response, YooKassaError> {
        let url = self.settings.base_url.join(endpoint)?;
        let idempotence_key = Uuid::new_v4().to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            IDEMPOTENCE_KEY_HEADER,
            HeaderValue::from_str(&idempotence_key)?,
        );

        debug!("POST {} (Idempotence-Key: {})", url, idempotence_key);
        let response = self
            .client
            .post(url)
            .basic_auth(
                &self.settings.shop_id,
                Some(self.settings.secret_key.expose()),
            )
            .headers(headers)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    async fn process_response<R: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<R, YooKassaError> {
        let status = response.status();
        if status.is_success() {
            // Неразборчивое тело 2xx это ошибка ответа, а не транспорта
            let body_text = response.text().await?;
            return serde_json::from_str::<R>(&body_text).map_err(|err| {
                debug!("Undecodable YooKassa response {}: {}", status, body_text);
                YooKassaError::Serde(err)
            });
        }

        let body_text = response.text().await.unwrap_or_default();
        debug!("YooKassa responded {}: {}", status, body_text);
        let details = serde_json::from_str::<ApiErrorBody>(&body_text).ok();
        Err(YooKassaError::Api {
            status,
            message: format!("HTTP {}", status),
            details,
        })
    }
}

#[async_trait]
impl PaymentGateway for YooKassaClient {
    async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<Payment, YooKassaError> {
        let response = self.send_request(PAYMENTS_ENDPOINT, request).await?;
        self.process_response(response).await
    }
}
