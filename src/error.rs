use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ApiErrorBody;

/// Ошибки клиента YooKassa.
#[derive(Error, Debug)]
pub enum YooKassaError {
    #[error("Ошибка сети или HTTP запроса: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Ошибка API YooKassa (Статус: {status}): {message}")]
    Api {
        status: StatusCode,
        message: String,
        details: Option<ApiErrorBody>, // Детали ошибки от API, если тело разобралось
    },

    #[error("Ошибка сериализации/десериализации JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Отсутствует обязательное поле в ответе: {0}")]
    MissingField(&'static str),

    #[error("Неверный URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Неверное значение заголовка: {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}

impl YooKassaError {
    /// Текст для покупателя: description от YooKassa, иначе исходное сообщение.
    pub fn description(&self) -> String {
        match self {
            YooKassaError::Api {
                details: Some(ApiErrorBody {
                    description: Some(description),
                    ..
                }),
                ..
            } => description.clone(),
            YooKassaError::Api { message, .. } => message.clone(),
            YooKassaError::Transport(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

/// Ошибки создания платежа по заказу.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Отсутствуют обязательные параметры: {0}")]
    MissingParameter(&'static str),

    #[error("Неизвестный тариф: {0}")]
    UnknownPlan(String),

    #[error("Некорректное тело запроса: {0}")]
    InvalidBody(String),

    #[error("Сумма заказа слишком велика: {plan} x {deliveries}")]
    AmountOverflow { plan: String, deliveries: u32 },

    #[error(transparent)]
    Gateway(#[from] YooKassaError),
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::MissingParameter(_)
            | PaymentError::UnknownPlan(_)
            | PaymentError::InvalidBody(_)
            | PaymentError::AmountOverflow { .. } => StatusCode::BAD_REQUEST,
            PaymentError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> String {
        match self {
            PaymentError::Gateway(err) => err.description(),
            other => other.to_string(),
        }
    }
}
