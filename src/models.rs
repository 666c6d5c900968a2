use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub const CURRENCY_RUB: &str = "RUB";
pub const CONFIRMATION_REDIRECT: &str = "redirect";

// Тело ошибки от API YooKassa. Поля опциональны: прокси и балансировщики
// отвечают своим форматом, а нам нужен хотя бы description.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ApiErrorBody {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>, // "error"
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>, // "invalid_request", "invalid_credentials", ...
    #[serde(default)]
    pub description: Option<String>, // Описание ошибки для разработчика
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>, // Параметр, вызвавший ошибку
}

// --- Запрос на создание платежа ---

// Сумма
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub value: String,    // Сумма строкой, ровно два знака после точки ("1500.00")
    pub currency: String, // Код валюты ("RUB")
}

impl Amount {
    /// Сумма в рублях. Значение округляется до копеек и всегда
    /// передается с двумя знаками после точки.
    pub fn rub(value: Decimal) -> Self {
        Amount {
            value: format_kopecks(value),
            currency: CURRENCY_RUB.to_owned(),
        }
    }
}

/// Округление до копеек, масштаб всегда 2.
pub fn round_kopecks(value: Decimal) -> Decimal {
    let mut value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value
}

pub fn format_kopecks(value: Decimal) -> String {
    round_kopecks(value).to_string()
}

// Подтверждение платежа (в запросе)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConfirmationRequest {
    #[serde(rename = "type")]
    pub confirmation_type: String, // Только "redirect"
    pub return_url: String,        // Куда вернуть покупателя после оплаты
}

impl ConfirmationRequest {
    pub fn redirect(return_url: &str) -> Self {
        ConfirmationRequest {
            confirmation_type: CONFIRMATION_REDIRECT.to_owned(),
            return_url: return_url.to_owned(),
        }
    }
}

// Метаданные заказа. YooKassa хранит только строки, поэтому доставки
// передаются сериализованным JSON.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentMetadata {
    pub order_id: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub plan: String,
    pub deliveries: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatePaymentRequest {
    pub amount: Amount,
    pub confirmation: ConfirmationRequest,
    pub capture: bool, // Всегда true: одностадийная оплата
    pub description: String,
    pub metadata: PaymentMetadata,
    pub receipt: Receipt, // Чек 54-ФЗ
}

// --- Чек 54-ФЗ ---

// Отсутствующие контакты уходят явным null, а не пустой строкой.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ReceiptCustomer {
    pub email: Option<String>,
    pub phone: Option<String>, // В формате ITU-T E.164
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReceiptItem {
    pub description: String,
    pub quantity: u32,
    pub amount: Amount,
    pub vat_code: i32, // Ставка НДС
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_subject: Option<String>, // Признак предмета расчета ("service", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>, // Признак способа расчета ("full_payment", ...)
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Receipt {
    pub customer: ReceiptCustomer,
    pub items: Vec<ReceiptItem>,
    pub tax_system_code: i32, // Код системы налогообложения
}

// --- Ответ API ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    WaitingForCapture,
    Succeeded,
    Canceled,
    #[serde(other)]
    #[default]
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::WaitingForCapture => "waiting_for_capture",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Unknown => "unknown",
        }
    }
}

// Подтверждение (в ответе)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConfirmationResponse {
    #[serde(rename = "type", default)]
    pub confirmation_type: Option<String>,
    #[serde(default)]
    pub confirmation_url: Option<String>, // Ссылка на оплату
    #[serde(default)]
    pub return_url: Option<String>,
}

// Платеж в ответе. Обязательные для нас поля (id и ссылка на оплату)
// проверяются после разбора, чтобы отличать кривой ответ от ошибки сети.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Payment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub confirmation: Option<ConfirmationResponse>,
    #[serde(default)]
    pub created_at: Option<String>, // ISO 8601
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub test: bool,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl Payment {
    pub fn confirmation_url(&self) -> Option<&str> {
        self.confirmation
            .as_ref()
            .and_then(|c| c.confirmation_url.as_deref())
    }
}
