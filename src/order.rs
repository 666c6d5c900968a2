use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PaymentError;
use crate::tariff::TariffTable;

/// Заказ в том виде, в каком его присылает сайт.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub order_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub plan_key: Option<String>,
    // Содержимое доставок нам не важно, только их количество
    pub deliveries: Option<Vec<Value>>,
}

/// Проверенный заказ: обязательные поля заполнены, тариф существует.
#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub plan_key: String,
    pub deliveries: Vec<Value>,
}

impl Order {
    pub fn delivery_count(&self) -> u32 {
        // validate не пропускает больше u32::MAX доставок
        self.deliveries.len() as u32
    }
}

impl OrderRequest {
    pub fn validate(self, tariffs: &TariffTable) -> Result<Order, PaymentError> {
        let order_id = required(self.order_id, "orderId")?;
        let customer_name = required(self.customer_name, "customerName")?;
        let plan_key = required(self.plan_key, "planKey")?;
        let deliveries = match self.deliveries {
            Some(deliveries) if !deliveries.is_empty() => deliveries,
            _ => return Err(PaymentError::MissingParameter("deliveries")),
        };
        if u32::try_from(deliveries.len()).is_err() {
            return Err(PaymentError::InvalidBody("слишком много доставок".to_owned()));
        }
        if !tariffs.contains(&plan_key) {
            return Err(PaymentError::UnknownPlan(plan_key));
        }

        Ok(Order {
            order_id,
            customer_name,
            customer_email: optional(self.customer_email),
            customer_phone: optional(self.customer_phone),
            plan_key,
            deliveries,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, PaymentError> {
    optional(value).ok_or(PaymentError::MissingParameter(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
