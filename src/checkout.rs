//! Создание платежа по заказу подписки на цветы.
//!
//! Заказ проверяется, сумма считается один раз по таблице тарифов и
//! попадает без изменений и в чек, и в сам платеж. После проверки
//! в YooKassa уходит ровно один запрос.

use std::sync::Arc;

use log::{error, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::client::PaymentGateway;
use crate::config::ReceiptSettings;
use crate::error::{PaymentError, YooKassaError};
use crate::models::{
    Amount, ConfirmationRequest, CreatePaymentRequest, CURRENCY_RUB, Payment, PaymentMetadata,
    Receipt, ReceiptCustomer, ReceiptItem, format_kopecks,
};
use crate::order::{Order, OrderRequest};
use crate::tariff::TariffTable;

/// Ответ сайту при успешном создании платежа.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub success: bool,
    pub order_id: String,
    pub payment_id: String,
    pub payment_url: String,
    pub amount: String,
    pub currency: String,
    pub status: String,
}

pub fn build_receipt(order: &Order, amount: Decimal, settings: &ReceiptSettings) -> Receipt {
    let count = order.delivery_count();
    Receipt {
        customer: ReceiptCustomer {
            email: order.customer_email.clone(),
            phone: order.customer_phone.clone(),
        },
        items: vec![ReceiptItem {
            description: format!(
                "Подписка на цветы - {} доставок ({})",
                count, order.plan_key
            ),
            quantity: count,
            amount: Amount::rub(amount),
            vat_code: settings.vat_code,
            payment_subject: settings.payment_subject.clone(),
            payment_mode: settings.payment_mode.clone(),
        }],
        tax_system_code: settings.tax_system_code,
    }
}

pub fn build_payment_request(
    order: &Order,
    amount: Decimal,
    receipt: Receipt,
    return_url: &str,
) -> Result<CreatePaymentRequest, YooKassaError> {
    let deliveries = serde_json::to_string(&order.deliveries)?;
    Ok(CreatePaymentRequest {
        amount: Amount::rub(amount),
        confirmation: ConfirmationRequest::redirect(return_url),
        capture: true,
        description: format!("Подписка на цветы - {} доставок", order.delivery_count()),
        metadata: PaymentMetadata {
            order_id: order.order_id.clone(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            plan: order.plan_key.clone(),
            deliveries,
        },
        receipt,
    })
}

/// Все, что нужно для создания платежа. Не хранит изменяемого состояния,
/// один экземпляр обслуживает параллельные запросы.
pub struct Checkout {
    gateway: Arc<dyn PaymentGateway>,
    tariffs: TariffTable,
    receipt: ReceiptSettings,
    return_url: String,
}

impl Checkout {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        tariffs: TariffTable,
        receipt: ReceiptSettings,
        return_url: impl Into<String>,
    ) -> Self {
        Checkout {
            gateway,
            tariffs,
            receipt,
            return_url: return_url.into(),
        }
    }

    /// Цепочка: проверка → цена → чек → запрос → YooKassa → ответ.
    pub async fn create_payment(
        &self,
        request: OrderRequest,
    ) -> Result<PaymentResult, PaymentError> {
        let order = request.validate(&self.tariffs).inspect_err(|err| {
            warn!("Rejected order: {}", err);
        })?;

        // Тариф уже проверен в validate, None здесь значит только переполнение
        let amount = self
            .tariffs
            .compute_amount(&order.plan_key, order.delivery_count())
            .ok_or_else(|| PaymentError::AmountOverflow {
                plan: order.plan_key.clone(),
                deliveries: order.delivery_count(),
            })
            .inspect_err(|err| warn!("Rejected order {}: {}", order.order_id, err))?;
        info!(
            "Creating payment: order={} plan={} deliveries={} amount={}",
            order.order_id,
            order.plan_key,
            order.delivery_count(),
            format_kopecks(amount)
        );

        let receipt = build_receipt(&order, amount, &self.receipt);
        let request = build_payment_request(&order, amount, receipt, &self.return_url)?;

        let payment = self
            .gateway
            .create_payment(&request)
            .await
            .and_then(|payment| PaymentResult::from_payment(&order, amount, payment))
            .inspect_err(|err| {
                error!("Payment for order {} failed: {}", order.order_id, err);
            })?;

        info!(
            "Payment {} created for order {}: {}",
            payment.payment_id, payment.order_id, payment.status
        );
        Ok(payment)
    }
}

impl PaymentResult {
    fn from_payment(order: &Order, amount: Decimal, payment: Payment) -> Result<Self, YooKassaError> {
        let payment_url = payment
            .confirmation_url()
            .ok_or(YooKassaError::MissingField("confirmation.confirmation_url"))?
            .to_owned();
        let payment_id = payment.id.ok_or(YooKassaError::MissingField("id"))?;
        Ok(PaymentResult {
            success: true,
            order_id: order.order_id.clone(),
            payment_id,
            payment_url,
            amount: format_kopecks(amount),
            currency: CURRENCY_RUB.to_owned(),
            status: payment.status.as_str().to_owned(),
        })
    }
}
