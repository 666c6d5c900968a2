//! Создание платежей YooKassa для подписки на цветы.
//!
//! Сайт присылает заказ, сервис считает сумму по тарифу, собирает чек 54-ФЗ,
//! создает платеж в YooKassa и возвращает ссылку на оплату.

pub mod checkout;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod models;
pub mod order;
pub mod tariff;

use std::sync::Arc;

use axum::Router;

pub use checkout::{Checkout, PaymentResult};
pub use client::{PaymentGateway, YooKassaClient};
pub use config::Config;
pub use error::{PaymentError, YooKassaError};
pub use order::OrderRequest;
pub use tariff::TariffTable;

/// Собирает HTTP-приложение поверх настоящего клиента YooKassa.
pub fn app(config: &Config) -> Result<Router, YooKassaError> {
    let gateway = YooKassaClient::new(config.gateway.clone())?;
    let checkout = Checkout::new(
        Arc::new(gateway),
        config.tariffs.clone(),
        config.receipt.clone(),
        config.return_url.as_str(),
    );
    Ok(handler::router(Arc::new(checkout)))
}
