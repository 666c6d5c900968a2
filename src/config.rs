use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::tariff::TariffTable;

const DEFAULT_API_URL: &str = "https://api.yookassa.ru/v3/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Секретный ключ магазина. Не печатается ни в Debug, ни в логах.
#[derive(Clone)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        SecretKey(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

#[derive(Clone, Debug)]
pub struct GatewaySettings {
    pub shop_id: String,
    pub secret_key: SecretKey,
    pub base_url: Url,
    pub timeout: Duration,
}

/// Реквизиты чека 54-ФЗ.
#[derive(Clone, Debug)]
pub struct ReceiptSettings {
    pub vat_code: i32,
    pub tax_system_code: i32,
    pub payment_subject: Option<String>,
    pub payment_mode: Option<String>,
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        ReceiptSettings {
            vat_code: 1,
            tax_system_code: 1,
            payment_subject: None,
            payment_mode: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub gateway: GatewaySettings,
    pub receipt: ReceiptSettings,
    pub tariffs: TariffTable,
    pub return_url: Url,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Читает конфигурацию из окружения процесса.
    pub fn load() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let shop_id = required("YOOKASSA_SHOP_ID")?;
        let secret_key = SecretKey::new(required("YOOKASSA_API_KEY")?);
        let return_url = parse_url("YOOKASSA_RETURN_URL", &required("YOOKASSA_RETURN_URL")?)?;
        let tariffs = required("TARIFFS")?
            .parse::<TariffTable>()
            .map_err(|err| ConfigError::Invalid {
                key: "TARIFFS",
                reason: err.to_string(),
            })?;

        let mut base_url = var("YOOKASSA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = parse_url("YOOKASSA_API_URL", &base_url)?;

        let timeout = match var("YOOKASSA_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number("YOOKASSA_TIMEOUT_SECS", &v)?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let defaults = ReceiptSettings::default();
        let receipt = ReceiptSettings {
            vat_code: match var("RECEIPT_VAT_CODE") {
                Some(v) => parse_number("RECEIPT_VAT_CODE", &v)?,
                None => defaults.vat_code,
            },
            tax_system_code: match var("RECEIPT_TAX_SYSTEM_CODE") {
                Some(v) => parse_number("RECEIPT_TAX_SYSTEM_CODE", &v)?,
                None => defaults.tax_system_code,
            },
            payment_subject: var("RECEIPT_PAYMENT_SUBJECT"),
            payment_mode: var("RECEIPT_PAYMENT_MODE"),
        };

        let port = match var("PORT") {
            Some(v) => parse_number("PORT", &v)?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            gateway: GatewaySettings {
                shop_id,
                secret_key,
                base_url,
                timeout,
            },
            receipt,
            tariffs,
            return_url,
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err: std::net::AddrParseError| ConfigError::Invalid {
                key: "HOST",
                reason: err.to_string(),
            })
    }
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|err| ConfigError::Invalid {
        key,
        reason: err.to_string(),
    })
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("YOOKASSA_SHOP_ID", "123456"),
        ("YOOKASSA_API_KEY", "test_secret"),
        ("YOOKASSA_RETURN_URL", "https://flowers.example/success"),
        ("TARIFFS", "basic=500,standard=750,premium=1000"),
    ];

    #[test]
    fn defaults() {
        let cfg = Config::from_lookup(env(REQUIRED)).unwrap();
        assert_eq!(cfg.gateway.shop_id, "123456");
        assert_eq!(cfg.gateway.base_url.as_str(), "https://api.yookassa.ru/v3/");
        assert_eq!(cfg.gateway.timeout, Duration::from_secs(30));
        assert_eq!(cfg.receipt.vat_code, 1);
        assert_eq!(cfg.receipt.tax_system_code, 1);
        assert_eq!(cfg.listen_addr().unwrap().port(), 3000);
        assert!(cfg.tariffs.contains("premium"));
    }

    #[test]
    fn fails_fast_on_missing_required() {
        for (key, _) in REQUIRED {
            let pairs: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| k != key).collect();
            let err = Config::from_lookup(env(&pairs)).unwrap_err();
            assert_eq!(err, ConfigError::Missing(*key));
        }
    }

    #[test]
    fn blank_value_is_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("YOOKASSA_API_KEY", "   ");
        assert_eq!(
            Config::from_lookup(env(&pairs)).unwrap_err(),
            ConfigError::Missing("YOOKASSA_API_KEY")
        );
    }

    #[test]
    fn overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("YOOKASSA_API_URL", "http://127.0.0.1:9000/v3"),
            ("YOOKASSA_TIMEOUT_SECS", "5"),
            ("RECEIPT_VAT_CODE", "4"),
            ("RECEIPT_PAYMENT_SUBJECT", "service"),
            ("PORT", "8080"),
        ]);
        let cfg = Config::from_lookup(env(&pairs)).unwrap();
        assert_eq!(cfg.gateway.base_url.as_str(), "http://127.0.0.1:9000/v3/");
        assert_eq!(cfg.gateway.timeout, Duration::from_secs(5));
        assert_eq!(cfg.receipt.vat_code, 4);
        assert_eq!(cfg.receipt.payment_subject.as_deref(), Some("service"));
        assert_eq!(cfg.receipt.payment_mode, None);
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn rejects_invalid_values() {
        for (key, value) in [
            ("TARIFFS", "basic=free"),
            ("YOOKASSA_RETURN_URL", "not a url"),
            ("RECEIPT_TAX_SYSTEM_CODE", "usn"),
            ("PORT", "70000"),
        ] {
            let mut pairs: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != key).collect();
            pairs.push((key, value));
            let err = Config::from_lookup(env(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: k, .. } if k == key), "{key}: {err:?}");
        }
    }

    #[test]
    fn secret_is_redacted() {
        let cfg = Config::from_lookup(env(REQUIRED)).unwrap();
        let printed = format!("{:?}", cfg);
        assert!(!printed.contains("test_secret"));
        assert!(printed.contains("SecretKey(***)"));
    }
}
