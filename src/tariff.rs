use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::round_kopecks;

/// Цена одной доставки по ключу тарифа, в рублях.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffTable(BTreeMap<String, Decimal>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TariffParseError {
    #[error("пустая таблица тарифов")]
    Empty,
    #[error("ожидается запись вида key=price, получено `{0}`")]
    Malformed(String),
    #[error("некорректная цена тарифа `{key}`: `{price}`")]
    InvalidPrice { key: String, price: String },
    #[error("тариф `{0}` указан дважды")]
    Duplicate(String),
}

impl TariffTable {
    pub fn new<I, K>(entries: I) -> Result<Self, TariffParseError>
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: Into<String>,
    {
        let mut table = BTreeMap::new();
        for (key, price) in entries {
            let key = key.into();
            if price <= Decimal::ZERO {
                return Err(TariffParseError::InvalidPrice {
                    price: price.to_string(),
                    key,
                });
            }
            if table.insert(key.clone(), price).is_some() {
                return Err(TariffParseError::Duplicate(key));
            }
        }
        if table.is_empty() {
            return Err(TariffParseError::Empty);
        }
        Ok(TariffTable(table))
    }

    pub fn price(&self, plan_key: &str) -> Option<Decimal> {
        self.0.get(plan_key).copied()
    }

    pub fn contains(&self, plan_key: &str) -> bool {
        self.0.contains_key(plan_key)
    }

    pub fn plans(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Цена тарифа, умноженная на число доставок, с точностью до копеек.
    /// `None` для неизвестного тарифа.
    pub fn compute_amount(&self, plan_key: &str, delivery_count: u32) -> Option<Decimal> {
        let price = self.price(plan_key)?;
        let amount = price.checked_mul(Decimal::from(delivery_count))?;
        Some(round_kopecks(amount))
    }
}

/// Формат `basic=500,standard=750,premium=1000`.
impl FromStr for TariffTable {
    type Err = TariffParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, price) = entry
                .split_once('=')
                .ok_or_else(|| TariffParseError::Malformed(entry.to_owned()))?;
            let (key, price) = (key.trim(), price.trim());
            if key.is_empty() {
                return Err(TariffParseError::Malformed(entry.to_owned()));
            }
            let value = Decimal::from_str(price).map_err(|_| TariffParseError::InvalidPrice {
                key: key.to_owned(),
                price: price.to_owned(),
            })?;
            entries.push((key.to_owned(), value));
        }
        TariffTable::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format_kopecks;
    use rust_decimal_macros::dec;

    fn table() -> TariffTable {
        "basic=500, standard=750, premium=1000".parse().unwrap()
    }

    #[test]
    fn amount_is_price_times_deliveries() {
        let table = table();
        for (plan, price) in [("basic", dec!(500)), ("standard", dec!(750)), ("premium", dec!(1000))] {
            for n in 1..=12u32 {
                assert_eq!(
                    table.compute_amount(plan, n),
                    Some(price * Decimal::from(n)),
                    "{plan} x {n}"
                );
            }
        }
        assert_eq!(format_kopecks(table.compute_amount("standard", 2).unwrap()), "1500.00");
    }

    #[test]
    fn fractional_prices_stay_exact() {
        let table: TariffTable = "trial=0.10,odd=333.33".parse().unwrap();
        assert_eq!(table.compute_amount("trial", 3), Some(dec!(0.30)));
        assert_eq!(table.compute_amount("odd", 3), Some(dec!(999.99)));
    }

    #[test]
    fn unknown_plan_has_no_amount() {
        assert_eq!(table().compute_amount("gold", 2), None);
        assert!(!table().contains("gold"));
    }

    #[test]
    fn overflow_has_no_amount() {
        let table = TariffTable::new([("huge", Decimal::MAX)]).unwrap();
        assert_eq!(table.compute_amount("huge", 1), Some(round_kopecks(Decimal::MAX)));
        assert_eq!(table.compute_amount("huge", 2), None);
        assert!(table.contains("huge"));
    }

    #[test]
    fn rejects_bad_tables() {
        assert_eq!("".parse::<TariffTable>(), Err(TariffParseError::Empty));
        assert_eq!(
            "basic".parse::<TariffTable>(),
            Err(TariffParseError::Malformed("basic".to_owned()))
        );
        assert!(matches!(
            "basic=abc".parse::<TariffTable>(),
            Err(TariffParseError::InvalidPrice { .. })
        ));
        assert!(matches!(
            "basic=0".parse::<TariffTable>(),
            Err(TariffParseError::InvalidPrice { .. })
        ));
        assert!(matches!(
            "basic=-5".parse::<TariffTable>(),
            Err(TariffParseError::InvalidPrice { .. })
        ));
        assert_eq!(
            "basic=1,basic=2".parse::<TariffTable>(),
            Err(TariffParseError::Duplicate("basic".to_owned()))
        );
    }

    #[test]
    fn lists_plans_in_order() {
        assert_eq!(table().plans().collect::<Vec<_>>(), ["basic", "premium", "standard"]);
    }
}
