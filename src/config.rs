use serde::{Deserialize, Serialize};

use crate::errors::{BillingError, Result};

/// billing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub currency: CurrencyFormat,
    pub debt_horizon: DebtHorizon,
    pub labels: StatusLabels,
}

/// how amounts are rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub symbol_position: SymbolPosition,
    pub thousands_separator: char,
    pub decimal_separator: char,
    /// decimals used when a caller does not pass its own
    pub default_decimals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

/// which months of the current year count towards outstanding debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtHorizon {
    /// every month up to and including the current one
    ThroughCurrentMonth,
    /// only months that have already closed
    ThroughPreviousMonth,
}

/// texts shown in the billing grid cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLabels {
    pub not_applicable: String,
    pub exempt: String,
    pub unpaid: String,
    pub pending: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self::spanish_euro()
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::euro()
    }
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self::spanish()
    }
}

impl CurrencyFormat {
    /// "12.056,00€"
    pub fn euro() -> Self {
        Self {
            symbol: "€".to_string(),
            symbol_position: SymbolPosition::Suffix,
            thousands_separator: '.',
            decimal_separator: ',',
            default_decimals: 2,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.thousands_separator == self.decimal_separator {
            return Err(BillingError::InvalidConfiguration {
                message: format!(
                    "thousands and decimal separators must differ (both '{}')",
                    self.decimal_separator
                ),
            });
        }

        if self.default_decimals > 8 {
            return Err(BillingError::InvalidConfiguration {
                message: format!("too many decimals: {}", self.default_decimals),
            });
        }

        Ok(())
    }
}

impl StatusLabels {
    pub fn spanish() -> Self {
        Self {
            not_applicable: "-".to_string(),
            exempt: "Exento".to_string(),
            unpaid: "Impagado".to_string(),
            pending: String::new(),
        }
    }
}

impl BillingConfig {
    /// configuration used by the school: euros, spanish labels
    pub fn spanish_euro() -> Self {
        Self {
            currency: CurrencyFormat::euro(),
            debt_horizon: DebtHorizon::ThroughCurrentMonth,
            labels: StatusLabels::spanish(),
        }
    }

    /// load from json, missing fields fall back to the spanish euro preset
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BillingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.currency.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_spanish_euro() {
        let config = BillingConfig::default();
        assert_eq!(config.currency.symbol, "€");
        assert_eq!(config.currency.symbol_position, SymbolPosition::Suffix);
        assert_eq!(config.debt_horizon, DebtHorizon::ThroughCurrentMonth);
        assert_eq!(config.labels.exempt, "Exento");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = BillingConfig::from_json(
            r#"{ "debt_horizon": "ThroughPreviousMonth", "labels": { "unpaid": "Debe" } }"#,
        )
        .unwrap();

        assert_eq!(config.debt_horizon, DebtHorizon::ThroughPreviousMonth);
        assert_eq!(config.labels.unpaid, "Debe");
        assert_eq!(config.labels.exempt, "Exento");
        assert_eq!(config.currency, CurrencyFormat::euro());
    }

    #[test]
    fn test_rejects_clashing_separators() {
        let result = BillingConfig::from_json(
            r#"{ "currency": { "thousands_separator": ",", "decimal_separator": "," } }"#,
        );
        assert!(matches!(result, Err(BillingError::InvalidConfiguration { .. })));
    }
}
