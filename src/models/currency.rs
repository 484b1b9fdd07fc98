//! Currency catalogue and amount formatting

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Where the currency symbol goes relative to the number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Prefix,
    Suffix,
}

impl SymbolPosition {
    pub fn ordinal(&self) -> i32 {
        match self {
            Self::Prefix => 0,
            Self::Suffix => 1,
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Self {
        if ordinal == 1 {
            Self::Suffix
        } else {
            Self::Prefix
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code
    pub code: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub position: SymbolPosition,
}

const CATALOGUE: &[(&str, &str, &str)] = &[
    ("USD", "$", "US Dollar"),
    ("EUR", "€", "Euro"),
    ("GBP", "£", "British Pound"),
    ("INR", "₹", "Indian Rupee"),
    ("JPY", "¥", "Japanese Yen"),
    ("CNY", "¥", "Chinese Yuan"),
    ("CAD", "CA$", "Canadian Dollar"),
    ("AUD", "A$", "Australian Dollar"),
    ("CHF", "CHF", "Swiss Franc"),
    ("SEK", "kr", "Swedish Krona"),
    ("BRL", "R$", "Brazilian Real"),
    ("MXN", "MX$", "Mexican Peso"),
    ("SGD", "S$", "Singapore Dollar"),
    ("ZAR", "R", "South African Rand"),
    ("KRW", "₩", "South Korean Won"),
];

impl Currency {
    /// Every supported currency, prefix-positioned
    pub fn all() -> Vec<Currency> {
        CATALOGUE
            .iter()
            .map(|(code, symbol, name)| Currency {
                code: (*code).to_string(),
                symbol: (*symbol).to_string(),
                name: (*name).to_string(),
                position: SymbolPosition::Prefix,
            })
            .collect()
    }

    /// Look up a currency by code, case-insensitively
    pub fn find(code: &str) -> Option<Currency> {
        Self::all()
            .into_iter()
            .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
    }

    pub fn with_position(mut self, position: SymbolPosition) -> Self {
        self.position = position;
        self
    }

    /// Render an amount, e.g. `-$1,234.50` or `1,234.50 €`
    pub fn format(&self, money: Money) -> String {
        let sign = if money.is_negative() { "-" } else { "" };
        let digits = money.abs().format_grouped();
        match self.position {
            SymbolPosition::Prefix => format!("{}{}{}", sign, self.symbol, digits),
            SymbolPosition::Suffix => format!("{}{} {}", sign, digits, self.symbol),
        }
    }

    pub fn amount(&self, money: Money) -> Amount {
        Amount {
            value: money,
            formatted: self.format(money),
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency {
            code: "USD".into(),
            symbol: "$".into(),
            name: "US Dollar".into(),
            position: SymbolPosition::Prefix,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.symbol)
    }
}

/// A value paired with its display string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Amount {
    pub value: Money,
    pub formatted: String,
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted)
    }
}
