use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const BUSINESS_LABEL: &str = "Negocios";
const TECHNOLOGY_LABEL: &str = "Tecnología";
const STOCK_LABEL: &str = "Accion";
const CRYPTO_LABEL: &str = "Cripto";

/// News identifiers arrive either as UUID strings or as plain numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NewsId {
    Number(i64),
    Text(String),
}

impl fmt::Display for NewsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NewsCategory {
    Business,
    Technology,
    Other(String),
}

impl NewsCategory {
    pub fn label(&self) -> &str {
        match self {
            Self::Business => BUSINESS_LABEL,
            Self::Technology => TECHNOLOGY_LABEL,
            Self::Other(label) => label,
        }
    }

    pub fn is_business(&self) -> bool {
        matches!(self, Self::Business)
    }
}

impl From<String> for NewsCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            BUSINESS_LABEL => Self::Business,
            // the feed scanner has shipped both spellings
            TECHNOLOGY_LABEL | "Tecnologia" => Self::Technology,
            _ => Self::Other(value),
        }
    }
}

impl From<NewsCategory> for String {
    fn from(value: NewsCategory) -> Self {
        match value {
            NewsCategory::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: NewsId,
    #[serde(rename = "categoria")]
    pub category: NewsCategory,
    #[serde(rename = "fuente")]
    pub source: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "contenido")]
    pub body: String,
    #[serde(rename = "fecha")]
    pub published: String,
    #[serde(rename = "url_original")]
    pub original_url: String,
    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl NewsItem {
    /// Calendar date of `published` when it is an ISO `YYYY-MM-DD` string.
    pub fn published_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.published.trim(), "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketKind {
    Stock,
    Crypto,
    Other(String),
}

impl MarketKind {
    pub fn label(&self) -> &str {
        match self {
            Self::Stock => STOCK_LABEL,
            Self::Crypto => CRYPTO_LABEL,
            Self::Other(label) => label,
        }
    }
}

impl From<String> for MarketKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            STOCK_LABEL => Self::Stock,
            CRYPTO_LABEL => Self::Crypto,
            _ => Self::Other(value),
        }
    }
}

impl From<MarketKind> for String {
    fn from(value: MarketKind) -> Self {
        match value {
            MarketKind::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Gain,
    Loss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketItem {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: MarketKind,
    #[serde(rename = "precio")]
    pub price: f64,
    /// `None` when the upstream quote did not report a 24h change.
    #[serde(rename = "cambio_24h", default)]
    pub change_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl MarketItem {
    /// An unknown change renders like a gain.
    pub fn polarity(&self) -> Polarity {
        match self.change_24h {
            Some(change) if change < 0.0 => Polarity::Loss,
            _ => Polarity::Gain,
        }
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.logo.as_deref().filter(|logo| !logo.trim().is_empty())
    }
}
