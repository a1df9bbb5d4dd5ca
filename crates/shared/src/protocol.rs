use serde::{Deserialize, Serialize};

pub const NEWS_PATH: &str = "/api/noticias";
pub const MARKETS_PATH: &str = "/api/mercados";
pub const SUBSCRIBE_PATH: &str = "/api/suscribir";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

impl SubscribeRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Acknowledgement body returned alongside a 2xx subscription response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeAck {
    #[serde(rename = "mensaje", default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
