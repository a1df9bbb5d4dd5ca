//! reqwest-backed implementation of [`FinanceApi`].

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{MarketItem, NewsItem},
    error::ServiceError,
    protocol::{SubscribeAck, SubscribeRequest},
};
use tracing::{debug, warn};
use url::Url;

use crate::{config::ClientSettings, error::Endpoint, error::RequestError, FinanceApi};

pub struct HttpFinanceApi {
    http: Client,
    base_url: Url,
}

impl HttpFinanceApi {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let base_url = settings.api_base_url()?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build finance api http client")?;
        Ok(Self::new(http, base_url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, RequestError> {
        // keep any path prefix on the base, `Url::join` would drop it
        let raw = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.path()
        );
        Url::parse(&raw).map_err(|err| RequestError::Transport {
            endpoint,
            message: format!("invalid endpoint url '{raw}': {err}"),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, RequestError> {
        let url = self.endpoint_url(endpoint)?;
        debug!(endpoint = %endpoint, "finance api: GET {url}");
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error(endpoint, err))?;
        let res = ensure_success(endpoint, res).await?;
        let bytes = res
            .bytes()
            .await
            .map_err(|err| transport_error(endpoint, err))?;
        serde_json::from_slice(&bytes).map_err(|err| RequestError::Decode {
            endpoint,
            message: err.to_string(),
        })
    }
}

fn transport_error(endpoint: Endpoint, err: reqwest::Error) -> RequestError {
    RequestError::Transport {
        endpoint,
        message: err.to_string(),
    }
}

async fn ensure_success(endpoint: Endpoint, res: Response) -> Result<Response, RequestError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let detail = match res.bytes().await {
        Ok(body) => serde_json::from_slice::<ServiceError>(&body)
            .map(|err| err.summary())
            .ok()
            .or_else(|| {
                let text = String::from_utf8_lossy(&body).trim().to_string();
                (!text.is_empty()).then_some(text)
            }),
        Err(_) => None,
    };
    warn!(
        endpoint = %endpoint,
        status = status.as_u16(),
        "finance api: request rejected"
    );
    Err(RequestError::Status {
        endpoint,
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl FinanceApi for HttpFinanceApi {
    async fn list_news(&self) -> Result<Vec<NewsItem>, RequestError> {
        self.get_json(Endpoint::News).await
    }

    async fn list_markets(&self) -> Result<Vec<MarketItem>, RequestError> {
        self.get_json(Endpoint::Markets).await
    }

    async fn subscribe(&self, request: SubscribeRequest) -> Result<SubscribeAck, RequestError> {
        let endpoint = Endpoint::Subscribe;
        let url = self.endpoint_url(endpoint)?;
        debug!(endpoint = %endpoint, "finance api: POST {url}");
        let res = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| transport_error(endpoint, err))?;
        let res = ensure_success(endpoint, res).await?;

        // the acknowledgement body is informational; a 2xx is acceptance on its own
        let ack = match res.bytes().await {
            Ok(body) => serde_json::from_slice::<SubscribeAck>(&body).unwrap_or_default(),
            Err(err) => {
                debug!(endpoint = %endpoint, "finance api: unreadable ack body: {err}");
                SubscribeAck::default()
            }
        };
        Ok(ack)
    }
}
