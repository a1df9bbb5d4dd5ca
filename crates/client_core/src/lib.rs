use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use shared::{
    domain::{MarketItem, NewsItem},
    protocol::{SubscribeAck, SubscribeRequest},
};
use tokio::sync::broadcast;
use tracing::info;

pub mod config;
pub mod error;
pub mod loader;
pub mod subscription;
pub mod transport;
pub mod views;

pub use config::{load_settings, ClientSettings};
pub use error::{Endpoint, FetchError, RequestError, SubscribeError};
pub use loader::{DataLoader, LoadState, PageData};
pub use subscription::{
    SubmitOutcome, SubscriptionController, SubscriptionSnapshot, SubscriptionState,
};
pub use transport::HttpFinanceApi;
pub use views::{derive_market_views, MarketViews};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Remote finance service: news, market quotes and newsletter signup.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    async fn list_news(&self) -> Result<Vec<NewsItem>, RequestError>;
    async fn list_markets(&self) -> Result<Vec<MarketItem>, RequestError>;
    async fn subscribe(&self, request: SubscribeRequest) -> Result<SubscribeAck, RequestError>;
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    LoadStateChanged(LoadState),
    SubscriptionStateChanged(SubscriptionState),
}

/// Everything a renderer needs to draw the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub load: LoadState,
    pub stocks: Vec<MarketItem>,
    pub cryptos: Vec<MarketItem>,
    pub subscription: SubscriptionState,
    pub email: String,
    pub last_subscribe_error: Option<SubscribeError>,
    pub input_disabled: bool,
}

impl PageSnapshot {
    pub fn news(&self) -> &[NewsItem] {
        self.load.news()
    }
}

pub struct FinanceClient {
    loader: DataLoader,
    subscription: SubscriptionController,
    events: broadcast::Sender<ClientEvent>,
}

impl FinanceClient {
    pub fn new(api: Arc<dyn FinanceApi>) -> Self {
        Self::with_reset_delay(api, subscription::DEFAULT_SUCCESS_RESET_DELAY)
    }

    pub fn with_reset_delay(api: Arc<dyn FinanceApi>, reset_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            loader: DataLoader::new(Arc::clone(&api), events.clone()),
            subscription: SubscriptionController::with_reset_delay(
                api,
                events.clone(),
                reset_delay,
            ),
            events,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let api = HttpFinanceApi::from_settings(settings)?;
        info!(base_url = %api.base_url(), "finance client: configured");
        Ok(Self::with_reset_delay(
            Arc::new(api),
            settings.success_reset_delay(),
        ))
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    pub fn subscription(&self) -> &SubscriptionController {
        &self.subscription
    }

    pub async fn load(&self) -> LoadState {
        self.loader.load().await
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> PageSnapshot {
        let load = self.loader.state().await;
        let views = load.market_views();
        let form = self.subscription.snapshot().await;
        PageSnapshot {
            load,
            stocks: views.stocks,
            cryptos: views.cryptos,
            input_disabled: form.state.input_disabled(),
            subscription: form.state,
            email: form.email,
            last_subscribe_error: form.last_error,
        }
    }

    /// Tears down timers owned by the page; call when the view goes away.
    pub async fn shutdown(&self) {
        self.subscription.shutdown().await;
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
