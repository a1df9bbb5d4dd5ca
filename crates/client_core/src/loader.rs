use std::sync::Arc;

use futures::future::try_join;
use shared::domain::{MarketItem, NewsItem};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

use crate::{
    error::FetchError,
    views::{derive_market_views, MarketViews},
    ClientEvent, FinanceApi,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageData {
    pub news: Vec<NewsItem>,
    pub markets: Vec<MarketItem>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready(PageData),
    Failed(FetchError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn data(&self) -> Option<&PageData> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn news(&self) -> &[NewsItem] {
        self.data().map(|data| data.news.as_slice()).unwrap_or_default()
    }

    /// Empty until the page data is ready.
    pub fn market_views(&self) -> MarketViews {
        self.data()
            .map(|data| derive_market_views(&data.markets))
            .unwrap_or_default()
    }
}

struct LoaderState {
    started: bool,
    current: LoadState,
}

/// Fetches news and markets once and publishes the combined result.
pub struct DataLoader {
    api: Arc<dyn FinanceApi>,
    inner: Mutex<LoaderState>,
    events: broadcast::Sender<ClientEvent>,
}

impl DataLoader {
    pub fn new(api: Arc<dyn FinanceApi>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            api,
            inner: Mutex::new(LoaderState {
                started: false,
                current: LoadState::Loading,
            }),
            events,
        }
    }

    pub async fn state(&self) -> LoadState {
        self.inner.lock().await.current.clone()
    }

    /// Runs the initial fetch. Later calls issue no requests and return the
    /// state published so far (`Loading` while the first call is in flight).
    pub async fn load(&self) -> LoadState {
        {
            let mut guard = self.inner.lock().await;
            if guard.started {
                debug!("loader: load already started; returning current state");
                return guard.current.clone();
            }
            guard.started = true;
        }

        info!("loader: fetching news and markets");
        // try_join resolves on the first error without waiting for the other request
        let next = match try_join(self.api.list_news(), self.api.list_markets()).await {
            Ok((news, markets)) => {
                info!(
                    news = news.len(),
                    markets = markets.len(),
                    "loader: page data ready"
                );
                LoadState::Ready(PageData { news, markets })
            }
            Err(err) => {
                error!(endpoint = %err.endpoint(), "loader: initial fetch failed: {err}");
                LoadState::Failed(FetchError::from(err))
            }
        };

        let mut guard = self.inner.lock().await;
        guard.current = next.clone();
        let _ = self.events.send(ClientEvent::LoadStateChanged(next.clone()));
        next
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
