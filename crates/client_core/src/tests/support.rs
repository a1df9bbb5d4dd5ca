use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{MarketItem, MarketKind, NewsCategory, NewsId, NewsItem},
    protocol::{SubscribeAck, SubscribeRequest},
};
use tokio::sync::{broadcast, oneshot, Mutex};

use crate::{error::Endpoint, error::RequestError, ClientEvent, FinanceApi, SubscriptionState};

/// In-memory finance service with canned responses and call accounting.
pub(crate) struct ScriptedFinanceApi {
    news: Result<Vec<NewsItem>, RequestError>,
    markets: Result<Vec<MarketItem>, RequestError>,
    news_delay: Duration,
    markets_delay: Duration,
    subscribe_results: Mutex<VecDeque<Result<SubscribeAck, RequestError>>>,
    subscribe_gate: Mutex<Option<oneshot::Receiver<()>>>,
    news_calls: AtomicUsize,
    markets_calls: AtomicUsize,
    subscribe_calls: AtomicUsize,
    pub(crate) subscribed_emails: Mutex<Vec<String>>,
}

impl ScriptedFinanceApi {
    pub(crate) fn new() -> Self {
        Self {
            news: Ok(Vec::new()),
            markets: Ok(Vec::new()),
            news_delay: Duration::ZERO,
            markets_delay: Duration::ZERO,
            subscribe_results: Mutex::new(VecDeque::new()),
            subscribe_gate: Mutex::new(None),
            news_calls: AtomicUsize::new(0),
            markets_calls: AtomicUsize::new(0),
            subscribe_calls: AtomicUsize::new(0),
            subscribed_emails: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_news(mut self, news: Result<Vec<NewsItem>, RequestError>) -> Self {
        self.news = news;
        self
    }

    pub(crate) fn with_markets(mut self, markets: Result<Vec<MarketItem>, RequestError>) -> Self {
        self.markets = markets;
        self
    }

    pub(crate) fn with_delays(mut self, news_delay: Duration, markets_delay: Duration) -> Self {
        self.news_delay = news_delay;
        self.markets_delay = markets_delay;
        self
    }

    /// Queued results are consumed one per call; an empty queue accepts.
    pub(crate) fn with_subscribe_results(
        self,
        results: Vec<Result<SubscribeAck, RequestError>>,
    ) -> Self {
        *self.subscribe_results.try_lock().expect("fresh api") = results.into();
        self
    }

    /// Holds the next subscribe call until the sender fires.
    pub(crate) fn with_subscribe_gate(self, gate: oneshot::Receiver<()>) -> Self {
        *self.subscribe_gate.try_lock().expect("fresh api") = Some(gate);
        self
    }

    pub(crate) fn news_calls(&self) -> usize {
        self.news_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn markets_calls(&self) -> usize {
        self.markets_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FinanceApi for ScriptedFinanceApi {
    async fn list_news(&self) -> Result<Vec<NewsItem>, RequestError> {
        self.news_calls.fetch_add(1, Ordering::SeqCst);
        if !self.news_delay.is_zero() {
            tokio::time::sleep(self.news_delay).await;
        }
        self.news.clone()
    }

    async fn list_markets(&self) -> Result<Vec<MarketItem>, RequestError> {
        self.markets_calls.fetch_add(1, Ordering::SeqCst);
        if !self.markets_delay.is_zero() {
            tokio::time::sleep(self.markets_delay).await;
        }
        self.markets.clone()
    }

    async fn subscribe(&self, request: SubscribeRequest) -> Result<SubscribeAck, RequestError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.subscribed_emails.lock().await.push(request.email);

        let gate = self.subscribe_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.subscribe_results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(SubscribeAck::default()))
    }
}

pub(crate) fn news_item(id: i64, category: &str) -> NewsItem {
    NewsItem {
        id: NewsId::Number(id),
        category: NewsCategory::from(category.to_string()),
        source: "NY Times".to_string(),
        title: format!("Titular {id}"),
        body: "Resumen de la noticia.".to_string(),
        published: "2026-01-10".to_string(),
        original_url: format!("https://example.com/news/{id}"),
        image: None,
    }
}

pub(crate) fn market_item(name: &str, kind: MarketKind, price: f64, change: f64) -> MarketItem {
    MarketItem {
        name: name.to_string(),
        kind,
        price,
        change_24h: Some(change),
        logo: None,
    }
}

pub(crate) fn transport_error(endpoint: Endpoint) -> RequestError {
    RequestError::Transport {
        endpoint,
        message: "connection refused".to_string(),
    }
}

pub(crate) fn status_error(endpoint: Endpoint, status: u16) -> RequestError {
    RequestError::Status {
        endpoint,
        status,
        detail: None,
    }
}

/// Next subscription transition, skipping unrelated events.
pub(crate) async fn next_subscription_state(
    rx: &mut broadcast::Receiver<ClientEvent>,
) -> SubscriptionState {
    loop {
        match rx.recv().await.expect("event channel open") {
            ClientEvent::SubscriptionStateChanged(state) => return state,
            ClientEvent::LoadStateChanged(_) => continue,
        }
    }
}
