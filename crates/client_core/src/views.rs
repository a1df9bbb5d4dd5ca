//! Market views derived from the loaded market collection.

use shared::domain::{MarketItem, MarketKind};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketViews {
    pub stocks: Vec<MarketItem>,
    pub cryptos: Vec<MarketItem>,
}

/// Splits `markets` into stocks and cryptos, preserving source order.
/// Items of any other kind are left out of both views.
pub fn derive_market_views(markets: &[MarketItem]) -> MarketViews {
    let mut views = MarketViews::default();
    for item in markets {
        match item.kind {
            MarketKind::Stock => views.stocks.push(item.clone()),
            MarketKind::Crypto => views.cryptos.push(item.clone()),
            MarketKind::Other(_) => {}
        }
    }
    views
}
