//! Plain-text rendering of a [`PageSnapshot`].

use std::fmt::Write as _;

use client_core::{LoadState, PageSnapshot, SubscriptionState};
use shared::domain::{MarketItem, NewsItem, Polarity};

pub fn render_page(snapshot: &PageSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&render_ticker("ACCIONES", &snapshot.stocks));
    out.push_str(&render_ticker("CRYPTO", &snapshot.cryptos));
    out.push('\n');

    match &snapshot.load {
        LoadState::Loading => out.push_str("Consultando fuentes globales...\n"),
        LoadState::Failed(err) => {
            let _ = writeln!(out, "No se pudieron cargar las noticias: {err}");
        }
        LoadState::Ready(_) => {
            for item in snapshot.news() {
                out.push_str(&render_news_item(item));
            }
        }
    }

    out.push('\n');
    out.push_str(&render_subscription(snapshot));
    out
}

pub fn render_subscription(snapshot: &PageSnapshot) -> String {
    match snapshot.subscription {
        SubscriptionState::Idle => "Newsletter: suscríbete para recibir el resumen diario.\n".to_string(),
        SubscriptionState::Sending => "Newsletter: enviando...\n".to_string(),
        SubscriptionState::Success => {
            "¡Listo! Revisa tu correo (incluso Spam) para ver tu resumen.\n".to_string()
        }
        SubscriptionState::Error => {
            let mut line =
                "Hubo un problema al enviar. Asegúrate de que el backend esté corriendo.".to_string();
            if let Some(err) = &snapshot.last_subscribe_error {
                let _ = write!(line, " ({err})");
            }
            line.push('\n');
            line
        }
    }
}

fn render_ticker(label: &str, items: &[MarketItem]) -> String {
    let mut line = format!("{label:<9}|");
    for item in items {
        let marker = match item.polarity() {
            Polarity::Gain => '+',
            Polarity::Loss => '-',
        };
        let _ = write!(line, " {} ${} {marker}", item.name, format_price(item.price));
    }
    line.push('\n');
    line
}

fn render_news_item(item: &NewsItem) -> String {
    let date = item
        .published_on()
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| item.published.clone());
    let marker = if item.category.is_business() { '$' } else { '*' };
    format!(
        "{marker} [{}] {} | {} | {date}\n    {}\n    {}\n",
        item.category, item.title, item.source, item.body, item.original_url
    )
}

/// Thousands separators and at most three fraction digits.
fn format_price(price: f64) -> String {
    let fixed = format!("{:.3}", price.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if price < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}
