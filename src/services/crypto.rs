// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CoinGecko adapter: spot prices, coin details, market listings and charts.
//!
//! CoinGecko's public API works without a key. When a demo key is configured
//! it is sent as a header to get the higher rate limit.

use crate::services::fetch::{Fetched, Upstream};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// The ping probe uses a shorter bound than data calls.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_VS_CURRENCY: &str = "usd";
pub const DEFAULT_TOP_LIMIT: u32 = 100;
pub const DEFAULT_CHART_DAYS: u32 = 7;

/// Coins shown when the caller does not name any.
pub const DEFAULT_COINS: &[&str] = &["bitcoin", "ethereum", "cardano", "ripple", "solana"];

/// CoinGecko client.
#[derive(Clone)]
pub struct CryptoClient {
    upstream: Upstream,
    api_key: Option<String>,
}

/// Spot prices keyed by coin id.
pub type PriceMap = BTreeMap<String, PriceQuote>;

impl CryptoClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            upstream: Upstream::new(http, "crypto", BASE_URL),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.upstream.set_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.upstream.set_timeout(timeout);
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.upstream.get(path);
        match self.api_key.as_deref() {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Whether `/ping` answers with a success status.
    pub async fn check_status(&self) -> bool {
        match self.get("/ping").timeout(PING_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "CoinGecko ping failed");
                false
            }
        }
    }

    /// Spot prices for several coins.
    ///
    /// Ids the provider does not know, or cannot quote in `vs_currency`, are
    /// simply absent from the result.
    pub async fn prices(&self, coin_ids: &[String], vs_currency: &str) -> Fetched<PriceMap> {
        let vs = vs_currency.to_lowercase();
        let ids = coin_ids.join(",");
        let request = self.get("/simple/price").query(&[
            ("ids", ids.as_str()),
            ("vs_currencies", vs.as_str()),
            ("include_24hr_change", "true"),
            ("include_market_cap", "true"),
            ("include_24hr_vol", "true"),
        ]);

        self.upstream
            .fetch("prices", request, |raw: RawPrices| reshape_prices(raw, &vs))
            .await
    }

    /// Detailed market data for a single coin.
    pub async fn coin_details(&self, coin_id: &str, vs_currency: &str) -> Fetched<CoinDetail> {
        let vs = vs_currency.to_lowercase();
        let request = self
            .get(&format!("/coins/{}", urlencoding::encode(coin_id)))
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "true"),
                ("community_data", "false"),
                ("developer_data", "false"),
            ]);

        self.upstream
            .fetch("coin_details", request, |raw: RawCoin| raw.into_detail(&vs))
            .await
    }

    /// Coins currently trending on CoinGecko.
    pub async fn trending(&self) -> Fetched<TrendingCoins> {
        let request = self.get("/search/trending");
        self.upstream
            .fetch("trending", request, |raw: RawTrending| TrendingCoins {
                coins: raw
                    .coins
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|entry| entry.item)
                    .map(RawTrendingItem::into_coin)
                    .collect(),
            })
            .await
    }

    /// One page of coins ordered by market cap.
    pub async fn top_coins(
        &self,
        vs_currency: &str,
        limit: u32,
        page: u32,
    ) -> Fetched<Vec<MarketCoin>> {
        let request = self.get("/coins/markets").query(&[
            ("vs_currency", vs_currency.to_lowercase()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", limit.to_string()),
            ("page", page.to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", "24h,7d".to_string()),
        ]);

        self.upstream
            .fetch("top_coins", request, |raw: Vec<RawMarketCoin>| {
                raw.into_iter().map(RawMarketCoin::into_coin).collect()
            })
            .await
    }

    /// Price, market cap and volume series for the last `days` days.
    pub async fn market_chart(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Fetched<MarketChart> {
        let request = self
            .get(&format!(
                "/coins/{}/market_chart",
                urlencoding::encode(coin_id)
            ))
            .query(&[
                ("vs_currency", vs_currency.to_lowercase()),
                ("days", days.to_string()),
            ]);

        self.upstream
            .fetch("market_chart", request, |raw: RawChart| MarketChart {
                prices: raw.prices.unwrap_or_default(),
                market_caps: raw.market_caps.unwrap_or_default(),
                total_volumes: raw.total_volumes.unwrap_or_default(),
            })
            .await
    }
}

// ─── Output Shapes ───────────────────────────────────────────

/// Spot price for one coin in the requested currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub id: String,
    pub price: f64,
    pub change_24h: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: f64,
    pub market_cap: f64,
    pub market_cap_rank: Option<u32>,
    pub total_volume: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub price_change_24h: f64,
    pub price_change_percentage_24h: f64,
    pub circulating_supply: f64,
    /// `None` for coins without a supply cap
    pub total_supply: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoins {
    pub coins: Vec<TrendingCoin>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
    pub thumb: Option<String>,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: f64,
    pub market_cap: f64,
    pub market_cap_rank: Option<u32>,
    pub total_volume: f64,
    pub price_change_percentage_24h: f64,
    pub price_change_percentage_7d: f64,
}

/// `[timestamp_ms, value]` series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    pub prices: Vec<[f64; 2]>,
    pub market_caps: Vec<[f64; 2]>,
    pub total_volumes: Vec<[f64; 2]>,
}

// ─── Provider Payloads ───────────────────────────────────────

type RawPrices = HashMap<String, HashMap<String, Option<f64>>>;

fn reshape_prices(raw: RawPrices, vs: &str) -> PriceMap {
    let change_key = format!("{vs}_24h_change");
    let cap_key = format!("{vs}_market_cap");
    let vol_key = format!("{vs}_24h_vol");

    raw.into_iter()
        .filter_map(|(id, fields)| {
            // No quote in `vs` means unpriced, not free.
            let price = fields.get(vs).copied().flatten()?;
            let field = |key: &str| fields.get(key).copied().flatten().unwrap_or(0.0);
            let quote = PriceQuote {
                id: id.clone(),
                price,
                change_24h: field(&change_key),
                market_cap: field(&cap_key),
                volume_24h: field(&vol_key),
            };
            Some((id, quote))
        })
        .collect()
}

type CurrencyMap = HashMap<String, Option<f64>>;

fn in_currency(map: &Option<CurrencyMap>, vs: &str) -> f64 {
    map.as_ref()
        .and_then(|m| m.get(vs).copied().flatten())
        .unwrap_or(0.0)
}

#[derive(Deserialize, Default)]
struct RawImage {
    large: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawMarketData {
    current_price: Option<CurrencyMap>,
    market_cap: Option<CurrencyMap>,
    total_volume: Option<CurrencyMap>,
    high_24h: Option<CurrencyMap>,
    low_24h: Option<CurrencyMap>,
    price_change_24h: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    circulating_supply: Option<f64>,
    total_supply: Option<f64>,
}

#[derive(Deserialize)]
struct RawCoin {
    id: Option<String>,
    symbol: Option<String>,
    name: Option<String>,
    image: Option<RawImage>,
    market_cap_rank: Option<u32>,
    market_data: Option<RawMarketData>,
}

impl RawCoin {
    fn into_detail(self, vs: &str) -> CoinDetail {
        let market = self.market_data.unwrap_or_default();
        CoinDetail {
            id: self.id.unwrap_or_default(),
            symbol: self.symbol.unwrap_or_default().to_uppercase(),
            name: self.name.unwrap_or_default(),
            image: self.image.and_then(|i| i.large),
            current_price: in_currency(&market.current_price, vs),
            market_cap: in_currency(&market.market_cap, vs),
            market_cap_rank: self.market_cap_rank,
            total_volume: in_currency(&market.total_volume, vs),
            high_24h: in_currency(&market.high_24h, vs),
            low_24h: in_currency(&market.low_24h, vs),
            price_change_24h: market.price_change_24h.unwrap_or(0.0),
            price_change_percentage_24h: market.price_change_percentage_24h.unwrap_or(0.0),
            circulating_supply: market.circulating_supply.unwrap_or(0.0),
            total_supply: market.total_supply,
        }
    }
}

#[derive(Deserialize)]
struct RawTrending {
    coins: Option<Vec<RawTrendingEntry>>,
}

#[derive(Deserialize)]
struct RawTrendingEntry {
    item: Option<RawTrendingItem>,
}

#[derive(Deserialize)]
struct RawTrendingItem {
    id: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    market_cap_rank: Option<u32>,
    thumb: Option<String>,
    score: Option<u32>,
}

impl RawTrendingItem {
    fn into_coin(self) -> TrendingCoin {
        TrendingCoin {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            symbol: self.symbol.unwrap_or_default(),
            market_cap_rank: self.market_cap_rank,
            thumb: self.thumb,
            score: self.score.unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
struct RawMarketCoin {
    id: Option<String>,
    symbol: Option<String>,
    name: Option<String>,
    image: Option<String>,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    market_cap_rank: Option<u32>,
    total_volume: Option<f64>,
    price_change_percentage_24h_in_currency: Option<f64>,
    price_change_percentage_7d_in_currency: Option<f64>,
}

impl RawMarketCoin {
    fn into_coin(self) -> MarketCoin {
        MarketCoin {
            id: self.id.unwrap_or_default(),
            symbol: self.symbol.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            image: self.image,
            current_price: self.current_price.unwrap_or(0.0),
            market_cap: self.market_cap.unwrap_or(0.0),
            market_cap_rank: self.market_cap_rank,
            total_volume: self.total_volume.unwrap_or(0.0),
            price_change_percentage_24h: self
                .price_change_percentage_24h_in_currency
                .unwrap_or(0.0),
            price_change_percentage_7d: self
                .price_change_percentage_7d_in_currency
                .unwrap_or(0.0),
        }
    }
}

#[derive(Deserialize)]
struct RawChart {
    prices: Option<Vec<[f64; 2]>>,
    market_caps: Option<Vec<[f64; 2]>>,
    total_volumes: Option<Vec<[f64; 2]>>,
}
