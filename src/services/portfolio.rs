// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Portfolio valuation and price-alert evaluation.
//!
//! Both work on a price map fetched once per request, so a user's whole
//! portfolio costs a single upstream call. Coins missing from the map
//! (unknown ids, or a degraded fetch) are reported unpriced rather than
//! valued at zero.

use crate::models::{CryptoHolding, PriceAlert};
use crate::services::crypto::PriceMap;
use crate::services::fetch::round2;
use serde::Serialize;

/// One holding at current prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValue {
    pub holding_id: i64,
    pub coin_id: String,
    pub symbol: String,
    pub amount: f64,
    /// `None` when no quote was available
    pub current_price: Option<f64>,
    pub current_value: Option<f64>,
    pub cost_basis: Option<f64>,
    pub profit_loss: Option<f64>,
    pub profit_loss_percentage: Option<f64>,
    pub change_24h: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioValuation {
    pub vs_currency: String,
    pub holdings: Vec<HoldingValue>,
    /// Sum over priced holdings only
    pub total_value: f64,
    /// Sum over priced holdings with a purchase price
    pub total_cost: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percentage: f64,
    /// Coin ids with no quote
    pub unpriced: Vec<String>,
}

/// Value `holdings` against `quotes`.
pub fn value_portfolio(
    holdings: &[CryptoHolding],
    quotes: &PriceMap,
    vs_currency: &str,
) -> PortfolioValuation {
    let mut values = Vec::with_capacity(holdings.len());
    let mut unpriced = Vec::new();
    let mut total_value = 0.0;
    let mut total_cost = 0.0;
    let mut costed_value = 0.0;

    for holding in holdings {
        let quote = quotes.get(&holding.coin_id);
        let current_value = quote.map(|q| holding.amount * q.price);
        let cost_basis = holding.purchase_price.map(|p| holding.amount * p);

        let (profit_loss, profit_loss_percentage) = match (current_value, cost_basis) {
            (Some(value), Some(cost)) => {
                total_cost += cost;
                costed_value += value;
                let pl = value - cost;
                let pct = if cost > 0.0 { pl / cost * 100.0 } else { 0.0 };
                (Some(round2(pl)), Some(round2(pct)))
            }
            _ => (None, None),
        };

        match current_value {
            Some(value) => total_value += value,
            None => unpriced.push(holding.coin_id.clone()),
        }

        values.push(HoldingValue {
            holding_id: holding.id,
            coin_id: holding.coin_id.clone(),
            symbol: holding.symbol.clone(),
            amount: holding.amount,
            current_price: quote.map(|q| q.price),
            current_value: current_value.map(round2),
            cost_basis: cost_basis.map(round2),
            profit_loss,
            profit_loss_percentage,
            change_24h: quote.map(|q| q.change_24h),
        });
    }

    let total_profit_loss = costed_value - total_cost;
    let total_profit_loss_percentage = if total_cost > 0.0 {
        total_profit_loss / total_cost * 100.0
    } else {
        0.0
    };

    PortfolioValuation {
        vs_currency: vs_currency.to_string(),
        holdings: values,
        total_value: round2(total_value),
        total_cost: round2(total_cost),
        total_profit_loss: round2(total_profit_loss),
        total_profit_loss_percentage: round2(total_profit_loss_percentage),
        unpriced,
    }
}

/// An alert whose condition held at the checked price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggeredAlert {
    pub alert_id: i64,
    pub coin_id: String,
    pub condition: crate::models::AlertCondition,
    pub target_price: f64,
    pub current_price: f64,
}

/// Active alerts whose condition is met by `quotes`. Inactive alerts and
/// coins without a quote never trigger.
pub fn evaluate_alerts(alerts: &[PriceAlert], quotes: &PriceMap) -> Vec<TriggeredAlert> {
    alerts
        .iter()
        .filter(|alert| alert.is_active)
        .filter_map(|alert| {
            let price = quotes.get(&alert.coin_id)?.price;
            alert
                .condition
                .is_met(price, alert.target_price)
                .then(|| TriggeredAlert {
                    alert_id: alert.id,
                    coin_id: alert.coin_id.clone(),
                    condition: alert.condition,
                    target_price: alert.target_price,
                    current_price: price,
                })
        })
        .collect()
}

/// Distinct coin ids referenced by a set of holdings or alerts, in order of
/// first appearance.
pub fn distinct_coin_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        if !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertCondition;
    use crate::services::crypto::PriceQuote;
    use chrono::Utc;

    fn quote(id: &str, price: f64) -> (String, PriceQuote) {
        (
            id.to_string(),
            PriceQuote {
                id: id.to_string(),
                price,
                change_24h: 1.5,
                ..Default::default()
            },
        )
    }

    fn holding(id: i64, coin_id: &str, amount: f64, purchase_price: Option<f64>) -> CryptoHolding {
        let now = Utc::now();
        CryptoHolding {
            id,
            user_id: 1,
            coin_id: coin_id.to_string(),
            coin_name: coin_id.to_string(),
            symbol: coin_id[..3].to_uppercase(),
            amount,
            purchase_price,
            purchase_date: None,
            added_at: now,
            updated_at: now,
        }
    }

    fn alert(
        id: i64,
        coin_id: &str,
        target: f64,
        condition: AlertCondition,
        active: bool,
    ) -> PriceAlert {
        PriceAlert {
            id,
            user_id: 1,
            coin_id: coin_id.to_string(),
            target_price: target,
            condition,
            is_active: active,
            created_at: Utc::now(),
            triggered_at: None,
        }
    }

    #[test]
    fn test_value_portfolio() {
        let quotes: PriceMap = [quote("bitcoin", 40000.0), quote("ethereum", 2000.0)]
            .into_iter()
            .collect();
        let holdings = vec![
            holding(1, "bitcoin", 0.5, Some(30000.0)),
            holding(2, "ethereum", 2.0, None),
            holding(3, "doesnotexist123", 10.0, Some(1.0)),
        ];

        let valuation = value_portfolio(&holdings, &quotes, "usd");

        assert_eq!(valuation.total_value, 24000.0);
        assert_eq!(valuation.total_cost, 15000.0);
        assert_eq!(valuation.total_profit_loss, 5000.0);
        assert_eq!(valuation.total_profit_loss_percentage, 33.33);
        assert_eq!(valuation.unpriced, vec!["doesnotexist123".to_string()]);

        let btc = &valuation.holdings[0];
        assert_eq!(btc.current_value, Some(20000.0));
        assert_eq!(btc.profit_loss, Some(5000.0));
        assert_eq!(btc.change_24h, Some(1.5));

        let eth = &valuation.holdings[1];
        assert_eq!(eth.current_value, Some(4000.0));
        assert_eq!(eth.profit_loss, None);

        let unknown = &valuation.holdings[2];
        assert_eq!(unknown.current_price, None);
        assert_eq!(unknown.current_value, None);
    }

    #[test]
    fn test_value_empty_portfolio() {
        let valuation = value_portfolio(&[], &PriceMap::new(), "eur");
        assert_eq!(valuation.vs_currency, "eur");
        assert_eq!(valuation.total_value, 0.0);
        assert_eq!(valuation.total_profit_loss_percentage, 0.0);
        assert!(valuation.holdings.is_empty());
    }

    #[test]
    fn test_evaluate_alerts() {
        let quotes: PriceMap = [quote("bitcoin", 40000.0)].into_iter().collect();
        let alerts = vec![
            alert(1, "bitcoin", 35000.0, AlertCondition::Above, true),
            alert(2, "bitcoin", 35000.0, AlertCondition::Below, true),
            alert(3, "bitcoin", 30000.0, AlertCondition::Above, false),
            alert(4, "ethereum", 1.0, AlertCondition::Above, true),
        ];

        let triggered = evaluate_alerts(&alerts, &quotes);
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].alert_id, 1);
        assert_eq!(triggered[0].current_price, 40000.0);
    }

    #[test]
    fn test_distinct_coin_ids() {
        let ids = distinct_coin_ids(["bitcoin", "ethereum", "bitcoin"]);
        assert_eq!(ids, vec!["bitcoin".to_string(), "ethereum".to_string()]);
    }
}
