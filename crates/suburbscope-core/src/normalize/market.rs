use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use time::macros::format_description;
use time::{Date, Duration};

use super::{as_object, from_canonical, result_rows, round_to};
use crate::data_source::{RawRecord, SourceError};
use crate::{
    MarketAnalytics, MarketTrends, PriceComparison, PriceGrowth, PricePoint, PropertyType,
    RegionalComparison,
};

const SELL_METRIC: &str = "sell_price";
const RENT_METRIC: &str = "rent_price";
const TREND_WINDOW: usize = 6;
const WEEKS_PER_YEAR: f64 = 52.0;

#[derive(Debug, Deserialize)]
struct ProviderMarketRow {
    #[serde(default)]
    metric: Option<String>,
    #[serde(default)]
    property_type: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    /// Comparison region (capital city remainder).
    #[serde(default)]
    cr: Option<ComparisonValue>,
    /// Broader statistical area.
    #[serde(default)]
    sa3: Option<ComparisonValue>,
}

#[derive(Debug, Deserialize)]
struct ComparisonValue {
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct SeriesPoint {
    date: Date,
    price: f64,
    region: Option<f64>,
    broader_region: Option<f64>,
}

pub fn normalize_market_trends(
    raw: RawRecord,
    property_type: Option<PropertyType>,
) -> Result<MarketTrends, SourceError> {
    let value = match raw {
        RawRecord::Fixture(value) => return from_canonical(value, "fixture market trends"),
        RawRecord::Provider(value) => value,
    };

    if as_object(&value, "market trends")?.contains_key("priceHistory") {
        return from_canonical(value, "market trends");
    }

    let rows = result_rows(&value)
        .ok_or_else(|| SourceError::malformed("market payload has no 'results' array"))?
        .into_iter()
        .filter(Value::is_object)
        .map(|row| {
            serde_json::from_value::<ProviderMarketRow>(row)
                .map_err(|error| SourceError::malformed(format!("market row is unusable: {error}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let property_type = property_type.unwrap_or(PropertyType::House);
    let sales = series(&rows, SELL_METRIC, property_type)?;
    let rents = series(&rows, RENT_METRIC, property_type)?;

    Ok(build(&sales, &rents))
}

/// One point per date, first row wins, ascending.
fn series(
    rows: &[ProviderMarketRow],
    metric: &str,
    property_type: PropertyType,
) -> Result<Vec<SeriesPoint>, SourceError> {
    let mut by_date = BTreeMap::new();

    for row in rows {
        let matches = row.metric.as_deref() == Some(metric)
            && row
                .property_type
                .as_deref()
                .is_some_and(|kind| kind.eq_ignore_ascii_case(property_type.as_str()));
        if !matches {
            continue;
        }
        let (Some(date), Some(price)) = (row.date.as_deref(), positive(row.value)) else {
            continue;
        };

        let date = parse_date(date)?;
        by_date.entry(date).or_insert(SeriesPoint {
            date,
            price,
            region: positive(row.cr.as_ref().and_then(|cr| cr.value)),
            broader_region: positive(row.sa3.as_ref().and_then(|sa3| sa3.value)),
        });
    }

    Ok(by_date.into_values().collect())
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value > 0.0)
}

fn parse_date(raw: &str) -> Result<Date, SourceError> {
    let day = raw.get(..10).unwrap_or(raw);
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|error| SourceError::malformed(format!("market row date '{raw}' is invalid: {error}")))
}

fn month_label(date: Date) -> String {
    date.format(format_description!("[month repr:short] [year]"))
        .unwrap_or_else(|_| date.to_string())
}

fn price_point(point: &SeriesPoint) -> PricePoint {
    PricePoint {
        month: month_label(point.date),
        price: point.price,
        region_price: point.region,
        broader_region_price: point.broader_region,
    }
}

fn build(sales: &[SeriesPoint], rents: &[SeriesPoint]) -> MarketTrends {
    let current_price = sales.last().map(|point| point.price);
    let regional_comparison = regional_comparison(sales);
    let rental_yield = match (rents.last(), current_price) {
        (Some(rent), Some(price)) => Some(round_to(rent.price * WEEKS_PER_YEAR / price * 100.0, 1)),
        _ => None,
    };

    MarketTrends {
        price_history: sales.iter().map(price_point).collect(),
        rent_history: rents.iter().map(price_point).collect(),
        current_price,
        price_growth: price_growth(sales),
        analytics: analytics(sales, regional_comparison.as_ref()),
        regional_comparison,
        rental_yield,
        extra: Map::new(),
    }
}

fn percent_change(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}

fn price_growth(sales: &[SeriesPoint]) -> Option<PriceGrowth> {
    let (first, last) = (sales.first()?, sales.last()?);
    if sales.len() < 2 {
        return None;
    }

    Some(PriceGrowth {
        one_year: growth_since(sales, Duration::days(365)),
        five_year: growth_since(sales, Duration::days(365 * 5)),
        total: Some(round_to(percent_change(first.price, last.price), 2)),
    })
}

/// Growth from the first point at or after `span` before the latest point.
/// Absent when the series does not reach back that far.
fn growth_since(sales: &[SeriesPoint], span: Duration) -> Option<f64> {
    let last = sales.last()?;
    let cutoff = last.date.checked_sub(span)?;
    if sales.first()?.date > cutoff {
        return None;
    }

    let base = sales.iter().find(|point| point.date >= cutoff)?;
    Some(round_to(percent_change(base.price, last.price), 2))
}

fn compare(price: f64, other: f64) -> PriceComparison {
    let difference = percent_change(other, price);
    PriceComparison {
        price: other.round(),
        difference: round_to(difference, 1),
        status: String::from(if difference < 0.0 { "below" } else { "above" }),
    }
}

fn regional_comparison(sales: &[SeriesPoint]) -> Option<RegionalComparison> {
    let latest = sales.last()?;
    let region = latest.region.map(|other| compare(latest.price, other));
    let broader_region = latest.broader_region.map(|other| compare(latest.price, other));

    (region.is_some() || broader_region.is_some()).then_some(RegionalComparison {
        region,
        broader_region,
    })
}

/// Coefficient of variation; needs two prices.
fn volatility(prices: &[f64]) -> Option<f64> {
    if prices.len() < 2 {
        return None;
    }
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    if mean == 0.0 {
        return None;
    }
    let variance = prices
        .iter()
        .map(|price| (price - mean).powi(2))
        .sum::<f64>()
        / (prices.len() - 1) as f64;
    Some(variance.sqrt() / mean)
}

fn volatility_label(volatility: f64) -> &'static str {
    if volatility < 0.15 {
        "low"
    } else if volatility < 0.25 {
        "medium"
    } else {
        "high"
    }
}

fn trend(sales: &[SeriesPoint]) -> &'static str {
    let recent = &sales[sales.len().saturating_sub(TREND_WINDOW)..];
    match (recent.first(), recent.last()) {
        (Some(first), Some(last)) if recent.len() >= 2 => {
            let change = percent_change(first.price, last.price);
            if change > 2.0 {
                "rising"
            } else if change < -2.0 {
                "declining"
            } else {
                "stable"
            }
        }
        _ => "stable",
    }
}

fn analytics(sales: &[SeriesPoint], comparison: Option<&RegionalComparison>) -> Option<MarketAnalytics> {
    let (first, last) = (sales.first()?, sales.last()?);
    let prices = sales.iter().map(|point| point.price).collect::<Vec<_>>();
    let volatility = volatility(&prices);
    let trend = trend(sales);
    let growth_ratio = last.price / first.price;
    let region_difference = comparison
        .and_then(|comparison| comparison.region.as_ref())
        .map(|region| region.difference);

    let mut insights = Vec::new();
    match region_difference {
        Some(difference) if difference < -10.0 => insights.push(format!(
            "Excellent value - {:.1}% below regional average",
            difference.abs()
        )),
        Some(difference) if difference < -5.0 => insights.push(format!(
            "Good value - {:.1}% below regional average",
            difference.abs()
        )),
        _ => {}
    }
    match trend {
        "rising" => insights.push(String::from("Positive price momentum in recent months")),
        "declining" => insights.push(String::from("Price declining in recent months")),
        _ => {}
    }
    match volatility {
        Some(value) if value < 0.1 => insights.push(String::from("Stable market with low volatility")),
        Some(value) if value > 0.2 => insights.push(String::from("High price volatility - higher risk")),
        _ => {}
    }
    if growth_ratio > 2.0 {
        insights.push(format!(
            "Strong long-term growth of {:.0}%",
            (growth_ratio - 1.0) * 100.0
        ));
    }

    let investment_score = match (volatility, region_difference) {
        (Some(volatility), Some(difference)) => {
            Some(investment_score(growth_ratio, difference, volatility))
        }
        _ => None,
    };

    Some(MarketAnalytics {
        volatility: volatility.map(|value| volatility_label(value).to_owned()),
        trend: trend.to_owned(),
        insights,
        investment_score,
    })
}

/// Weighted 0–10 score: growth 40%, value against the region 30%, stability 30%.
fn investment_score(growth_ratio: f64, region_difference: f64, volatility: f64) -> f64 {
    let growth = growth_ratio.min(3.0) * 3.33;
    let value = if region_difference < -10.0 {
        10.0
    } else if region_difference < -5.0 {
        8.0
    } else if region_difference < 0.0 {
        6.0
    } else {
        4.0
    };
    let stability = if volatility < 0.1 {
        10.0
    } else if volatility < 0.15 {
        7.0
    } else {
        5.0
    };

    round_to(growth * 0.4 + value * 0.3 + stability * 0.3, 1)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data_source::SourceErrorKind;

    fn provider_rows() -> Value {
        json!({"results": [[
            {"date": "2023-01-01", "metric": "sell_price", "property_type": "house", "value": 800000.0,
             "cr": {"value": 900000.0}, "sa3": {"value": 1000000.0}},
            {"date": "2023-07-01", "metric": "sell_price", "property_type": "house", "value": 840000.0},
            {"date": "2024-01-01", "metric": "sell_price", "property_type": "house", "value": 880000.0,
             "cr": {"value": 1000000.0}, "sa3": {"value": 800000.0}},
            {"date": "2024-01-01", "metric": "sell_price", "property_type": "unit", "value": 500000.0},
            {"date": "2024-01-01", "metric": "rent_price", "property_type": "house", "value": 800.0}
        ]]})
    }

    #[test]
    fn builds_labelled_history_and_analytics() {
        let trends = normalize_market_trends(RawRecord::Provider(provider_rows()), None)
            .expect("normalizes");

        let months = trends
            .price_history
            .iter()
            .map(|point| point.month.as_str())
            .collect::<Vec<_>>();
        assert_eq!(months, vec!["Jan 2023", "Jul 2023", "Jan 2024"]);
        assert_eq!(trends.price_history[0].region_price, Some(900000.0));
        assert_eq!(trends.price_history[1].region_price, None);
        assert_eq!(trends.current_price, Some(880000.0));

        let growth = trends.price_growth.expect("growth");
        assert_eq!(growth.one_year, Some(10.0));
        assert_eq!(growth.five_year, None);
        assert_eq!(growth.total, Some(10.0));

        let comparison = trends.regional_comparison.expect("comparison");
        let region = comparison.region.expect("region");
        assert_eq!(region.difference, -12.0);
        assert_eq!(region.status, "below");
        assert_eq!(comparison.broader_region.expect("broader").status, "above");

        let analytics = trends.analytics.expect("analytics");
        assert_eq!(analytics.volatility.as_deref(), Some("low"));
        assert_eq!(analytics.trend, "rising");
        assert_eq!(analytics.investment_score, Some(7.5));
        assert_eq!(analytics.insights.len(), 3);

        assert_eq!(trends.rental_yield, Some(4.7));
    }

    #[test]
    fn property_type_selects_unit_series() {
        let trends = normalize_market_trends(
            RawRecord::Provider(provider_rows()),
            Some(PropertyType::Unit),
        )
        .expect("normalizes");

        assert_eq!(trends.price_history.len(), 1);
        assert_eq!(trends.price_growth, None);
        assert_eq!(trends.regional_comparison, None);
        let analytics = trends.analytics.expect("analytics");
        assert_eq!(analytics.volatility, None);
        assert_eq!(analytics.investment_score, None);
    }

    #[test]
    fn empty_series_omits_every_derived_field() {
        let trends = normalize_market_trends(RawRecord::Provider(json!({"results": []})), None)
            .expect("normalizes");

        assert!(trends.price_history.is_empty());
        assert_eq!(trends.current_price, None);
        assert_eq!(trends.analytics, None);
        assert_eq!(trends.rental_yield, None);
    }

    #[test]
    fn invalid_dates_are_malformed() {
        let error = normalize_market_trends(
            RawRecord::Provider(json!({"results": [
                {"date": "last year", "metric": "sell_price", "property_type": "house", "value": 1.0}
            ]})),
            None,
        )
        .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::MalformedUpstreamPayload);
    }

    #[test]
    fn fixture_records_pass_through() {
        let trends = normalize_market_trends(
            RawRecord::Fixture(json!({
                "priceHistory": [{"month": "Jan 2024", "price": 1200000}],
                "rentalYield": 3.4
            })),
            None,
        )
        .expect("fixture");

        assert_eq!(trends.price_history[0].price, 1200000.0);
        assert_eq!(trends.rental_yield, Some(3.4));
        assert_eq!(trends.analytics, None);
    }
}
