//! Dashboard metrics aggregation
//!
//! Orders are taken as raw JSON records: depending on the endpoint the
//! revenue lives in `totalAmount` or `total` and may be a number or a
//! numeric string.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use rust_decimal::prelude::*;
use serde::Serialize;
use serde_json::Value;
use shared::models::{Table, TableStatus};
use shared::money::{add_money, to_decimal, to_f64};
use shared::status::OrderStatus;
use shared::util::{parse_number, parse_timestamp};
use std::collections::HashMap;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Quantity sold of one menu item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSales {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub today_orders: usize,
    pub yesterday_orders: usize,
    pub today_revenue: f64,
    pub yesterday_revenue: f64,
    /// Percent change against yesterday, 1 dp
    pub orders_trend: f64,
    pub revenue_trend: f64,
    pub active_tables: usize,
    pub total_menu_items: usize,
    /// Today's best sellers first
    pub items_sold: Vec<ItemSales>,
}

#[derive(Default)]
struct DayBucket {
    orders: usize,
    revenue: Decimal,
}

impl DashboardMetrics {
    /// Aggregate today/yesterday figures in the restaurant's local day
    ///
    /// Records without a parseable `createdAt` are skipped. Cancelled orders
    /// are counted but bring no revenue.
    pub fn compute(
        orders: &[Value],
        tables: &[Table],
        menu_item_count: usize,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Self {
        let today = now.with_timezone(&offset).date_naive();
        let yesterday = today - Duration::days(1);

        let mut today_bucket = DayBucket::default();
        let mut yesterday_bucket = DayBucket::default();
        let mut sold: HashMap<String, ItemSales> = HashMap::new();
        let mut skipped = 0usize;

        for order in orders {
            let Some(day) = local_day(order, offset) else {
                skipped += 1;
                continue;
            };
            let bucket = if day == today {
                &mut today_bucket
            } else if day == yesterday {
                &mut yesterday_bucket
            } else {
                continue;
            };

            bucket.orders = bucket.orders.saturating_add(1);
            if is_cancelled(order) {
                continue;
            }
            bucket.revenue = add_money(bucket.revenue, to_decimal(order_revenue(order)));
            if day == today {
                tally_items(order, &mut sold);
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Orders without createdAt left out of dashboard");
        }

        let mut items_sold: Vec<ItemSales> = sold.into_values().collect();
        items_sold.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));

        let today_revenue = to_f64(today_bucket.revenue);
        let yesterday_revenue = to_f64(yesterday_bucket.revenue);

        Self {
            today_orders: today_bucket.orders,
            yesterday_orders: yesterday_bucket.orders,
            today_revenue,
            yesterday_revenue,
            orders_trend: trend(today_bucket.orders as f64, yesterday_bucket.orders as f64),
            revenue_trend: trend(today_revenue, yesterday_revenue),
            active_tables: tables
                .iter()
                .filter(|t| t.status == TableStatus::Occupied)
                .count(),
            total_menu_items: menu_item_count,
            items_sold,
        }
    }
}

impl DashboardMetrics {
    /// [`Self::compute`] in the configured restaurant time zone
    pub fn compute_with_config(
        orders: &[Value],
        tables: &[Table],
        menu_item_count: usize,
        now: DateTime<Utc>,
        config: &ClientConfig,
    ) -> ClientResult<Self> {
        Ok(Self::compute(
            orders,
            tables,
            menu_item_count,
            now,
            config.local_offset()?,
        ))
    }
}

/// Percent change from `yesterday` to `today`, rounded to 1 dp
///
/// With nothing yesterday any activity today counts as +100%.
pub fn trend(today: f64, yesterday: f64) -> f64 {
    if yesterday == 0.0 {
        return if today > 0.0 { 100.0 } else { 0.0 };
    }
    let pct = Decimal::from_f64(today)
        .zip(Decimal::from_f64(yesterday))
        .and_then(|(t, y)| t.checked_sub(y).map(|diff| (diff, y)))
        .and_then(|(diff, y)| diff.checked_div(y))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));
    match pct {
        Some(pct) => pct
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or_default(),
        None => {
            tracing::warn!(today, yesterday, "Trend outside decimal range");
            let pct = (today - yesterday) / yesterday * 100.0;
            if pct.is_finite() {
                (pct * 10.0).round() / 10.0
            } else {
                0.0
            }
        }
    }
}

/// Revenue of one record: `totalAmount`, else `total`; anything unparseable is 0
pub fn order_revenue(order: &Value) -> f64 {
    order
        .get("totalAmount")
        .and_then(parse_number)
        .or_else(|| order.get("total").and_then(parse_number))
        .unwrap_or(0.0)
}

fn local_day(order: &Value, offset: FixedOffset) -> Option<NaiveDate> {
    let created = order.get("createdAt").and_then(parse_timestamp)?;
    Some(created.with_timezone(&offset).date_naive())
}

fn is_cancelled(order: &Value) -> bool {
    order
        .get("status")
        .and_then(Value::as_str)
        .and_then(OrderStatus::parse)
        == Some(OrderStatus::Cancelled)
}

fn tally_items(order: &Value, sold: &mut HashMap<String, ItemSales>) {
    let Some(items) = order.get("items").and_then(Value::as_array) else {
        return;
    };
    for item in items {
        let Some(id) = item.get("menuItemId").and_then(Value::as_str) else {
            continue;
        };
        let quantity = item
            .get("quantity")
            .and_then(parse_number)
            .filter(|q| *q > 0.0)
            .map(|q| q as u64)
            .unwrap_or(0);
        if quantity == 0 {
            continue;
        }
        let name = item.get("name").and_then(Value::as_str).unwrap_or(id);
        let entry = sold.entry(id.to_string()).or_insert_with(|| ItemSales {
            menu_item_id: id.to_string(),
            name: name.to_string(),
            quantity: 0,
        });
        entry.quantity = entry.quantity.saturating_add(quantity);
    }
}
