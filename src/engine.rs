//! Filtering, sorting and aggregation over a full in-memory record set.
//!
//! Everything here is pure: callers pass the complete record slice plus the
//! current filter and sort selection and get a fresh derived view back.

use crate::models::{BonusRecord, WeeklyRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Inclusive day-granularity range. A range without `to` covers the single
/// day `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to: Some(to) }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { from: day, to: None }
    }

    /// Start of `from` and end of `to` (or of `from` for a single day).
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.from.and_time(chrono::NaiveTime::MIN);
        let last_day = self.to.unwrap_or(self.from);
        let end = last_day
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap_or_else(|| last_day.and_time(chrono::NaiveTime::MIN));
        (start, end)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let (start, end) = self.bounds();
        at >= start && at <= end
    }

    /// Interval overlap, not containment: `[start, end]` only has to share
    /// one instant with the range.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        let (from, to) = self.bounds();
        start <= to && end >= from
    }
}

/// Parses an ISO-8601 date or date-time the way the record fields carry
/// them. Plain dates resolve to midnight, offsets are folded into UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN));
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Weekly rows whose `[startDate, endDate]` interval overlaps the range.
/// Rows with unparseable dates never match an active range.
pub fn weekly_in_range(record: &WeeklyRecord, range: Option<&DateRange>) -> bool {
    let Some(range) = range else {
        return true;
    };
    match (
        parse_timestamp(&record.start_date),
        parse_timestamp(&record.end_date),
    ) {
        (Some(start), Some(end)) => range.overlaps(start, end),
        _ => false,
    }
}

pub fn bonus_in_range(record: &BonusRecord, range: Option<&DateRange>) -> bool {
    let Some(range) = range else {
        return true;
    };
    parse_timestamp(&record.date).is_some_and(|at| range.contains(at))
}

/// Case-insensitive substring match on the rep name; an empty query
/// matches everything.
pub fn rep_name_matches(record: &BonusRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    record
        .rep_name
        .to_lowercase()
        .contains(&query.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + PartialEq> SortSpec<K> {
    pub fn ascending(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    pub fn descending(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }

    /// Header-click policy: picking the current ascending key flips it to
    /// descending, anything else starts ascending.
    pub fn select(current: Option<Self>, key: K) -> Self {
        match current {
            Some(spec) if spec.key == key && spec.direction == SortDirection::Asc => {
                Self::descending(key)
            }
            _ => Self::ascending(key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Integer(u64),
    Decimal(f64),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Integer(a), SortValue::Integer(b)) => a.cmp(b),
            (SortValue::Decimal(a), SortValue::Decimal(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            _ => Ordering::Equal,
        }
    }
}

/// A record kind that can be ordered by one of its columns.
pub trait Sortable {
    type Key: Copy + PartialEq;

    fn sort_value(&self, key: Self::Key) -> SortValue<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeeklySortKey {
    StartDate,
    EndDate,
    TotalUsers,
    SiteActivities,
    WentToBranch,
    Duplicates,
    TotalOrders,
    OrdersShipped,
    ShippedOrdersAmount,
}

impl Sortable for WeeklyRecord {
    type Key = WeeklySortKey;

    fn sort_value(&self, key: WeeklySortKey) -> SortValue<'_> {
        match key {
            WeeklySortKey::StartDate => SortValue::Text(&self.start_date),
            WeeklySortKey::EndDate => SortValue::Text(&self.end_date),
            WeeklySortKey::TotalUsers => SortValue::Integer(self.total_users),
            WeeklySortKey::SiteActivities => SortValue::Integer(self.site_activities),
            WeeklySortKey::WentToBranch => SortValue::Integer(self.went_to_branch),
            WeeklySortKey::Duplicates => SortValue::Integer(self.duplicates),
            WeeklySortKey::TotalOrders => SortValue::Integer(self.total_orders),
            WeeklySortKey::OrdersShipped => SortValue::Integer(self.orders_shipped),
            WeeklySortKey::ShippedOrdersAmount => SortValue::Decimal(self.shipped_orders_amount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BonusSortKey {
    Date,
    RepName,
    BonusAmount,
    Notes,
}

impl Sortable for BonusRecord {
    type Key = BonusSortKey;

    fn sort_value(&self, key: BonusSortKey) -> SortValue<'_> {
        match key {
            BonusSortKey::Date => SortValue::Text(&self.date),
            BonusSortKey::RepName => SortValue::Text(&self.rep_name),
            BonusSortKey::BonusAmount => SortValue::Decimal(self.bonus_amount),
            BonusSortKey::Notes => SortValue::Text(&self.notes),
        }
    }
}

pub fn sort_records<R: Sortable>(records: &mut [R], spec: SortSpec<R::Key>) {
    records.sort_by(|a, b| {
        let ordering = a.sort_value(spec.key).compare(&b.sort_value(spec.key));
        match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyQuery {
    pub range: Option<DateRange>,
    pub sort: Option<SortSpec<WeeklySortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BonusQuery {
    pub range: Option<DateRange>,
    pub rep_name: String,
    pub sort: Option<SortSpec<BonusSortKey>>,
}

/// Filtered and sorted weekly rows for table display.
pub fn weekly_view(records: &[WeeklyRecord], query: &WeeklyQuery) -> Vec<WeeklyRecord> {
    let mut rows: Vec<WeeklyRecord> = records
        .iter()
        .filter(|record| weekly_in_range(record, query.range.as_ref()))
        .cloned()
        .collect();
    if let Some(spec) = query.sort {
        sort_records(&mut rows, spec);
    }
    rows
}

pub fn bonus_view(records: &[BonusRecord], query: &BonusQuery) -> Vec<BonusRecord> {
    let mut rows: Vec<BonusRecord> = records
        .iter()
        .filter(|record| bonus_in_range(record, query.range.as_ref()))
        .filter(|record| rep_name_matches(record, &query.rep_name))
        .cloned()
        .collect();
    if let Some(spec) = query.sort {
        sort_records(&mut rows, spec);
    }
    rows
}

/// `shipped / total * 100`, or 0 when there are no orders.
pub fn conversion_rate(shipped: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    shipped as f64 / total as f64 * 100.0
}

pub fn row_conversion_rate(record: &WeeklyRecord) -> f64 {
    conversion_rate(record.orders_shipped, record.total_orders)
}

/// Column sums for the weekly table footer. The conversion rate is a ratio
/// of the summed columns, never a mean of per-row rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotals {
    pub rows: usize,
    pub total_users: u64,
    pub site_activities: u64,
    pub went_to_branch: u64,
    pub duplicates: u64,
    pub total_orders: u64,
    pub orders_shipped: u64,
    pub shipped_orders_amount: f64,
    pub conversion_rate: f64,
}

impl WeeklyTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a WeeklyRecord>) -> Self {
        let mut totals = records
            .into_iter()
            .fold(Self::default(), |mut acc, record| {
                acc.rows += 1;
                acc.total_users = acc.total_users.saturating_add(record.total_users);
                acc.site_activities = acc.site_activities.saturating_add(record.site_activities);
                acc.went_to_branch = acc.went_to_branch.saturating_add(record.went_to_branch);
                acc.duplicates = acc.duplicates.saturating_add(record.duplicates);
                acc.total_orders = acc.total_orders.saturating_add(record.total_orders);
                acc.orders_shipped = acc.orders_shipped.saturating_add(record.orders_shipped);
                acc.shipped_orders_amount += record.shipped_orders_amount;
                acc
            });
        totals.conversion_rate = conversion_rate(totals.orders_shipped, totals.total_orders);
        totals
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusTotals {
    pub rows: usize,
    pub bonus_amount: f64,
}

impl BonusTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BonusRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut acc, record| {
                acc.rows += 1;
                acc.bonus_amount += record.bonus_amount;
                acc
            })
    }
}
