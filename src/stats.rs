use crate::engine::{
    bonus_in_range, conversion_rate, sort_records, weekly_in_range, BonusTotals, DateRange,
    SortSpec, WeeklySortKey, WeeklyTotals,
};
use crate::models::{BonusRecord, Dashboard, Kpis, OrderSplit, RepTotal, WeeklyPoint, WeeklyRecord};
use std::collections::{HashMap, HashSet};

/// Dashboard for both record sets under one shared date filter.
pub fn build_dashboard(
    weekly: &[WeeklyRecord],
    bonuses: &[BonusRecord],
    range: Option<&DateRange>,
) -> Dashboard {
    let mut weekly: Vec<WeeklyRecord> = weekly
        .iter()
        .filter(|record| weekly_in_range(record, range))
        .cloned()
        .collect();
    sort_records(&mut weekly, SortSpec::ascending(WeeklySortKey::StartDate));

    let bonuses: Vec<&BonusRecord> = bonuses
        .iter()
        .filter(|record| bonus_in_range(record, range))
        .collect();

    let totals = WeeklyTotals::from_records(&weekly);
    Dashboard {
        kpis: build_kpis(&totals, &bonuses),
        weekly_series: weekly_series(&weekly),
        bonuses_by_rep: bonuses_by_rep(bonuses.iter().copied()),
        order_split: order_split(&totals),
    }
}

fn build_kpis(totals: &WeeklyTotals, bonuses: &[&BonusRecord]) -> Kpis {
    let average_order_value = if totals.orders_shipped == 0 {
        0.0
    } else {
        totals.shipped_orders_amount / totals.orders_shipped as f64
    };
    let active_reps: HashSet<&str> = bonuses
        .iter()
        .map(|record| record.rep_name.as_str())
        .collect();

    Kpis {
        total_revenue: totals.shipped_orders_amount,
        total_shipped_orders: totals.orders_shipped,
        average_order_value,
        conversion_rate: totals.conversion_rate,
        total_bonuses: BonusTotals::from_records(bonuses.iter().copied()).bonus_amount,
        active_reps: active_reps.len(),
    }
}

/// One chart point per weekly row, in the order given.
pub fn weekly_series(weekly: &[WeeklyRecord]) -> Vec<WeeklyPoint> {
    weekly
        .iter()
        .map(|record| WeeklyPoint {
            start_date: record.start_date.clone(),
            end_date: record.end_date.clone(),
            orders_shipped: record.orders_shipped,
            shipped_orders_amount: record.shipped_orders_amount,
        })
        .collect()
}

/// Bonus totals per rep name, largest first. Equal totals keep the order
/// in which the reps first appear.
pub fn bonuses_by_rep<'a>(bonuses: impl IntoIterator<Item = &'a BonusRecord>) -> Vec<RepTotal> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<RepTotal> = Vec::new();
    for record in bonuses {
        match positions.get(record.rep_name.as_str()) {
            Some(&index) => totals[index].total_bonus += record.bonus_amount,
            None => {
                positions.insert(record.rep_name.as_str(), totals.len());
                totals.push(RepTotal {
                    rep_name: record.rep_name.clone(),
                    total_bonus: record.bonus_amount,
                });
            }
        }
    }

    totals.sort_by(|a, b| {
        b.total_bonus
            .partial_cmp(&a.total_bonus)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    totals
}

fn order_split(totals: &WeeklyTotals) -> OrderSplit {
    OrderSplit {
        shipped: totals.orders_shipped,
        not_shipped: signed_difference(totals.total_orders, totals.orders_shipped),
        total_orders: totals.total_orders,
        conversion_rate: conversion_rate(totals.orders_shipped, totals.total_orders),
    }
}

/// `total - shipped`, clamped to the `i64` range instead of wrapping.
fn signed_difference(total: u64, shipped: u64) -> i64 {
    let difference = i128::from(total) - i128::from(shipped);
    i64::try_from(difference).unwrap_or(if difference < 0 { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn week(
        id: &str,
        start: &str,
        end: &str,
        total: u64,
        shipped: u64,
        amount: f64,
    ) -> WeeklyRecord {
        WeeklyRecord {
            id: id.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            total_users: 0,
            site_activities: 0,
            went_to_branch: 0,
            duplicates: 0,
            total_orders: total,
            orders_shipped: shipped,
            shipped_orders_amount: amount,
        }
    }

    fn bonus(date: &str, rep: &str, amount: f64) -> BonusRecord {
        BonusRecord {
            id: format!("{rep}-{date}"),
            date: date.to_string(),
            rep_name: rep.to_string(),
            bonus_amount: amount,
            notes: String::new(),
        }
    }

    #[test]
    fn bonuses_group_by_rep_descending() {
        let records = vec![
            bonus("2025-01-01", "A", 100.0),
            bonus("2025-01-02", "B", 50.0),
            bonus("2025-01-03", "A", 30.0),
        ];
        let grouped = bonuses_by_rep(&records);
        assert_eq!(
            grouped,
            vec![
                RepTotal { rep_name: "A".to_string(), total_bonus: 130.0 },
                RepTotal { rep_name: "B".to_string(), total_bonus: 50.0 },
            ]
        );
    }

    #[test]
    fn equal_totals_keep_first_seen_order() {
        let records = vec![
            bonus("2025-01-01", "Zohar", 40.0),
            bonus("2025-01-02", "Adi", 40.0),
            bonus("2025-01-03", "Moshe", 90.0),
        ];
        let names: Vec<_> = bonuses_by_rep(&records)
            .into_iter()
            .map(|total| total.rep_name)
            .collect();
        assert_eq!(names, vec!["Moshe", "Zohar", "Adi"]);
    }

    #[test]
    fn rep_names_are_not_normalised() {
        let records = vec![
            bonus("2025-01-01", "Dana", 10.0),
            bonus("2025-01-02", "dana", 10.0),
            bonus("2025-01-03", "Dana ", 10.0),
        ];
        let dashboard = build_dashboard(&[], &records, None);
        assert_eq!(dashboard.kpis.active_reps, 3);
        assert_eq!(dashboard.bonuses_by_rep.len(), 3);
    }

    #[test]
    fn kpis_use_ratio_of_sums() {
        let weekly = vec![
            week("a", "2025-01-01", "2025-01-07", 100, 40, 4000.0),
            week("b", "2025-01-08", "2025-01-14", 50, 30, 3000.0),
        ];
        let bonuses = vec![
            bonus("2025-01-03", "A", 100.0),
            bonus("2025-01-09", "B", 50.0),
            bonus("2025-01-10", "A", 25.0),
        ];
        let dashboard = build_dashboard(&weekly, &bonuses, None);
        let kpis = &dashboard.kpis;
        assert_eq!(kpis.total_revenue, 7000.0);
        assert_eq!(kpis.total_shipped_orders, 70);
        assert_eq!(kpis.average_order_value, 100.0);
        assert!((kpis.conversion_rate - 46.67).abs() < 0.01);
        assert_eq!(kpis.total_bonuses, 175.0);
        assert_eq!(kpis.active_reps, 2);

        assert_eq!(dashboard.order_split.shipped, 70);
        assert_eq!(dashboard.order_split.not_shipped, 80);
        assert_eq!(dashboard.order_split.total_orders, 150);
        assert_eq!(dashboard.order_split.conversion_rate, kpis.conversion_rate);
    }

    #[test]
    fn empty_input_yields_zeroes_not_nan() {
        let dashboard = build_dashboard(&[], &[], None);
        assert_eq!(dashboard.kpis, Kpis::default());
        assert_eq!(dashboard.order_split, OrderSplit::default());
        assert!(dashboard.weekly_series.is_empty());
        assert!(dashboard.bonuses_by_rep.is_empty());
    }

    #[test]
    fn shared_filter_applies_to_both_sets() {
        let weekly = vec![
            week("late", "2025-02-10", "2025-02-16", 10, 5, 500.0),
            week("early", "2025-01-01", "2025-01-07", 10, 2, 200.0),
            week("mid", "2025-01-27", "2025-02-02", 20, 10, 1000.0),
        ];
        let bonuses = vec![
            bonus("2025-01-05", "Old", 10.0),
            bonus("2025-02-01", "Now", 20.0),
        ];
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
        );
        let dashboard = build_dashboard(&weekly, &bonuses, Some(&range));

        let series: Vec<_> = dashboard
            .weekly_series
            .iter()
            .map(|point| point.start_date.as_str())
            .collect();
        assert_eq!(series, vec!["2025-01-27", "2025-02-10"]);
        assert_eq!(dashboard.kpis.total_bonuses, 20.0);
        assert_eq!(dashboard.kpis.active_reps, 1);
    }

    #[test]
    fn over_shipped_rows_do_not_fail() {
        let weekly = vec![week("odd", "2025-01-01", "2025-01-07", 5, 8, 80.0)];
        let dashboard = build_dashboard(&weekly, &[], None);
        assert_eq!(dashboard.order_split.not_shipped, -3);
        assert!(dashboard.kpis.conversion_rate > 100.0);
    }

    #[test]
    fn huge_order_counts_clamp_instead_of_overflowing() {
        let weekly = vec![week("big", "2025-01-01", "2025-01-07", 0, 1 << 63, 0.0)];
        let dashboard = build_dashboard(&weekly, &[], None);
        assert_eq!(dashboard.order_split.not_shipped, i64::MIN);

        let weekly = vec![week("max", "2025-01-01", "2025-01-07", u64::MAX, 1, 0.0)];
        let dashboard = build_dashboard(&weekly, &[], None);
        assert_eq!(dashboard.order_split.not_shipped, i64::MAX);
        assert_eq!(dashboard.order_split.total_orders, u64::MAX);
    }
}
