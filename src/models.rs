use serde::{Deserialize, Serialize};

/// One weekly summary as the app holds it. Serialized camelCase, which is
/// also the layout of the local durable cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRecord {
    pub id: String,
    pub start_date: String,
    pub end_date: String,
    pub total_users: u64,
    pub site_activities: u64,
    pub went_to_branch: u64,
    pub duplicates: u64,
    pub total_orders: u64,
    pub orders_shipped: u64,
    pub shipped_orders_amount: f64,
}

/// Editable part of a [`WeeklyRecord`]; everything except the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyFields {
    pub start_date: String,
    pub end_date: String,
    pub total_users: u64,
    pub site_activities: u64,
    pub went_to_branch: u64,
    pub duplicates: u64,
    pub total_orders: u64,
    pub orders_shipped: u64,
    pub shipped_orders_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusRecord {
    pub id: String,
    pub date: String,
    pub rep_name: String,
    pub bonus_amount: f64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusFields {
    pub date: String,
    pub rep_name: String,
    pub bonus_amount: f64,
    #[serde(default)]
    pub notes: String,
}

/// Wire shape of a weekly row (snake_case column names). The id is empty
/// on request bodies and omitted when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRow {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub start_date: String,
    pub end_date: String,
    pub total_users: u64,
    pub site_activities: u64,
    pub went_to_branch: u64,
    pub duplicates: u64,
    pub total_orders: u64,
    pub orders_shipped: u64,
    pub shipped_orders_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusRow {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub date: String,
    pub rep_name: String,
    pub bonus_amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_shipped_orders: u64,
    pub average_order_value: f64,
    pub conversion_rate: f64,
    pub total_bonuses: f64,
    pub active_reps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub start_date: String,
    pub end_date: String,
    pub orders_shipped: u64,
    pub shipped_orders_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepTotal {
    pub rep_name: String,
    pub total_bonus: f64,
}

/// Shipped versus not-shipped orders for the proportion chart.
/// `not_shipped` is signed: rows reporting more shipped than total orders
/// push it below zero instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSplit {
    pub shipped: u64,
    pub not_shipped: i64,
    pub total_orders: u64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub kpis: Kpis,
    pub weekly_series: Vec<WeeklyPoint>,
    pub bonuses_by_rep: Vec<RepTotal>,
    pub order_split: OrderSplit,
}
