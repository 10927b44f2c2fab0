//! Per-kind metadata and the app <-> wire field mapping.
//!
//! The in-app shape is camelCase (`repName`); the HTTP boundary speaks the
//! snake_case column names (`rep_name`). `to_row` and `from_row` are total
//! and invert each other for every field present on the wire.

use crate::engine::{sort_records, BonusSortKey, SortSpec, Sortable, WeeklySortKey};
use crate::errors::StoreError;
use crate::models::{BonusFields, BonusRecord, BonusRow, WeeklyFields, WeeklyRecord, WeeklyRow};
use crate::validation;
use serde::{de::DeserializeOwned, Serialize};

pub trait Resource:
    Sortable + Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Fields: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Row: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Key of the record array in the local key-value store.
    const STORAGE_KEY: &'static str;
    /// Collection path on the HTTP surface.
    const PATH: &'static str;
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn from_fields(id: String, fields: Self::Fields) -> Self;
    fn fields(&self) -> Self::Fields;
    fn to_row(&self) -> Self::Row;
    fn from_row(row: Self::Row) -> Self;
    fn validate(fields: &Self::Fields) -> Result<(), StoreError>;
    /// Listing order served by the API.
    fn default_sort() -> SortSpec<Self::Key>;

    fn fields_to_row(fields: Self::Fields) -> Self::Row {
        Self::from_fields(String::new(), fields).to_row()
    }

    fn fields_from_row(row: Self::Row) -> Self::Fields {
        Self::from_row(row).fields()
    }

    fn order(records: &mut [Self]) {
        sort_records(records, Self::default_sort());
    }
}

impl Resource for WeeklyRecord {
    type Fields = WeeklyFields;
    type Row = WeeklyRow;

    const STORAGE_KEY: &'static str = "weeklyData";
    const PATH: &'static str = "/weekly-data";
    const LABEL: &'static str = "Weekly data";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_fields(id: String, fields: WeeklyFields) -> Self {
        Self {
            id,
            start_date: fields.start_date,
            end_date: fields.end_date,
            total_users: fields.total_users,
            site_activities: fields.site_activities,
            went_to_branch: fields.went_to_branch,
            duplicates: fields.duplicates,
            total_orders: fields.total_orders,
            orders_shipped: fields.orders_shipped,
            shipped_orders_amount: fields.shipped_orders_amount,
        }
    }

    fn fields(&self) -> WeeklyFields {
        WeeklyFields {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            total_users: self.total_users,
            site_activities: self.site_activities,
            went_to_branch: self.went_to_branch,
            duplicates: self.duplicates,
            total_orders: self.total_orders,
            orders_shipped: self.orders_shipped,
            shipped_orders_amount: self.shipped_orders_amount,
        }
    }

    fn to_row(&self) -> WeeklyRow {
        WeeklyRow {
            id: self.id.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            total_users: self.total_users,
            site_activities: self.site_activities,
            went_to_branch: self.went_to_branch,
            duplicates: self.duplicates,
            total_orders: self.total_orders,
            orders_shipped: self.orders_shipped,
            shipped_orders_amount: self.shipped_orders_amount,
        }
    }

    fn from_row(row: WeeklyRow) -> Self {
        Self {
            id: row.id,
            start_date: row.start_date,
            end_date: row.end_date,
            total_users: row.total_users,
            site_activities: row.site_activities,
            went_to_branch: row.went_to_branch,
            duplicates: row.duplicates,
            total_orders: row.total_orders,
            orders_shipped: row.orders_shipped,
            shipped_orders_amount: row.shipped_orders_amount,
        }
    }

    fn validate(fields: &WeeklyFields) -> Result<(), StoreError> {
        validation::weekly_fields(fields)
    }

    fn default_sort() -> SortSpec<WeeklySortKey> {
        SortSpec::descending(WeeklySortKey::StartDate)
    }
}

impl Resource for BonusRecord {
    type Fields = BonusFields;
    type Row = BonusRow;

    const STORAGE_KEY: &'static str = "bonuses";
    const PATH: &'static str = "/bonuses";
    const LABEL: &'static str = "Bonus";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_fields(id: String, fields: BonusFields) -> Self {
        Self {
            id,
            date: fields.date,
            rep_name: fields.rep_name,
            bonus_amount: fields.bonus_amount,
            notes: fields.notes,
        }
    }

    fn fields(&self) -> BonusFields {
        BonusFields {
            date: self.date.clone(),
            rep_name: self.rep_name.clone(),
            bonus_amount: self.bonus_amount,
            notes: self.notes.clone(),
        }
    }

    fn to_row(&self) -> BonusRow {
        BonusRow {
            id: self.id.clone(),
            date: self.date.clone(),
            rep_name: self.rep_name.clone(),
            bonus_amount: self.bonus_amount,
            notes: Some(self.notes.clone()),
        }
    }

    fn from_row(row: BonusRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            rep_name: row.rep_name,
            bonus_amount: row.bonus_amount,
            notes: row.notes.unwrap_or_default(),
        }
    }

    fn validate(fields: &BonusFields) -> Result<(), StoreError> {
        validation::bonus_fields(fields)
    }

    fn default_sort() -> SortSpec<BonusSortKey> {
        SortSpec::descending(BonusSortKey::Date)
    }
}
