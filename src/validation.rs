use crate::engine::parse_timestamp;
use crate::errors::StoreError;
use crate::models::{BonusFields, LoginRequest, WeeklyFields};

pub fn weekly_fields(fields: &WeeklyFields) -> Result<(), StoreError> {
    let start = iso_date("startDate", &fields.start_date)?;
    let end = iso_date("endDate", &fields.end_date)?;
    if start > end {
        return Err(StoreError::validation(
            "\"endDate\" must not be before \"startDate\"",
        ));
    }
    amount("shippedOrdersAmount", fields.shipped_orders_amount)
}

pub fn bonus_fields(fields: &BonusFields) -> Result<(), StoreError> {
    iso_date("date", &fields.date)?;
    if fields.rep_name.trim().is_empty() {
        return Err(StoreError::validation("\"repName\" is not allowed to be empty"));
    }
    amount("bonusAmount", fields.bonus_amount)
}

pub fn login(request: &LoginRequest) -> Result<(), StoreError> {
    let valid_email = request
        .email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(StoreError::validation("\"email\" must be a valid email"));
    }
    if request.password.chars().count() < 6 {
        return Err(StoreError::validation(
            "\"password\" length must be at least 6 characters long",
        ));
    }
    Ok(())
}

fn iso_date(field: &str, value: &str) -> Result<chrono::NaiveDateTime, StoreError> {
    parse_timestamp(value)
        .ok_or_else(|| StoreError::validation(format!("\"{field}\" must be a valid ISO 8601 date")))
}

fn amount(field: &str, value: f64) -> Result<(), StoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(StoreError::validation(format!(
            "\"{field}\" must be greater than or equal to 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly(start: &str, end: &str, amount: f64) -> WeeklyFields {
        WeeklyFields {
            start_date: start.to_string(),
            end_date: end.to_string(),
            total_users: 1,
            site_activities: 1,
            went_to_branch: 0,
            duplicates: 0,
            total_orders: 2,
            orders_shipped: 1,
            shipped_orders_amount: amount,
        }
    }

    #[test]
    fn weekly_dates_must_be_ordered() {
        assert!(weekly_fields(&weekly("2025-01-01", "2025-01-07", 10.0)).is_ok());
        assert!(weekly_fields(&weekly("2025-01-01", "2025-01-01", 0.0)).is_ok());
        assert!(matches!(
            weekly_fields(&weekly("2025-01-08", "2025-01-07", 10.0)),
            Err(StoreError::Validation(_))
        ));
        assert!(weekly_fields(&weekly("yesterday", "2025-01-07", 10.0)).is_err());
    }

    #[test]
    fn amounts_must_be_finite_and_non_negative() {
        assert!(weekly_fields(&weekly("2025-01-01", "2025-01-07", -1.0)).is_err());
        assert!(weekly_fields(&weekly("2025-01-01", "2025-01-07", f64::NAN)).is_err());
    }

    #[test]
    fn bonus_requires_rep_name() {
        let mut fields = BonusFields {
            date: "2025-02-01".to_string(),
            rep_name: "  ".to_string(),
            bonus_amount: 100.0,
            notes: String::new(),
        };
        assert!(bonus_fields(&fields).is_err());
        fields.rep_name = " Dana ".to_string();
        assert!(bonus_fields(&fields).is_ok());
    }

    #[test]
    fn login_checks_shape_only() {
        let ok = LoginRequest {
            email: "admin@company.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(login(&ok).is_ok());
        let short = LoginRequest {
            password: "abc".to_string(),
            ..ok.clone()
        };
        assert!(login(&short).is_err());
        let bad_email = LoginRequest {
            email: "admin".to_string(),
            ..ok
        };
        assert!(login(&bad_email).is_err());
    }
}
