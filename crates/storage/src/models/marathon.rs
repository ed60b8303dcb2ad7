use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Direction of a marathon: whether losing or gaining weight counts as
/// progress. The net-change sign convention is normalized so that a larger
/// value is always better, regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "marathon_kind", rename_all = "snake_case")]
pub enum MarathonKind {
    WeightLoss,
    WeightGain,
}

/// Marathon lifecycle. Created `Active`; `Cancelled` and `Finished` are
/// terminal for ranking purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "marathon_state", rename_all = "snake_case")]
pub enum MarathonState {
    Active,
    Cancelled,
    Finished,
}

impl MarathonState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Marathon {
    pub marathon_id: Uuid,
    pub name: String,
    pub kind: MarathonKind,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub state: MarathonState,
    pub created_at: chrono::NaiveDateTime,
}

impl Marathon {
    /// True once the last marathon day is reached (inclusive range).
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        today >= self.to_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marathon(to_date: NaiveDate) -> Marathon {
        Marathon {
            marathon_id: Uuid::nil(),
            name: "Spring challenge".to_string(),
            kind: MarathonKind::WeightLoss,
            from_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to_date,
            state: MarathonState::Active,
            created_at: chrono::NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_not_ended_before_end_date() {
        let m = marathon(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());

        let before = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        assert!(!m.has_ended(before));
    }

    #[test]
    fn test_ended_on_and_after_end_date() {
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let m = marathon(end);

        assert!(m.has_ended(end));
        let after = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        assert!(m.has_ended(after));
    }
}
