use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MarathonParticipant {
    pub participant_id: Uuid,
    pub marathon_id: Uuid,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: chrono::NaiveDateTime,
}

impl MarathonParticipant {
    /// Whole years of age on the given date, when a birth date is known.
    pub fn age_on(&self, on: NaiveDate) -> Option<i32> {
        let dob = self.date_of_birth?;
        on.years_since(dob).map(|years| years as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(dob: Option<NaiveDate>) -> MarathonParticipant {
        MarathonParticipant {
            participant_id: Uuid::nil(),
            marathon_id: Uuid::nil(),
            name: "Anna".to_string(),
            date_of_birth: dob,
            created_at: chrono::NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_age_counts_whole_years() {
        let p = participant(NaiveDate::from_ymd_opt(1990, 6, 15));

        let day_before = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert_eq!(p.age_on(day_before), Some(33));

        let birthday = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(p.age_on(birthday), Some(34));
    }

    #[test]
    fn test_age_unknown_without_birth_date() {
        let p = participant(None);
        let on = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(p.age_on(on), None);
    }
}
