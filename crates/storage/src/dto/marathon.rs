use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::decimal_to_f64;
use crate::models::{
    FrozenPosition, Marathon, MarathonKind, MarathonParticipant, MarathonState, MetricEntry,
};

/// Request payload for creating a marathon with its full roster. The roster
/// is fixed at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMarathonRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub kind: MarathonKind,

    pub from_date: NaiveDate,

    pub to_date: NaiveDate,

    #[validate(
        length(min = 1, max = 200, message = "Roster must have 1 to 200 participants"),
        nested
    )]
    pub participants: Vec<CreateParticipantRequest>,
}

impl CreateMarathonRequest {
    /// Cross-field validation the derive cannot express.
    pub fn validate_dates(&self) -> Result<(), &'static str> {
        if self.to_date < self.from_date {
            return Err("End date must be on or after start date");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateParticipantRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Participant name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub date_of_birth: Option<NaiveDate>,
}

/// Request payload for recording one measurement. Both metrics are optional;
/// a partially filled observation still counts for the fields it carries.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordEntryRequest {
    pub participant_id: Uuid,

    pub entry_date: NaiveDate,

    #[validate(custom(function = "validate_weight"))]
    pub weight: Option<Decimal>,

    #[validate(custom(function = "validate_height"))]
    pub height: Option<Decimal>,
}

fn validate_weight(weight: &Decimal) -> Result<(), validator::ValidationError> {
    if *weight <= Decimal::ZERO || *weight > Decimal::from(500) {
        return Err(validator::ValidationError::new("weight_out_of_range"));
    }
    Ok(())
}

fn validate_height(height: &Decimal) -> Result<(), validator::ValidationError> {
    if *height <= Decimal::ZERO || *height > Decimal::from(300) {
        return Err(validator::ValidationError::new("height_out_of_range"));
    }
    Ok(())
}

/// Query filter for the marathon list endpoint. The paging fields live
/// directly on the filter: serde_urlencoded cannot deserialize flattened
/// integer fields, so a nested struct would reject every paged request.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListMarathonsFilter {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub state: Option<MarathonState>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    25
}

impl ListMarathonsFilter {
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".to_string());
        }
        if self.page_size < 1 || self.page_size > 100 {
            return Err("page_size must be between 1 and 100".to_string());
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// Response containing marathon header fields
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarathonResponse {
    pub marathon_id: Uuid,
    pub name: String,
    pub kind: MarathonKind,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub state: MarathonState,
    pub created_at: chrono::NaiveDateTime,
}

impl From<Marathon> for MarathonResponse {
    fn from(marathon: Marathon) -> Self {
        Self {
            marathon_id: marathon.marathon_id,
            name: marathon.name,
            kind: marathon.kind,
            from_date: marathon.from_date,
            to_date: marathon.to_date,
            state: marathon.state,
            created_at: marathon.created_at,
        }
    }
}

/// Marathon detail: header plus roster, and the frozen final positions once
/// the marathon has been marked finished.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarathonDetailResponse {
    pub marathon_id: Uuid,
    pub name: String,
    pub kind: MarathonKind,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub state: MarathonState,
    pub created_at: chrono::NaiveDateTime,
    pub participants: Vec<ParticipantResponse>,
    pub final_positions: Vec<FrozenPositionResponse>,
}

impl MarathonDetailResponse {
    pub fn new(
        marathon: Marathon,
        participants: Vec<MarathonParticipant>,
        positions: Vec<FrozenPosition>,
        today: NaiveDate,
    ) -> Self {
        let participants = participants
            .iter()
            .map(|p| ParticipantResponse::from_participant(p, today))
            .collect();
        let final_positions = positions
            .into_iter()
            .map(FrozenPositionResponse::from)
            .collect();

        Self {
            marathon_id: marathon.marathon_id,
            name: marathon.name,
            kind: marathon.kind,
            from_date: marathon.from_date,
            to_date: marathon.to_date,
            state: marathon.state,
            created_at: marathon.created_at,
            participants,
            final_positions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub participant_id: Uuid,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i32>,
}

impl ParticipantResponse {
    pub fn from_participant(participant: &MarathonParticipant, today: NaiveDate) -> Self {
        Self {
            participant_id: participant.participant_id,
            name: participant.name.clone(),
            date_of_birth: participant.date_of_birth,
            age: participant.age_on(today),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntryResponse {
    pub entry_id: i64,
    pub participant_id: Uuid,
    pub day: i32,
    pub entry_date: NaiveDate,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<MetricEntry> for EntryResponse {
    fn from(entry: MetricEntry) -> Self {
        Self {
            entry_id: entry.entry_id,
            participant_id: entry.participant_id,
            day: entry.day,
            entry_date: entry.entry_date,
            weight: entry.weight.map(decimal_to_f64),
            height: entry.height.map(decimal_to_f64),
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FrozenPositionResponse {
    pub participant_id: Uuid,
    pub position: i32,
    pub net_change: f64,
    pub frozen_at: chrono::NaiveDateTime,
}

impl From<FrozenPosition> for FrozenPositionResponse {
    fn from(position: FrozenPosition) -> Self {
        Self {
            participant_id: position.participant_id,
            position: position.position,
            net_change: decimal_to_f64(position.net_change),
            frozen_at: position.frozen_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(from: (i32, u32, u32), to: (i32, u32, u32)) -> CreateMarathonRequest {
        CreateMarathonRequest {
            name: "Summer slim-down".to_string(),
            kind: MarathonKind::WeightLoss,
            from_date: NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
            to_date: NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap(),
            participants: vec![CreateParticipantRequest {
                name: "Anna".to_string(),
                date_of_birth: None,
            }],
        }
    }

    #[test]
    fn test_validate_dates_rejects_inverted_range() {
        let req = request((2024, 2, 1), (2024, 1, 1));
        assert!(req.validate_dates().is_err());
    }

    #[test]
    fn test_validate_dates_accepts_single_day() {
        let req = request((2024, 1, 1), (2024, 1, 1));
        assert!(req.validate_dates().is_ok());
    }

    #[test]
    fn test_entry_weight_bounds() {
        assert!(validate_weight(&Decimal::from(70)).is_ok());
        assert!(validate_weight(&Decimal::ZERO).is_err());
        assert!(validate_weight(&Decimal::from(501)).is_err());
    }

    #[test]
    fn test_empty_roster_rejected() {
        let mut req = request((2024, 1, 1), (2024, 2, 1));
        req.participants.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_list_filter_defaults() {
        let filter: ListMarathonsFilter = serde_json::from_str("{}").unwrap();

        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, 25);
        assert!(filter.state.is_none());
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn test_list_filter_bounds() {
        let mut filter: ListMarathonsFilter = serde_json::from_str("{}").unwrap();

        filter.page = 0;
        assert!(filter.validate().is_err());

        filter.page = 1;
        filter.page_size = 0;
        assert!(filter.validate().is_err());

        filter.page_size = 101;
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_list_filter_offset_advances_by_page_size() {
        let mut filter: ListMarathonsFilter = serde_json::from_str("{}").unwrap();
        filter.page = 3;
        filter.page_size = 10;

        assert_eq!(filter.offset(), 20);
        assert_eq!(filter.limit(), 10);
    }
}
