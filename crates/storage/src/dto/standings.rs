use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::marathon::EntryResponse;
use crate::models::{Marathon, MarathonKind, MarathonParticipant, MarathonState, MetricEntry};

/// Everything the standings computation reads, loaded in one place. Keeping
/// the input explicit makes the projections below pure functions of it.
#[derive(Debug, Clone)]
pub struct MarathonSnapshot {
    pub marathon: Marathon,
    pub participants: Vec<MarathonParticipant>,
    pub entries: HashMap<Uuid, Vec<MetricEntry>>,
}

impl MarathonSnapshot {
    /// Group a flat entry list by participant. The per-participant order is
    /// the input order, which decides duplicate-day winners.
    pub fn assemble(
        marathon: Marathon,
        participants: Vec<MarathonParticipant>,
        entries: Vec<MetricEntry>,
    ) -> Self {
        let mut grouped: HashMap<Uuid, Vec<MetricEntry>> = HashMap::new();
        for entry in entries {
            grouped.entry(entry.participant_id).or_default().push(entry);
        }

        Self {
            marathon,
            participants,
            entries: grouped,
        }
    }
}

/// One day of the marathon axis, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MarathonDay {
    pub day: i32,
    pub date: NaiveDate,
}

/// A participant holding a dense rank. Only participants with a computable
/// net change appear as one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedParticipant {
    pub position: i32,
    pub participant_id: Uuid,
    pub name: String,
    pub net_change: Decimal,
}

/// One row of the standings table. Measurement columns are pre-rendered
/// labels so every client shows the same placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StandingsRow {
    /// None when the participant has no computable net change.
    pub position: Option<i32>,
    pub participant_id: Uuid,
    pub name: String,
    pub initial: String,
    pub latest: String,
    pub net_change: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PodiumEntry {
    pub position: i32,
    pub participant_id: Uuid,
    pub name: String,
    pub net_change: f64,
    pub net_change_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub marathon_id: Uuid,
    pub kind: MarathonKind,
    pub state: MarathonState,
    /// Podium slots in display order: third place, first place, second
    /// place. Positions missing from the ranking are skipped.
    pub podium: Vec<PodiumEntry>,
    pub rows: Vec<StandingsRow>,
}

/// One participant's weight series aligned to the day axis. A day without a
/// usable weight is None, never zero, so chart lines break instead of
/// plunging to the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartSeries {
    pub participant_id: Uuid,
    pub name: String,
    pub weights: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartResponse {
    pub marathon_id: Uuid,
    pub days: Vec<MarathonDay>,
    pub series: Vec<ChartSeries>,
}

/// Endpoint measurements for one participant, resolved from their entry
/// history. Absent fields stay None rather than defaulting to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProgressSummary {
    pub initial_weight: Option<f64>,
    pub initial_height: Option<f64>,
    pub latest_weight: Option<f64>,
    pub latest_height: Option<f64>,
    pub net_change: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantSeriesResponse {
    pub marathon_id: Uuid,
    pub participant_id: Uuid,
    pub name: String,
    pub summary: ProgressSummary,
    pub entries: Vec<EntryResponse>,
}
