use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::common::decimal_to_f64;
use crate::dto::standings::{
    ChartResponse, ChartSeries, LeaderboardResponse, MarathonDay, MarathonSnapshot, PodiumEntry,
    ProgressSummary, RankedParticipant, StandingsRow,
};
use crate::error::Result;
use crate::models::{MarathonKind, MarathonParticipant, MetricEntry};
use crate::repository::entry::EntryRepository;
use crate::repository::marathon::MarathonRepository;

/// Weight and height of one resolved endpoint. A missing field stays None
/// and renders as a placeholder, never as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Measurement {
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
}

impl From<&MetricEntry> for Measurement {
    fn from(entry: &MetricEntry) -> Self {
        Self {
            weight: entry.weight,
            height: entry.height,
        }
    }
}

/// The two endpoints the net change is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantProgress {
    pub initial: Measurement,
    pub latest: Measurement,
}

/// Load the full read model of one marathon. All projections below are pure
/// functions of the returned snapshot.
pub async fn load_snapshot(pool: &PgPool, marathon_id: Uuid) -> Result<MarathonSnapshot> {
    let marathons = MarathonRepository::new(pool);
    let marathon = marathons.find_by_id(marathon_id).await?;
    let participants = marathons.list_participants(marathon_id).await?;
    let entries = EntryRepository::new(pool)
        .list_for_marathon(marathon_id)
        .await?;

    Ok(MarathonSnapshot::assemble(marathon, participants, entries))
}

/// Expand an inclusive date range into the day axis, one element per
/// calendar day, `day` counting up from 0. An inverted range yields an
/// empty axis rather than an error. Dates are civil calendar days with no
/// time-of-day component, so the axis cannot skip or repeat a day.
pub fn expand_range(from: NaiveDate, to: NaiveDate) -> Vec<MarathonDay> {
    let mut days = Vec::new();
    let mut date = from;
    let mut day = 0;

    while date <= to {
        days.push(MarathonDay { day, date });
        day += 1;
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    days
}

/// Resolve the two endpoints from one participant's entries.
///
/// `initial` comes from a day-0 entry only; an entry for a later day never
/// substitutes. `latest` is the entry with the highest day. When several
/// entries share a day, the one latest in input order wins, so the slice
/// order must be insertion order.
pub fn resolve_progress(entries: &[MetricEntry]) -> ParticipantProgress {
    let mut by_day: Vec<&MetricEntry> = entries.iter().collect();
    by_day.sort_by_key(|entry| entry.day);

    let initial = by_day.iter().rev().find(|entry| entry.day == 0).copied();
    let latest = by_day.last().copied();

    ParticipantProgress {
        initial: initial.map(Measurement::from).unwrap_or_default(),
        latest: latest.map(Measurement::from).unwrap_or_default(),
    }
}

/// Net change normalized so that larger is better for both marathon kinds.
/// None when either endpoint weight is missing. The value is not clamped;
/// moving the wrong direction gives a negative change and ranks lower.
pub fn net_change(progress: &ParticipantProgress, kind: MarathonKind) -> Option<Decimal> {
    let initial = progress.initial.weight?;
    let latest = progress.latest.weight?;

    match kind {
        MarathonKind::WeightLoss => Some(initial - latest),
        MarathonKind::WeightGain => Some(latest - initial),
    }
}

/// Rank every participant with a computable net change, best first.
/// Positions are 1..N with no gaps. Equal net changes are ordered by
/// participant id ascending so reruns over the same snapshot agree.
pub fn rank_participants(snapshot: &MarathonSnapshot) -> Vec<RankedParticipant> {
    let mut scored = Vec::new();

    for participant in &snapshot.participants {
        let progress = resolve_progress(participant_entries(snapshot, participant.participant_id));
        if let Some(change) = net_change(&progress, snapshot.marathon.kind) {
            scored.push((participant, change));
        }
    }

    scored.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.participant_id.cmp(&b.0.participant_id))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (participant, change))| RankedParticipant {
            position: index as i32 + 1,
            participant_id: participant.participant_id,
            name: participant.name.clone(),
            net_change: change,
        })
        .collect()
}

/// Podium slots in the display order consumers render: `[third, first, second]`.
/// Missing positions are skipped, so a two-person ranking yields `[first, second]`.
pub fn podium_order(ranked: &[RankedParticipant]) -> Vec<PodiumEntry> {
    [3, 1, 2]
        .into_iter()
        .filter_map(|position| ranked.iter().find(|entry| entry.position == position))
        .map(|entry| PodiumEntry {
            position: entry.position,
            participant_id: entry.participant_id,
            name: entry.name.clone(),
            net_change: decimal_to_f64(entry.net_change),
            net_change_label: format_net_change(Some(entry.net_change)),
        })
        .collect()
}

/// Full leaderboard projection: podium plus one row per participant, ranked
/// rows first by position, then unranked participants by id with
/// placeholder labels.
pub fn build_leaderboard(snapshot: &MarathonSnapshot) -> LeaderboardResponse {
    let ranked = rank_participants(snapshot);

    LeaderboardResponse {
        marathon_id: snapshot.marathon.marathon_id,
        kind: snapshot.marathon.kind,
        state: snapshot.marathon.state,
        podium: podium_order(&ranked),
        rows: standings_rows(snapshot, &ranked),
    }
}

fn standings_rows(snapshot: &MarathonSnapshot, ranked: &[RankedParticipant]) -> Vec<StandingsRow> {
    let placements: HashMap<Uuid, &RankedParticipant> = ranked
        .iter()
        .map(|entry| (entry.participant_id, entry))
        .collect();

    display_order(snapshot, ranked)
        .into_iter()
        .map(|participant| {
            let progress =
                resolve_progress(participant_entries(snapshot, participant.participant_id));
            let placement = placements.get(&participant.participant_id);

            StandingsRow {
                position: placement.map(|entry| entry.position),
                participant_id: participant.participant_id,
                name: participant.name.clone(),
                initial: format_measurement(&progress.initial),
                latest: format_measurement(&progress.latest),
                net_change: format_net_change(placement.map(|entry| entry.net_change)),
            }
        })
        .collect()
}

/// Weight series per participant, aligned to the day axis. Days without a
/// usable weight stay None. Entries pointing outside the axis are ignored;
/// several entries on one day resolve to the latest in input order, even
/// when that entry carries no weight.
pub fn build_chart(snapshot: &MarathonSnapshot) -> ChartResponse {
    let days = expand_range(snapshot.marathon.from_date, snapshot.marathon.to_date);
    let ranked = rank_participants(snapshot);

    let series = display_order(snapshot, &ranked)
        .into_iter()
        .map(|participant| {
            let mut weights = vec![None; days.len()];

            for entry in participant_entries(snapshot, participant.participant_id) {
                let Ok(index) = usize::try_from(entry.day) else {
                    continue;
                };
                if index < weights.len() {
                    weights[index] = entry.weight.map(decimal_to_f64);
                }
            }

            ChartSeries {
                participant_id: participant.participant_id,
                name: participant.name.clone(),
                weights,
            }
        })
        .collect();

    ChartResponse {
        marathon_id: snapshot.marathon.marathon_id,
        days,
        series,
    }
}

/// Endpoint summary for one participant's detail view.
pub fn progress_summary(entries: &[MetricEntry], kind: MarathonKind) -> ProgressSummary {
    let progress = resolve_progress(entries);

    ProgressSummary {
        initial_weight: progress.initial.weight.map(decimal_to_f64),
        initial_height: progress.initial.height.map(decimal_to_f64),
        latest_weight: progress.latest.weight.map(decimal_to_f64),
        latest_height: progress.latest.height.map(decimal_to_f64),
        net_change: net_change(&progress, kind).map(decimal_to_f64),
    }
}

/// Shared display order: ranked participants by position, then unranked
/// ones by participant id. Entry map keys without a roster participant are
/// dropped rather than surfaced.
fn display_order<'s>(
    snapshot: &'s MarathonSnapshot,
    ranked: &[RankedParticipant],
) -> Vec<&'s MarathonParticipant> {
    let by_id: HashMap<Uuid, &MarathonParticipant> = snapshot
        .participants
        .iter()
        .map(|participant| (participant.participant_id, participant))
        .collect();

    let mut ordered: Vec<&MarathonParticipant> = ranked
        .iter()
        .filter_map(|entry| by_id.get(&entry.participant_id).copied())
        .collect();

    let ranked_ids: HashSet<Uuid> = ranked.iter().map(|entry| entry.participant_id).collect();
    let mut unranked: Vec<&MarathonParticipant> = snapshot
        .participants
        .iter()
        .filter(|participant| !ranked_ids.contains(&participant.participant_id))
        .collect();
    unranked.sort_by_key(|participant| participant.participant_id);
    ordered.extend(unranked);

    ordered
}

fn participant_entries<'s>(
    snapshot: &'s MarathonSnapshot,
    participant_id: Uuid,
) -> &'s [MetricEntry] {
    snapshot
        .entries
        .get(&participant_id)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub fn format_net_change(net_change: Option<Decimal>) -> String {
    match net_change {
        Some(value) => format!("{} kg", format_decimal(value)),
        None => "-".to_string(),
    }
}

pub fn format_measurement(measurement: &Measurement) -> String {
    let weight = measurement
        .weight
        .map(format_decimal)
        .unwrap_or_else(|| "-".to_string());
    let height = measurement
        .height
        .map(format_decimal)
        .unwrap_or_else(|| "-".to_string());

    format!("{weight}/{height}")
}

fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Marathon, MarathonState};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn participant(id: u128, name: &str) -> MarathonParticipant {
        MarathonParticipant {
            participant_id: Uuid::from_u128(id),
            marathon_id: Uuid::nil(),
            name: name.to_string(),
            date_of_birth: None,
            created_at: chrono::NaiveDateTime::default(),
        }
    }

    fn entry(entry_id: i64, day: i32, weight: Option<&str>, height: Option<&str>) -> MetricEntry {
        MetricEntry {
            entry_id,
            marathon_id: Uuid::nil(),
            participant_id: Uuid::nil(),
            day,
            entry_date: date(2024, 1, 1),
            weight: weight.map(dec),
            height: height.map(dec),
            created_at: chrono::NaiveDateTime::default(),
        }
    }

    fn snapshot(
        kind: MarathonKind,
        from: NaiveDate,
        to: NaiveDate,
        participants: Vec<MarathonParticipant>,
        entries: Vec<(u128, Vec<MetricEntry>)>,
    ) -> MarathonSnapshot {
        MarathonSnapshot {
            marathon: Marathon {
                marathon_id: Uuid::from_u128(999),
                name: "Test marathon".to_string(),
                kind,
                from_date: from,
                to_date: to,
                state: MarathonState::Active,
                created_at: chrono::NaiveDateTime::default(),
            },
            participants,
            entries: entries
                .into_iter()
                .map(|(id, list)| (Uuid::from_u128(id), list))
                .collect(),
        }
    }

    #[test]
    fn test_expand_counts_every_day_once() {
        let days = expand_range(date(2024, 1, 1), date(2024, 1, 31));

        assert_eq!(days.len(), 31);
        assert_eq!(days[0].day, 0);
        assert_eq!(days[30].day, 30);
        for window in days.windows(2) {
            assert_eq!(window[1].day, window[0].day + 1);
            assert!(window[1].date > window[0].date);
        }
    }

    #[test]
    fn test_expand_crosses_leap_february() {
        let days = expand_range(date(2024, 2, 27), date(2024, 3, 2));

        assert_eq!(days.len(), 5);
        assert_eq!(days[2].date, date(2024, 2, 29));
        assert_eq!(days[4].date, date(2024, 3, 2));
    }

    #[test]
    fn test_expand_inverted_range_is_empty() {
        let days = expand_range(date(2024, 2, 1), date(2024, 1, 1));
        assert!(days.is_empty());
    }

    #[test]
    fn test_expand_single_day() {
        let days = expand_range(date(2024, 1, 1), date(2024, 1, 1));

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day, 0);
        assert_eq!(days[0].date, date(2024, 1, 1));
    }

    #[test]
    fn test_resolve_empty_entries_gives_placeholders() {
        let progress = resolve_progress(&[]);

        assert_eq!(progress, ParticipantProgress::default());
        assert_eq!(net_change(&progress, MarathonKind::WeightLoss), None);
        assert_eq!(net_change(&progress, MarathonKind::WeightGain), None);
    }

    #[test]
    fn test_resolve_initial_requires_day_zero() {
        // Day 1 is the earliest entry but must not stand in for day 0.
        let entries = vec![entry(1, 1, Some("80"), None)];
        let progress = resolve_progress(&entries);

        assert_eq!(progress.initial.weight, None);
        assert_eq!(progress.latest.weight, Some(dec("80")));
    }

    #[test]
    fn test_resolve_duplicate_max_day_last_wins() {
        let entries = vec![
            entry(1, 30, Some("75"), None),
            entry(2, 30, Some("77"), None),
        ];
        let progress = resolve_progress(&entries);

        assert_eq!(progress.latest.weight, Some(dec("77")));
    }

    #[test]
    fn test_resolve_duplicate_day_zero_last_wins() {
        let entries = vec![
            entry(1, 0, Some("80"), Some("170")),
            entry(2, 0, Some("81"), None),
            entry(3, 5, Some("79"), None),
        ];
        let progress = resolve_progress(&entries);

        assert_eq!(progress.initial.weight, Some(dec("81")));
        assert_eq!(progress.initial.height, None);
        assert_eq!(progress.latest.weight, Some(dec("79")));
    }

    #[test]
    fn test_net_change_directions() {
        let entries = vec![
            entry(1, 0, Some("80"), None),
            entry(2, 30, Some("75"), None),
        ];
        let progress = resolve_progress(&entries);

        assert_eq!(
            net_change(&progress, MarathonKind::WeightLoss),
            Some(dec("5"))
        );
        assert_eq!(
            net_change(&progress, MarathonKind::WeightGain),
            Some(dec("-5"))
        );
    }

    #[test]
    fn test_net_change_needs_both_endpoint_weights() {
        let entries = vec![
            entry(1, 0, None, Some("170")),
            entry(2, 30, Some("75"), None),
        ];
        let progress = resolve_progress(&entries);

        assert_eq!(net_change(&progress, MarathonKind::WeightLoss), None);
    }

    #[test]
    fn test_rank_excludes_missing_net_change() {
        let snap = snapshot(
            MarathonKind::WeightLoss,
            date(2024, 1, 1),
            date(2024, 1, 31),
            vec![participant(1, "A"), participant(2, "B"), participant(3, "C")],
            vec![
                (
                    1,
                    vec![entry(1, 0, Some("80"), None), entry(2, 30, Some("75"), None)],
                ),
                (
                    3,
                    vec![entry(3, 0, Some("80"), None), entry(4, 30, Some("72"), None)],
                ),
            ],
        );

        let ranked = rank_participants(&snap);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].position, 1);
        assert_eq!(ranked[0].name, "C");
        assert_eq!(ranked[0].net_change, dec("8"));
        assert_eq!(ranked[1].position, 2);
        assert_eq!(ranked[1].name, "A");
        assert_eq!(ranked[1].net_change, dec("5"));

        let rows = standings_rows(&snap, &ranked);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].name, "B");
        assert_eq!(rows[2].position, None);
        assert_eq!(rows[2].net_change, "-");
        assert_eq!(rows[2].initial, "-/-");
        assert_eq!(rows[2].latest, "-/-");
    }

    #[test]
    fn test_rank_ties_break_by_participant_id() {
        let same = vec![entry(1, 0, Some("80"), None), entry(2, 10, Some("78"), None)];
        let snap = snapshot(
            MarathonKind::WeightLoss,
            date(2024, 1, 1),
            date(2024, 1, 31),
            vec![participant(2, "Later id"), participant(1, "Earlier id")],
            vec![(1, same.clone()), (2, same)],
        );

        let ranked = rank_participants(&snap);

        assert_eq!(ranked[0].participant_id, Uuid::from_u128(1));
        assert_eq!(ranked[0].position, 1);
        assert_eq!(ranked[1].participant_id, Uuid::from_u128(2));
        assert_eq!(ranked[1].position, 2);
    }

    #[test]
    fn test_rank_ignores_lifecycle_state() {
        // The finish transition flips the state before ranking the same
        // snapshot, so ranking must not gate on `active`.
        let mut snap = snapshot(
            MarathonKind::WeightLoss,
            date(2024, 1, 1),
            date(2024, 1, 31),
            vec![participant(1, "A")],
            vec![(
                1,
                vec![entry(1, 0, Some("80"), None), entry(2, 30, Some("75"), None)],
            )],
        );
        snap.marathon.state = MarathonState::Finished;

        let ranked = rank_participants(&snap);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].position, 1);
        assert_eq!(ranked[0].net_change, dec("5"));
    }

    #[test]
    fn test_podium_is_third_first_second() {
        let ranked: Vec<RankedParticipant> = (1..=4)
            .map(|position| RankedParticipant {
                position,
                participant_id: Uuid::from_u128(position as u128),
                name: format!("P{position}"),
                net_change: Decimal::from(10 - position),
            })
            .collect();

        let podium = podium_order(&ranked);

        let positions: Vec<i32> = podium.iter().map(|entry| entry.position).collect();
        assert_eq!(positions, vec![3, 1, 2]);
    }

    #[test]
    fn test_podium_skips_missing_positions() {
        let ranked: Vec<RankedParticipant> = (1..=2)
            .map(|position| RankedParticipant {
                position,
                participant_id: Uuid::from_u128(position as u128),
                name: format!("P{position}"),
                net_change: Decimal::from(10 - position),
            })
            .collect();

        let positions: Vec<i32> = podium_order(&ranked)
            .iter()
            .map(|entry| entry.position)
            .collect();
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn test_row_labels_render_partial_fields() {
        let snap = snapshot(
            MarathonKind::WeightLoss,
            date(2024, 1, 1),
            date(2024, 1, 31),
            vec![participant(1, "A")],
            vec![(
                1,
                vec![
                    entry(1, 0, Some("80.50"), Some("165")),
                    entry(2, 30, Some("75.5"), None),
                ],
            )],
        );

        let board = build_leaderboard(&snap);

        assert_eq!(board.rows[0].initial, "80.5/165");
        assert_eq!(board.rows[0].latest, "75.5/-");
        assert_eq!(board.rows[0].net_change, "5 kg");
        assert_eq!(board.rows[0].position, Some(1));
    }

    #[test]
    fn test_chart_aligns_gaps_to_day_axis() {
        let snap = snapshot(
            MarathonKind::WeightLoss,
            date(2024, 1, 1),
            date(2024, 1, 3),
            vec![participant(1, "A"), participant(2, "B")],
            vec![(
                1,
                vec![
                    entry(1, 0, Some("70"), None),
                    entry(2, 2, Some("68"), None),
                    entry(3, 5, Some("60"), None),
                    entry(4, -1, Some("99"), None),
                ],
            )],
        );

        let chart = build_chart(&snap);

        assert_eq!(chart.days.len(), 3);
        assert_eq!(chart.series[0].weights, vec![Some(70.0), None, Some(68.0)]);
        assert_eq!(chart.series[1].weights, vec![None, None, None]);
    }

    #[test]
    fn test_chart_duplicate_day_winner_may_clear_value() {
        let snap = snapshot(
            MarathonKind::WeightLoss,
            date(2024, 1, 1),
            date(2024, 1, 3),
            vec![participant(1, "A")],
            vec![(
                1,
                vec![
                    entry(1, 0, Some("70"), None),
                    entry(2, 1, Some("71"), None),
                    entry(3, 1, None, Some("170")),
                ],
            )],
        );

        let chart = build_chart(&snap);

        assert_eq!(chart.series[0].weights, vec![Some(70.0), None, None]);
    }

    #[test]
    fn test_projections_are_idempotent() {
        let snap = snapshot(
            MarathonKind::WeightGain,
            date(2024, 3, 1),
            date(2024, 3, 10),
            vec![participant(1, "A"), participant(2, "B")],
            vec![
                (
                    1,
                    vec![entry(1, 0, Some("60"), None), entry(2, 9, Some("62.5"), None)],
                ),
                (2, vec![entry(3, 0, Some("70"), Some("180"))]),
            ],
        );

        let first = build_leaderboard(&snap);
        let second = build_leaderboard(&snap);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );

        assert_eq!(build_chart(&snap), build_chart(&snap));
    }

    #[test]
    fn test_end_to_end_three_day_marathon() {
        let snap = snapshot(
            MarathonKind::WeightLoss,
            date(2024, 1, 1),
            date(2024, 1, 3),
            vec![participant(1, "A"), participant(2, "B")],
            vec![(
                1,
                vec![entry(1, 0, Some("70"), None), entry(2, 2, Some("68"), None)],
            )],
        );

        let chart = build_chart(&snap);
        assert_eq!(chart.days.len(), 3);
        assert_eq!(chart.days[0].date, date(2024, 1, 1));
        assert_eq!(chart.days[2].date, date(2024, 1, 3));

        let board = build_leaderboard(&snap);

        assert_eq!(board.rows[0].name, "A");
        assert_eq!(board.rows[0].position, Some(1));
        assert_eq!(board.rows[0].net_change, "2 kg");

        assert_eq!(board.rows[1].name, "B");
        assert_eq!(board.rows[1].position, None);
        assert_eq!(board.rows[1].net_change, "-");
        assert_eq!(board.rows[1].initial, "-/-");
        assert_eq!(board.rows[1].latest, "-/-");

        assert_eq!(board.podium.len(), 1);
        assert_eq!(board.podium[0].position, 1);
        assert_eq!(board.podium[0].name, "A");
        assert_eq!(board.podium[0].net_change, 2.0);
        assert_eq!(board.podium[0].net_change_label, "2 kg");
    }

    #[test]
    fn test_progress_summary_exposes_endpoints() {
        let entries = vec![
            entry(1, 0, Some("80"), Some("170")),
            entry(2, 12, Some("77.25"), Some("170")),
        ];

        let summary = progress_summary(&entries, MarathonKind::WeightLoss);

        assert_eq!(summary.initial_weight, Some(80.0));
        assert_eq!(summary.latest_weight, Some(77.25));
        assert_eq!(summary.net_change, Some(2.75));
    }
}
