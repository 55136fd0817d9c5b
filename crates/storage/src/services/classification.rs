//! Individual and team classification.
//!
//! Everything here is a pure function of the rows passed in: the same rows
//! always produce the same standings, in the same order.
//!
//! Within one competition, values are ranked in the competition's direction
//! and places follow standard competition ranking ("1224"): equal values share
//! a place and the points for that place. Points come from the event's
//! distribution table, 0 beyond its end. Totals are ranked the same way,
//! after the event's tie-break rules have had their say.

use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::classification::{
    ClassificationFilter, ClassifiedAthlete, CompetitionScore, IndividualClassificationEntry,
    TeamClassificationEntry, TeamMemberScore,
};
use crate::models::{Athlete, AthleteResult, Competition, ScoringRules, Team, TieBreakRule};

pub struct ClassificationInput<'a> {
    pub rules: &'a ScoringRules,
    pub competitions: &'a [Competition],
    pub athletes: &'a [Athlete],
    pub results: &'a [AthleteResult],
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    place: u32,
    points: i32,
}

pub fn individual_classification(
    input: &ClassificationInput<'_>,
    filter: &ClassificationFilter,
) -> Vec<IndividualClassificationEntry> {
    let athletes: Vec<&Athlete> = input.athletes.iter().filter(|a| filter.matches(a)).collect();

    let mut competitions: Vec<&Competition> = input.competitions.iter().collect();
    competitions.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.competition_id.cmp(&b.competition_id))
    });

    let results = index_results(input.results);
    let mut placements: HashMap<(Uuid, Uuid), Placement> = HashMap::new();

    for competition in &competitions {
        let mut field: Vec<(Uuid, Decimal)> = athletes
            .iter()
            .filter(|a| a.is_entered_in(competition.competition_id))
            .filter_map(|a| results.get(&(a.athlete_id, competition.competition_id)))
            .filter(|r| r.status.counts_for_points())
            .map(|r| (r.athlete_id, r.value))
            .collect();

        let ascending = competition.ranks_ascending();
        field.sort_by(|a, b| compare_values(a.1, b.1, ascending).then_with(|| a.0.cmp(&b.0)));

        let mut place = 0;
        let mut previous: Option<Decimal> = None;
        for (idx, (athlete_id, value)) in field.iter().enumerate() {
            if previous != Some(*value) {
                place = idx as u32 + 1;
                previous = Some(*value);
            }
            placements.insert(
                (*athlete_id, competition.competition_id),
                Placement {
                    place,
                    points: input.rules.points_for_place(place),
                },
            );
        }
    }

    let mut entries: Vec<IndividualClassificationEntry> = athletes
        .iter()
        .map(|athlete| {
            let scores: Vec<CompetitionScore> = competitions
                .iter()
                .filter(|c| athlete.is_entered_in(c.competition_id))
                .map(|c| {
                    let key = (athlete.athlete_id, c.competition_id);
                    let result = results.get(&key);
                    let placement = placements.get(&key);

                    CompetitionScore {
                        competition_id: c.competition_id,
                        competition_name: c.name.clone(),
                        value: result.map(|r| r.value),
                        status: result.map(|r| r.status),
                        place: placement.map(|p| p.place),
                        points: placement.map_or(0, |p| p.points),
                    }
                })
                .collect();

            IndividualClassificationEntry {
                position: 0,
                athlete: ClassifiedAthlete::from(*athlete),
                total_points: scores.iter().fold(0, |total, s| total.saturating_add(s.points)),
                competitions: scores,
            }
        })
        .collect();

    let rules = &input.rules.tie_breaking_rules;
    let rank = |a: &IndividualClassificationEntry, b: &IndividualClassificationEntry| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| break_tie(a, b, rules))
    };

    entries.sort_by(|a, b| {
        rank(a, b)
            .then_with(|| a.athlete.last_name.cmp(&b.athlete.last_name))
            .then_with(|| a.athlete.first_name.cmp(&b.athlete.first_name))
            .then_with(|| a.athlete.athlete_id.cmp(&b.athlete.athlete_id))
    });

    let positions = competition_positions(&entries, |a, b| rank(a, b) == Ordering::Equal);
    for (entry, position) in entries.iter_mut().zip(positions) {
        entry.position = position;
    }

    entries
}

/// Ranks teams by the sum of their athletes' individual totals.
///
/// `individual` must be the unfiltered individual classification, otherwise
/// team totals silently drop the athletes left out by the filter.
pub fn team_classification(
    teams: &[Team],
    individual: &[IndividualClassificationEntry],
) -> Vec<TeamClassificationEntry> {
    let mut entries: Vec<TeamClassificationEntry> = teams
        .iter()
        .map(|team| {
            let mut athletes: Vec<TeamMemberScore> = individual
                .iter()
                .filter(|e| e.athlete.team_id == team.team_id)
                .map(|e| TeamMemberScore {
                    athlete_id: e.athlete.athlete_id,
                    first_name: e.athlete.first_name.clone(),
                    last_name: e.athlete.last_name.clone(),
                    total_points: e.total_points,
                })
                .collect();

            athletes.sort_by(|a, b| {
                b.total_points
                    .cmp(&a.total_points)
                    .then_with(|| a.last_name.cmp(&b.last_name))
                    .then_with(|| a.first_name.cmp(&b.first_name))
                    .then_with(|| a.athlete_id.cmp(&b.athlete_id))
            });

            TeamClassificationEntry {
                position: 0,
                team_id: team.team_id,
                team_name: team.name.clone(),
                start_number: team.start_number,
                total_points: athletes
                    .iter()
                    .fold(0, |total: i32, a| total.saturating_add(a.total_points)),
                athletes,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.team_name.cmp(&b.team_name))
            .then_with(|| a.team_id.cmp(&b.team_id))
    });

    let positions = competition_positions(&entries, |a, b| a.total_points == b.total_points);
    for (entry, position) in entries.iter_mut().zip(positions) {
        entry.position = position;
    }

    entries
}

/// Standard competition ranking over an already sorted slice: an entry tied
/// with its predecessor shares its position, otherwise it gets index + 1.
fn competition_positions<T>(sorted: &[T], tied: impl Fn(&T, &T) -> bool) -> Vec<u32> {
    let mut positions: Vec<u32> = Vec::with_capacity(sorted.len());

    for (idx, entry) in sorted.iter().enumerate() {
        let position = match idx.checked_sub(1) {
            Some(prev) if tied(&sorted[prev], entry) => positions[prev],
            _ => idx as u32 + 1,
        };
        positions.push(position);
    }

    positions
}

fn compare_values(a: Decimal, b: Decimal, ascending: bool) -> Ordering {
    if ascending { a.cmp(&b) } else { b.cmp(&a) }
}

/// `Less` means `a` wins the tie.
fn break_tie(
    a: &IndividualClassificationEntry,
    b: &IndividualClassificationEntry,
    rules: &[TieBreakRule],
) -> Ordering {
    for rule in rules {
        let ordering = match rule {
            TieBreakRule::DesignatedCompetition { competition_id } => {
                match (place_in(a, *competition_id), place_in(b, *competition_id)) {
                    (Some(pa), Some(pb)) => pa.cmp(&pb),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
            TieBreakRule::CountBack => count_back(a, b),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

fn place_in(entry: &IndividualClassificationEntry, competition_id: Uuid) -> Option<u32> {
    entry
        .competitions
        .iter()
        .find(|s| s.competition_id == competition_id)
        .and_then(|s| s.place)
}

fn count_back(a: &IndividualClassificationEntry, b: &IndividualClassificationEntry) -> Ordering {
    let deepest = a
        .competitions
        .iter()
        .chain(&b.competitions)
        .filter_map(|s| s.place)
        .max()
        .unwrap_or(0);

    let count = |entry: &IndividualClassificationEntry, place: u32| {
        entry
            .competitions
            .iter()
            .filter(|s| s.place == Some(place))
            .count()
    };

    (1..=deepest)
        .map(|place| count(b, place).cmp(&count(a, place)))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// One result per (athlete, competition). Should the store ever hand back
/// more than one, the most recently recorded wins.
fn index_results(results: &[AthleteResult]) -> HashMap<(Uuid, Uuid), &AthleteResult> {
    let mut index: HashMap<(Uuid, Uuid), &AthleteResult> = HashMap::new();

    for result in results {
        let key = (result.athlete_id, result.competition_id);
        let newer = index.get(&key).is_none_or(|existing| {
            (existing.recorded_at, existing.result_id) < (result.recorded_at, result.result_id)
        });
        if newer {
            index.insert(key, result);
        }
    }

    index
}

impl From<&Athlete> for ClassifiedAthlete {
    fn from(athlete: &Athlete) -> Self {
        Self {
            athlete_id: athlete.athlete_id,
            team_id: athlete.team_id,
            first_name: athlete.first_name.clone(),
            last_name: athlete.last_name.clone(),
            gender: athlete.gender,
            category: athlete.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AgeCategory, CompetitionStatus, CompetitionType, Gender, RegistrationStatus,
        ResultStatus, ScoringType,
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use sqlx::types::Json;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn competition(n: u128, name: &str, scoring_type: ScoringType) -> Competition {
        Competition {
            competition_id: id(n),
            event_id: id(1),
            name: name.to_string(),
            competition_type: CompetitionType::Shooting,
            scoring_type,
            ascending: None,
            zones: Json(vec![]),
            max_participants: None,
            max_value: None,
            status: CompetitionStatus::InProgress,
            allowed_genders: Json(vec![]),
            allowed_categories: Json(vec![]),
            display_order: n as i32,
            created_at: ts(),
        }
    }

    fn athlete(n: u128, team: u128, last_name: &str, competitions: &[u128]) -> Athlete {
        Athlete {
            athlete_id: id(n),
            team_id: id(team),
            first_name: format!("A{n}"),
            last_name: last_name.to_string(),
            birth_year: 2008,
            category: AgeCategory::Junior,
            gender: Gender::Male,
            competition_ids: competitions.iter().map(|c| id(*c)).collect(),
            created_at: ts(),
        }
    }

    fn result(athlete: u128, competition: u128, value: i64, status: ResultStatus) -> AthleteResult {
        AthleteResult {
            result_id: Uuid::from_u128(athlete * 1000 + competition),
            client_id: Uuid::from_u128(athlete * 1_000_000 + competition),
            athlete_id: id(athlete),
            competition_id: id(competition),
            value: Decimal::from(value),
            status,
            notes: None,
            judge_id: Some("judge-1".to_string()),
            recorded_at: ts(),
        }
    }

    fn active(athlete: u128, competition: u128, value: i64) -> AthleteResult {
        result(athlete, competition, value, ResultStatus::Active)
    }

    fn team(n: u128, name: &str) -> Team {
        Team {
            team_id: id(n),
            event_id: id(1),
            name: name.to_string(),
            organization_type: None,
            region: None,
            coach_name: None,
            coach_email: None,
            coach_phone: None,
            registration_status: RegistrationStatus::Accepted,
            documents_verified: true,
            start_number: None,
            created_at: ts(),
        }
    }

    fn rules(distribution: &[i32], tie_breaking_rules: Vec<TieBreakRule>) -> ScoringRules {
        ScoringRules {
            team_points_distribution: distribution.to_vec(),
            tie_breaking_rules,
        }
    }

    fn classify(
        rules: &ScoringRules,
        competitions: &[Competition],
        athletes: &[Athlete],
        results: &[AthleteResult],
    ) -> Vec<IndividualClassificationEntry> {
        let input = ClassificationInput {
            rules,
            competitions,
            athletes,
            results,
        };
        individual_classification(&input, &ClassificationFilter::default())
    }

    fn entry_for(entries: &[IndividualClassificationEntry], n: u128) -> &IndividualClassificationEntry {
        entries.iter().find(|e| e.athlete.athlete_id == id(n)).unwrap()
    }

    fn points_in(entry: &IndividualClassificationEntry, competition: u128) -> i32 {
        entry
            .competitions
            .iter()
            .find(|s| s.competition_id == id(competition))
            .unwrap()
            .points
    }

    const TABLE: &[i32] = &[15, 13, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        // stored before the table cap existed
        let rules = rules(&[i32::MAX], vec![]);
        let competitions = vec![
            competition(10, "Strzelectwo", ScoringType::Points),
            competition(11, "Rzut granatem", ScoringType::Points),
        ];
        let athletes = vec![athlete(1, 100, "Nowak", &[10, 11])];
        let results = vec![active(1, 10, 95), active(1, 11, 88)];

        let entries = classify(&rules, &competitions, &athletes, &results);
        assert_eq!(entries[0].total_points, i32::MAX);

        let mut second = entries[0].clone();
        second.athlete.athlete_id = id(2);
        let standings = team_classification(&[team(100, "Orlęta")], &[entries[0].clone(), second]);
        assert_eq!(standings[0].total_points, i32::MAX);
    }

    #[test]
    fn test_points_follow_distribution_table() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![
            competition(10, "Strzelectwo broń krótka", ScoringType::Points),
            competition(11, "Rzut granatem", ScoringType::Points),
        ];
        let athletes = vec![
            athlete(1, 100, "Nowak", &[10, 11]),
            athlete(2, 100, "Kowalski", &[10, 11]),
            athlete(3, 200, "Wiśniewski", &[10, 11]),
        ];
        let results = vec![
            active(1, 10, 95),
            active(2, 10, 92),
            active(3, 10, 87),
            active(3, 11, 90),
            active(1, 11, 88),
            active(2, 11, 70),
        ];

        let entries = classify(&rules, &competitions, &athletes, &results);

        assert_eq!(points_in(entry_for(&entries, 1), 10), 15);
        assert_eq!(points_in(entry_for(&entries, 2), 10), 13);
        assert_eq!(points_in(entry_for(&entries, 3), 10), 11);

        // 15 + 13 beats 11 + 15 and 13 + 11
        assert_eq!(entries[0].athlete.athlete_id, id(1));
        assert_eq!(entries[0].total_points, 28);
        assert_eq!(entries[0].position, 1);
        assert_eq!(entry_for(&entries, 3).total_points, 26);
        assert_eq!(entry_for(&entries, 2).total_points, 24);
    }

    #[test]
    fn test_higher_total_ranks_first() {
        let rules = rules(&[28, 27], vec![]);
        let competitions = vec![competition(10, "Bieg przełajowy", ScoringType::Points)];
        let athletes = vec![
            athlete(1, 100, "Zieliński", &[10]),
            athlete(2, 100, "Adamski", &[10]),
        ];
        let results = vec![active(1, 10, 50), active(2, 10, 40)];

        let entries = classify(&rules, &competitions, &athletes, &results);

        assert_eq!(entries[0].athlete.athlete_id, id(1));
        assert_eq!(entries[0].total_points, 28);
        assert_eq!(entries[1].total_points, 27);
        assert_eq!(entries[1].position, 2);
    }

    #[test]
    fn test_positions_without_ties_have_no_gaps() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![competition(10, "Strzelectwo", ScoringType::Points)];
        let athletes: Vec<Athlete> = (1..=6)
            .map(|n| athlete(n, 100, &format!("N{n}"), &[10]))
            .collect();
        let results: Vec<AthleteResult> =
            (1..=6).map(|n| active(n, 10, 100 - n as i64 * 3)).collect();

        let entries = classify(&rules, &competitions, &athletes, &results);

        let positions: Vec<u32> = entries.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5, 6]);
        assert!(
            entries
                .windows(2)
                .all(|w| w[0].total_points > w[1].total_points)
        );
    }

    #[test]
    fn test_tied_totals_share_position() {
        let rules = rules(&[10, 8, 8, 5], vec![]);
        let competitions = vec![competition(10, "Strzelectwo", ScoringType::Points)];
        let athletes = vec![
            athlete(1, 100, "A", &[10]),
            athlete(2, 100, "B", &[10]),
            athlete(3, 100, "C", &[10]),
            athlete(4, 100, "D", &[10]),
        ];
        let results = vec![
            active(1, 10, 99),
            active(2, 10, 90),
            active(3, 10, 85),
            active(4, 10, 80),
        ];

        let entries = classify(&rules, &competitions, &athletes, &results);

        let positions: Vec<(u32, i32)> = entries.iter().map(|e| (e.position, e.total_points)).collect();
        assert_eq!(positions, vec![(1, 10), (2, 8), (2, 8), (4, 5)]);
    }

    #[test]
    fn test_equal_values_share_place_and_points() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![competition(10, "Strzelectwo", ScoringType::Points)];
        let athletes = vec![
            athlete(1, 100, "A", &[10]),
            athlete(2, 100, "B", &[10]),
            athlete(3, 100, "C", &[10]),
        ];
        let results = vec![active(1, 10, 90), active(2, 10, 90), active(3, 10, 80)];

        let entries = classify(&rules, &competitions, &athletes, &results);

        let first = &entry_for(&entries, 1).competitions[0];
        let second = &entry_for(&entries, 2).competitions[0];
        let third = &entry_for(&entries, 3).competitions[0];
        assert_eq!((first.place, first.points), (Some(1), 15));
        assert_eq!((second.place, second.points), (Some(1), 15));
        assert_eq!((third.place, third.points), (Some(3), 11));
    }

    #[test]
    fn test_time_competitions_rank_lower_first() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![competition(10, "Bieg przełajowy", ScoringType::Time)];
        let athletes = vec![
            athlete(1, 100, "A", &[10]),
            athlete(2, 100, "B", &[10]),
        ];
        let results = vec![active(1, 10, 754), active(2, 10, 698)];

        let entries = classify(&rules, &competitions, &athletes, &results);

        assert_eq!(entries[0].athlete.athlete_id, id(2));
        assert_eq!(points_in(&entries[0], 10), 15);
        assert_eq!(points_in(&entries[1], 10), 13);
    }

    #[test]
    fn test_ascending_override_flips_direction() {
        let rules = rules(TABLE, vec![]);
        let mut penalties = competition(10, "Tor przeszkód", ScoringType::Points);
        penalties.ascending = Some(true);
        let athletes = vec![
            athlete(1, 100, "A", &[10]),
            athlete(2, 100, "B", &[10]),
        ];
        let results = vec![active(1, 10, 3), active(2, 10, 7)];

        let entries = classify(&rules, &[penalties], &athletes, &results);

        assert_eq!(points_in(entry_for(&entries, 1), 10), 15);
        assert_eq!(points_in(entry_for(&entries, 2), 10), 13);
    }

    #[test]
    fn test_non_active_results_score_zero() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![competition(10, "Strzelectwo", ScoringType::Points)];
        let athletes = vec![
            athlete(1, 100, "A", &[10]),
            athlete(2, 100, "B", &[10]),
            athlete(3, 100, "C", &[10]),
            athlete(4, 100, "D", &[10]),
        ];
        let results = vec![
            result(1, 10, 1000, ResultStatus::Dns),
            result(2, 10, 1000, ResultStatus::Dq),
            result(3, 10, 1000, ResultStatus::Dnf),
            active(4, 10, 10),
        ];

        let entries = classify(&rules, &competitions, &athletes, &results);

        for n in 1..=3 {
            let entry = entry_for(&entries, n);
            assert_eq!(entry.total_points, 0);
            assert_eq!(entry.competitions[0].place, None);
            assert!(entry.competitions[0].status.is_some());
        }
        // the only active result takes first place
        assert_eq!(points_in(entry_for(&entries, 4), 10), 15);
    }

    #[test]
    fn test_missing_results_score_zero_and_keep_athlete_listed() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![
            competition(10, "Strzelectwo", ScoringType::Points),
            competition(11, "Rzut granatem", ScoringType::Distance),
        ];
        let athletes = vec![
            athlete(1, 100, "A", &[10, 11]),
            athlete(2, 100, "B", &[10, 11]),
        ];
        let results = vec![active(1, 10, 50)];

        let entries = classify(&rules, &competitions, &athletes, &results);

        assert_eq!(entries.len(), 2);
        let missing = entry_for(&entries, 2);
        assert_eq!(missing.total_points, 0);
        assert!(missing.competitions.iter().all(|s| s.value.is_none()));
        assert_eq!(missing.position, 2);
    }

    #[test]
    fn test_places_beyond_table_score_zero() {
        let rules = rules(&[5, 3], vec![]);
        let competitions = vec![competition(10, "Strzelectwo", ScoringType::Points)];
        let athletes = vec![
            athlete(1, 100, "A", &[10]),
            athlete(2, 100, "B", &[10]),
            athlete(3, 100, "C", &[10]),
        ];
        let results = vec![active(1, 10, 30), active(2, 10, 20), active(3, 10, 10)];

        let entries = classify(&rules, &competitions, &athletes, &results);

        let third = entry_for(&entries, 3);
        assert_eq!(third.competitions[0].place, Some(3));
        assert_eq!(third.total_points, 0);
    }

    #[test]
    fn test_results_outside_entries_are_ignored() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![
            competition(10, "Strzelectwo", ScoringType::Points),
            competition(11, "Rzut granatem", ScoringType::Distance),
        ];
        let athletes = vec![athlete(1, 100, "A", &[10])];
        let results = vec![active(1, 10, 50), active(1, 11, 40)];

        let entries = classify(&rules, &competitions, &athletes, &results);

        assert_eq!(entries[0].competitions.len(), 1);
        assert_eq!(entries[0].total_points, 15);
    }

    #[test]
    fn test_designated_competition_breaks_tie() {
        let tiebreak = vec![TieBreakRule::DesignatedCompetition {
            competition_id: id(11),
        }];
        let rules = rules(&[10, 5], tiebreak);
        let competitions = vec![
            competition(10, "Strzelectwo", ScoringType::Points),
            competition(11, "Rzut granatem", ScoringType::Distance),
        ];
        let athletes = vec![
            athlete(1, 100, "A", &[10, 11]),
            athlete(2, 100, "B", &[10, 11]),
        ];
        // 10 + 5 each, athlete 2 wins the designated competition
        let results = vec![
            active(1, 10, 90),
            active(2, 10, 80),
            active(1, 11, 30),
            active(2, 11, 45),
        ];

        let entries = classify(&rules, &competitions, &athletes, &results);

        assert_eq!(entries[0].athlete.athlete_id, id(2));
        assert_eq!(entries[0].position, 1);
        assert_eq!(entries[1].position, 2);
        assert_eq!(entries[0].total_points, entries[1].total_points);
    }

    #[test]
    fn test_count_back_breaks_tie() {
        let rules = rules(&[10, 6, 4, 0], vec![TieBreakRule::CountBack]);
        let competitions = vec![
            competition(10, "Strzelectwo", ScoringType::Points),
            competition(11, "Rzut granatem", ScoringType::Distance),
        ];
        let athletes = vec![
            athlete(1, 100, "A", &[10, 11]),
            athlete(2, 100, "B", &[10, 11]),
            athlete(3, 100, "C", &[10, 11]),
        ];
        // athlete 1: 1st + 4th = 10, athlete 2: 2nd + 3rd = 10
        let results = vec![
            active(1, 10, 100),
            active(2, 10, 90),
            active(3, 10, 80),
            active(3, 11, 60),
            active(2, 11, 40),
            active(1, 11, 10),
        ];
        let mut athletes = athletes;
        athletes.push(athlete(4, 100, "D", &[11]));
        let mut results = results;
        results.push(active(4, 11, 50));

        let entries = classify(&rules, &competitions, &athletes, &results);

        let a1 = entry_for(&entries, 1);
        let a2 = entry_for(&entries, 2);
        assert_eq!(a1.total_points, 10);
        assert_eq!(a2.total_points, 10);
        assert!(a1.position < a2.position);
    }

    #[test]
    fn test_unbroken_tie_still_shares_position() {
        let rules = rules(&[10, 10], vec![TieBreakRule::CountBack]);
        let competitions = vec![competition(10, "Strzelectwo", ScoringType::Points)];
        let athletes = vec![
            athlete(1, 100, "A", &[10]),
            athlete(2, 100, "B", &[10]),
        ];
        let results = vec![active(1, 10, 90), active(2, 10, 90)];

        let entries = classify(&rules, &competitions, &athletes, &results);

        assert_eq!(entries[0].position, 1);
        assert_eq!(entries[1].position, 1);
    }

    #[test]
    fn test_filter_distributes_points_within_group() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![competition(10, "Strzelectwo", ScoringType::Points)];
        let mut girl = athlete(2, 100, "B", &[10]);
        girl.gender = Gender::Female;
        let athletes = vec![athlete(1, 100, "A", &[10]), girl];
        let results = vec![active(1, 10, 99), active(2, 10, 80)];

        let input = ClassificationInput {
            rules: &rules,
            competitions: &competitions,
            athletes: &athletes,
            results: &results,
        };
        let filter = ClassificationFilter {
            gender: Some(Gender::Female),
            category: None,
        };
        let entries = individual_classification(&input, &filter);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].total_points, 15);
        assert_eq!(entries[0].position, 1);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let rules = rules(TABLE, vec![TieBreakRule::CountBack]);
        let competitions = vec![
            competition(10, "Strzelectwo", ScoringType::Points),
            competition(11, "Bieg", ScoringType::Time),
        ];
        let athletes: Vec<Athlete> = (1..=8)
            .map(|n| athlete(n, 100 + n % 3, &format!("N{}", n % 4), &[10, 11]))
            .collect();
        let results: Vec<AthleteResult> = (1..=8)
            .flat_map(|n| [active(n, 10, (n as i64 * 7) % 5), active(n, 11, 600 + (n as i64 % 3))])
            .collect();
        let mut reversed = results.clone();
        reversed.reverse();

        let first = classify(&rules, &competitions, &athletes, &results);
        let second = classify(&rules, &competitions, &athletes, &results);
        let shuffled = classify(&rules, &competitions, &athletes, &reversed);

        assert_eq!(first, second);
        assert_eq!(first, shuffled);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_latest_duplicate_result_wins() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![competition(10, "Strzelectwo", ScoringType::Points)];
        let athletes = vec![athlete(1, 100, "A", &[10])];
        let stale = active(1, 10, 10);
        let mut fresh = active(1, 10, 20);
        fresh.result_id = Uuid::from_u128(999_999);
        fresh.recorded_at = ts() + chrono::Duration::minutes(5);

        let entries = classify(&rules, &competitions, &athletes, &[fresh, stale]);

        assert_eq!(entries[0].competitions[0].value, Some(Decimal::from(20)));
    }

    #[test]
    fn test_team_totals_are_sum_of_members() {
        let rules = rules(TABLE, vec![]);
        let competitions = vec![
            competition(10, "Strzelectwo", ScoringType::Points),
            competition(11, "Bieg", ScoringType::Time),
        ];
        let athletes = vec![
            athlete(1, 100, "A", &[10, 11]),
            athlete(2, 100, "B", &[10, 11]),
            athlete(3, 200, "C", &[10, 11]),
            athlete(4, 200, "D", &[10]),
        ];
        let results = vec![
            active(1, 10, 90),
            active(2, 10, 85),
            active(3, 10, 80),
            active(4, 10, 95),
            active(1, 11, 700),
            active(2, 11, 650),
            active(3, 11, 720),
        ];
        let teams = vec![team(100, "Drużyna A"), team(200, "Drużyna B")];

        let individual = classify(&rules, &competitions, &athletes, &results);
        let standings = team_classification(&teams, &individual);

        for team_entry in &standings {
            let expected: i32 = individual
                .iter()
                .filter(|e| e.athlete.team_id == team_entry.team_id)
                .map(|e| e.total_points)
                .sum();
            assert_eq!(team_entry.total_points, expected);
        }
    }

    fn individual_entry(n: u128, team: u128, total_points: i32) -> IndividualClassificationEntry {
        IndividualClassificationEntry {
            position: 0,
            athlete: ClassifiedAthlete::from(&athlete(n, team, &format!("N{n}"), &[])),
            competitions: vec![],
            total_points,
        }
    }

    #[test]
    fn test_team_ranking_by_total() {
        let teams = vec![team(100, "Zastęp Orły"), team(200, "Zastęp Wilki")];
        let individual = vec![
            individual_entry(1, 100, 285),
            individual_entry(2, 100, 140),
            individual_entry(3, 200, 380),
        ];

        let standings = team_classification(&teams, &individual);

        assert_eq!(standings[0].team_id, id(100));
        assert_eq!(standings[0].total_points, 425);
        assert_eq!(standings[0].position, 1);
        assert_eq!(standings[0].athletes[0].total_points, 285);
        assert_eq!(standings[1].total_points, 380);
        assert_eq!(standings[1].position, 2);
    }

    #[test]
    fn test_team_ties_share_position_and_empty_teams_rank_last() {
        let teams = vec![team(100, "B"), team(200, "A"), team(300, "C")];
        let individual = vec![individual_entry(1, 100, 50), individual_entry(2, 200, 50)];

        let standings = team_classification(&teams, &individual);

        let summary: Vec<(u32, &str, i32)> = standings
            .iter()
            .map(|t| (t.position, t.team_name.as_str(), t.total_points))
            .collect();
        assert_eq!(summary, vec![(1, "A", 50), (1, "B", 50), (3, "C", 0)]);
    }
}
