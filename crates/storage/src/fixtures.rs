//! Rows for database-backed tests. Every helper returns the new row's id.

use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{
    Branding, CompetitionStatus, EventStatus, RegistrationRules, RegistrationStatus, ScoringRules,
};

pub async fn event(pool: &PgPool, status: EventStatus, max_teams: Option<i32>) -> Uuid {
    let event_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO events (
            event_id, name, slug, start_date, end_date, registration_deadline, status,
            max_teams, scoring_rules, registration_rules, branding
        )
        VALUES (
            $1, 'Zawody Obronne', $2, CURRENT_DATE + 30, CURRENT_DATE + 31,
            CURRENT_TIMESTAMP + INTERVAL '20 days', $3, $4, $5, $6, $7
        )
        "#,
    )
    .bind(event_id)
    .bind(format!("zawody-{event_id}"))
    .bind(status)
    .bind(max_teams)
    .bind(Json(ScoringRules::default()))
    .bind(Json(RegistrationRules::default()))
    .bind(Json(Branding::default()))
    .execute(pool)
    .await
    .unwrap();
    event_id
}

pub async fn competition(pool: &PgPool, event_id: Uuid, status: CompetitionStatus) -> Uuid {
    let competition_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO competitions (competition_id, event_id, name, competition_type, scoring_type, status)
        VALUES ($1, $2, $3, 'shooting', 'points', $4)
        "#,
    )
    .bind(competition_id)
    .bind(event_id)
    .bind(format!("Strzelectwo {competition_id}"))
    .bind(status)
    .execute(pool)
    .await
    .unwrap();
    competition_id
}

pub async fn team(
    pool: &PgPool,
    event_id: Uuid,
    status: RegistrationStatus,
    start_number: Option<i32>,
) -> Uuid {
    let team_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO teams (team_id, event_id, name, registration_status, start_number)
        VALUES ($1, $2, 'Orlęta', $3, $4)
        "#,
    )
    .bind(team_id)
    .bind(event_id)
    .bind(status)
    .bind(start_number)
    .execute(pool)
    .await
    .unwrap();
    team_id
}

/// An athlete entered in `competitions`, with a start list slot in each.
pub async fn athlete(pool: &PgPool, team_id: Uuid, competitions: &[Uuid]) -> Uuid {
    let athlete_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO athletes (athlete_id, team_id, first_name, last_name, birth_year, category, gender)
        VALUES ($1, $2, 'Jan', 'Nowak', 2008, 'junior', 'male')
        "#,
    )
    .bind(athlete_id)
    .bind(team_id)
    .execute(pool)
    .await
    .unwrap();

    for competition_id in competitions {
        sqlx::query("INSERT INTO athlete_competitions (athlete_id, competition_id) VALUES ($1, $2)")
            .bind(athlete_id)
            .bind(competition_id)
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            r#"
            INSERT INTO start_list_entries (competition_id, athlete_id, start_order)
            SELECT $1, $2, COALESCE(MAX(start_order), 0) + 1
            FROM start_list_entries
            WHERE competition_id = $1
            "#,
        )
        .bind(competition_id)
        .bind(athlete_id)
        .execute(pool)
        .await
        .unwrap();
    }
    athlete_id
}
