use sqlx::PgPool;
use storage::{
    dto::{
        classification::{
            ClassificationFilter, IndividualClassificationEntry, TeamClassificationEntry,
        },
        result::ResultFilter,
    },
    error::Result,
    models::{Athlete, AthleteResult, Competition, Event, RegistrationStatus, Team},
    repository::{
        self, AthleteRepository, CompetitionRepository, EventRepository, ResultRepository,
        TeamRepository,
    },
    services::classification::{self, ClassificationInput},
};
use uuid::Uuid;

/// Rows a classification is computed from, read from one snapshot. Only
/// accepted teams take part.
struct Standings {
    event: Event,
    competitions: Vec<Competition>,
    teams: Vec<Team>,
    athletes: Vec<Athlete>,
    results: Vec<AthleteResult>,
}

impl Standings {
    async fn load(pool: &PgPool, event_id: Uuid) -> Result<Self> {
        let mut tx = repository::begin_snapshot(pool).await?;

        let event = EventRepository::find_by_id_in(&mut tx, event_id).await?;
        let competitions = CompetitionRepository::list_by_event_in(&mut tx, event_id).await?;
        let teams = TeamRepository::list_by_event_in(
            &mut tx,
            event_id,
            Some(RegistrationStatus::Accepted),
        )
        .await?;
        let athletes = AthleteRepository::list_accepted_by_event_in(&mut tx, event_id).await?;
        let results = ResultRepository::list_in(
            &mut tx,
            &ResultFilter {
                event_id: Some(event_id),
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;

        Ok(Self {
            event,
            competitions,
            teams,
            athletes,
            results,
        })
    }

    fn individual(&self, filter: &ClassificationFilter) -> Vec<IndividualClassificationEntry> {
        let input = ClassificationInput {
            rules: &self.event.scoring_rules,
            competitions: &self.competitions,
            athletes: &self.athletes,
            results: &self.results,
        };
        classification::individual_classification(&input, filter)
    }
}

pub async fn individual_classification(
    pool: &PgPool,
    event_id: Uuid,
    filter: &ClassificationFilter,
) -> Result<Vec<IndividualClassificationEntry>> {
    let standings = Standings::load(pool, event_id).await?;
    let entries = standings.individual(filter);

    tracing::debug!(%event_id, athletes = entries.len(), "Individual classification computed");
    Ok(entries)
}

pub async fn team_classification(
    pool: &PgPool,
    event_id: Uuid,
) -> Result<Vec<TeamClassificationEntry>> {
    let standings = Standings::load(pool, event_id).await?;

    let individual = standings.individual(&ClassificationFilter::default());
    let entries = classification::team_classification(&standings.teams, &individual);

    tracing::debug!(%event_id, teams = entries.len(), "Team classification computed");
    Ok(entries)
}
