use sqlx::{PgPool, Postgres, Transaction};

use crate::error::Result;

mod athlete;
mod competition;
mod event;
mod result;
mod start_list;
mod team;

pub use athlete::AthleteRepository;
pub use competition::CompetitionRepository;
pub use event::EventRepository;
pub use result::{NewResult, ResultRepository};
pub use start_list::StartListRepository;
pub use team::TeamRepository;

/// Opens a read-only transaction that sees one snapshot of the database for
/// every query run on it.
pub async fn begin_snapshot(pool: &PgPool) -> Result<Transaction<'_, Postgres>> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::models::EventStatus;

    async fn count_events(conn: &mut sqlx::PgConnection) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(conn)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn test_snapshot_ignores_later_commits(pool: PgPool) {
        fixtures::event(&pool, EventStatus::Open, None).await;

        let mut tx = begin_snapshot(&pool).await.unwrap();
        assert_eq!(count_events(&mut tx).await, 1);

        fixtures::event(&pool, EventStatus::Open, None).await;
        assert_eq!(count_events(&mut tx).await, 1);
        tx.commit().await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(count_events(&mut conn).await, 2);
    }

    #[sqlx::test]
    async fn test_snapshot_is_read_only(pool: PgPool) {
        let event_id = fixtures::event(&pool, EventStatus::Open, None).await;

        let mut tx = begin_snapshot(&pool).await.unwrap();
        let write = sqlx::query("UPDATE events SET name = 'x' WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await;
        assert!(write.is_err());
    }
}
