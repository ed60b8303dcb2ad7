use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::dto::marathon::{CreateMarathonRequest, ListMarathonsFilter};
use crate::dto::standings::{MarathonSnapshot, RankedParticipant};
use crate::error::{Result, StorageError};
use crate::models::{Marathon, MarathonParticipant, MarathonState, MetricEntry};
use crate::services::standings::rank_participants;

/// Repository for Marathon database operations. The roster is part of the
/// marathon aggregate, so participant reads live here too.
pub struct MarathonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MarathonRepository<'a> {
    /// Create a new MarathonRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List marathons, newest first, with an optional state filter
    pub async fn list(&self, filter: &ListMarathonsFilter) -> Result<(Vec<Marathon>, i64)> {
        let total_items = self.count(filter).await?;

        let mut query = QueryBuilder::new(
            r#"
            SELECT marathon_id, name, kind, from_date, to_date, state, created_at
            FROM marathons
            WHERE 1=1
            "#,
        );

        if let Some(state) = filter.state {
            query.push(" AND state = ");
            query.push_bind(state);
        }

        query.push(" ORDER BY from_date DESC, created_at DESC LIMIT ");
        query.push_bind(filter.limit());
        query.push(" OFFSET ");
        query.push_bind(filter.offset());

        let marathons: Vec<Marathon> = query.build_query_as().fetch_all(self.pool).await?;

        Ok((marathons, total_items))
    }

    async fn count(&self, filter: &ListMarathonsFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM marathons WHERE 1=1");

        if let Some(state) = filter.state {
            query.push(" AND state = ");
            query.push_bind(state);
        }

        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Get a marathon by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Marathon> {
        let marathon = sqlx::query_as::<_, Marathon>(
            r#"
            SELECT marathon_id, name, kind, from_date, to_date, state, created_at
            FROM marathons
            WHERE marathon_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(marathon)
    }

    /// Create a marathon together with its roster in one transaction
    pub async fn create(
        &self,
        req: &CreateMarathonRequest,
    ) -> Result<(Marathon, Vec<MarathonParticipant>)> {
        let mut tx = self.pool.begin().await?;

        let marathon = sqlx::query_as::<_, Marathon>(
            r#"
            INSERT INTO marathons (marathon_id, name, kind, from_date, to_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING marathon_id, name, kind, from_date, to_date, state, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(req.kind)
        .bind(req.from_date)
        .bind(req.to_date)
        .fetch_one(&mut *tx)
        .await?;

        let mut insert = QueryBuilder::new(
            "INSERT INTO marathon_participants (participant_id, marathon_id, name, date_of_birth) ",
        );
        insert.push_values(&req.participants, |mut row, p| {
            row.push_bind(Uuid::new_v4())
                .push_bind(marathon.marathon_id)
                .push_bind(&p.name)
                .push_bind(p.date_of_birth);
        });
        insert.push(" RETURNING participant_id, marathon_id, name, date_of_birth, created_at");

        let participants: Vec<MarathonParticipant> =
            insert.build_query_as().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        Ok((marathon, participants))
    }

    /// Finish an active marathon and freeze its final ranking, all in one
    /// transaction. The guarded UPDATE runs first: once it succeeds no new
    /// entries pass the active check, so the snapshot read afterwards is
    /// the one the frozen positions are computed from. A lost race returns
    /// ConstraintViolation and writes nothing.
    pub async fn finish(&self, id: Uuid) -> Result<(Marathon, Vec<RankedParticipant>)> {
        let mut tx = self.pool.begin().await?;

        let marathon = sqlx::query_as::<_, Marathon>(
            r#"
            UPDATE marathons
            SET state = $3
            WHERE marathon_id = $1 AND state = $2
            RETURNING marathon_id, name, kind, from_date, to_date, state, created_at
            "#,
        )
        .bind(id)
        .bind(MarathonState::Active)
        .bind(MarathonState::Finished)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            StorageError::ConstraintViolation("Marathon is no longer active".to_string())
        })?;

        let participants = sqlx::query_as::<_, MarathonParticipant>(
            r#"
            SELECT participant_id, marathon_id, name, date_of_birth, created_at
            FROM marathon_participants
            WHERE marathon_id = $1
            ORDER BY name ASC, participant_id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let entries = sqlx::query_as::<_, MetricEntry>(
            r#"
            SELECT entry_id, marathon_id, participant_id, day, entry_date, weight, height, created_at
            FROM marathon_entries
            WHERE marathon_id = $1
            ORDER BY entry_id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let snapshot = MarathonSnapshot::assemble(marathon, participants, entries);
        let ranked = rank_participants(&snapshot);

        sqlx::query("DELETE FROM marathon_positions WHERE marathon_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if !ranked.is_empty() {
            let mut insert = QueryBuilder::new(
                "INSERT INTO marathon_positions (marathon_id, participant_id, position, net_change) ",
            );
            insert.push_values(&ranked, |mut row, entry| {
                row.push_bind(id)
                    .push_bind(entry.participant_id)
                    .push_bind(entry.position)
                    .push_bind(entry.net_change);
            });
            insert.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        Ok((snapshot.marathon, ranked))
    }

    /// Transition a marathon between states. The expected state is part of
    /// the WHERE clause so a concurrent transition cannot be overwritten.
    pub async fn set_state(
        &self,
        id: Uuid,
        expected: MarathonState,
        next: MarathonState,
    ) -> Result<Marathon> {
        let marathon = sqlx::query_as::<_, Marathon>(
            r#"
            UPDATE marathons
            SET state = $3
            WHERE marathon_id = $1 AND state = $2
            RETURNING marathon_id, name, kind, from_date, to_date, state, created_at
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| {
            StorageError::ConstraintViolation(format!(
                "Marathon is no longer {}",
                expected.as_str()
            ))
        })?;

        Ok(marathon)
    }

    /// Delete a marathon by ID. Entries, roster and frozen positions cascade.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM marathons WHERE marathon_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// List the roster of a marathon
    pub async fn list_participants(&self, marathon_id: Uuid) -> Result<Vec<MarathonParticipant>> {
        let participants = sqlx::query_as::<_, MarathonParticipant>(
            r#"
            SELECT participant_id, marathon_id, name, date_of_birth, created_at
            FROM marathon_participants
            WHERE marathon_id = $1
            ORDER BY name ASC, participant_id ASC
            "#,
        )
        .bind(marathon_id)
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    /// Get one enrolled participant; NotFound when the participant does not
    /// belong to this marathon.
    pub async fn find_participant(
        &self,
        marathon_id: Uuid,
        participant_id: Uuid,
    ) -> Result<MarathonParticipant> {
        let participant = sqlx::query_as::<_, MarathonParticipant>(
            r#"
            SELECT participant_id, marathon_id, name, date_of_birth, created_at
            FROM marathon_participants
            WHERE marathon_id = $1 AND participant_id = $2
            "#,
        )
        .bind(marathon_id)
        .bind(participant_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(participant)
    }
}
