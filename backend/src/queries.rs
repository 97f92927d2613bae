use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use uuid::Uuid;
use shared::models::*;
use crate::store::{PollStore, StoreError};

const POLL_COLUMNS: &str =
    "id, title, description, options, deadline, status, votes, created_date, version";

/// `PollStore` backed by the `polls` table. Ballots live in a `jsonb` column
/// and are always written as a whole list.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn poll_from_row(row: &PgRow) -> Result<Poll, StoreError> {
    let votes: Json<Vec<Ballot>> = row.try_get("votes").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;

    Ok(Poll {
        id: row.try_get("id").map_err(db_err)?,
        title: row.try_get("title").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        options: row.try_get("options").map_err(db_err)?,
        deadline: row.try_get("deadline").map_err(db_err)?,
        status: PollStatus::from(status),
        votes: votes.0,
        created_date: row.try_get("created_date").map_err(db_err)?,
        version: row.try_get("version").map_err(db_err)?,
    })
}

#[rocket::async_trait]
impl PollStore for PgStore {
    async fn list(&self, sort: SortSpec) -> Result<Vec<Poll>, StoreError> {
        let order = match sort {
            SortSpec::CreatedDesc => "DESC",
            SortSpec::CreatedAsc => "ASC",
        };
        let sql = format!("SELECT {POLL_COLUMNS} FROM polls ORDER BY created_date {order}");

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(poll_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        let sql = format!("SELECT {POLL_COLUMNS} FROM polls WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(poll_from_row).transpose()
    }

    async fn create(&self, poll: NewPoll) -> Result<Poll, StoreError> {
        let sql = format!(
            "INSERT INTO polls (id, title, description, options, deadline, status, votes, created_date, version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), 1)
             RETURNING {POLL_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&poll.title)
            .bind(&poll.description)
            .bind(&poll.options)
            .bind(poll.deadline)
            .bind(poll.status.as_str())
            .bind(Json(&poll.votes))
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        poll_from_row(&row)
    }

    async fn update(
        &self,
        id: Uuid,
        update: PollUpdate,
        expected_version: Option<i64>,
    ) -> Result<Poll, StoreError> {
        let sql = format!(
            "UPDATE polls SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                deadline = COALESCE($4, deadline),
                status = COALESCE($5, status),
                votes = COALESCE($6, votes),
                version = version + 1
             WHERE id = $1 AND ($7::BIGINT IS NULL OR version = $7)
             RETURNING {POLL_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(update.title)
            .bind(update.description)
            .bind(update.deadline)
            .bind(update.status.map(String::from))
            .bind(update.votes.map(Json))
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        if let Some(row) = row {
            return poll_from_row(&row);
        }

        let found: Option<i64> = sqlx::query_scalar("SELECT version FROM polls WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match (found, expected_version) {
            (Some(found), Some(expected)) => Err(StoreError::Conflict { expected, found }),
            (Some(_), None) => Err(StoreError::Database("update matched no row".into())),
            (None, _) => Err(StoreError::NotFound),
        }
    }
}
