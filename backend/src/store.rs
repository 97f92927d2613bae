use std::collections::HashMap;
use std::sync::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;
use shared::models::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Poll not found")]
    NotFound,
    #[error("Poll was modified concurrently (expected version {expected}, found {found})")]
    Conflict { expected: i64, found: i64 },
    #[error("Store lock poisoned")]
    LockFailed,
    #[error("Database error: {0}")]
    Database(String),
}

/// The "Vote" entity collection.
///
/// `update` overwrites each given field whole. When `expected_version` is set
/// the write only lands if the stored version still matches.
#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    async fn list(&self, sort: SortSpec) -> Result<Vec<Poll>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Poll>, StoreError>;

    async fn create(&self, poll: NewPoll) -> Result<Poll, StoreError>;

    async fn update(
        &self,
        id: Uuid,
        update: PollUpdate,
        expected_version: Option<i64>,
    ) -> Result<Poll, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    polls: Mutex<HashMap<Uuid, Poll>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_polls(polls: impl IntoIterator<Item = Poll>) -> Self {
        Self {
            polls: Mutex::new(polls.into_iter().map(|p| (p.id, p)).collect()),
        }
    }
}

pub(crate) fn sort_polls(polls: &mut [Poll], sort: SortSpec) {
    match sort {
        SortSpec::CreatedDesc => polls.sort_by(|a, b| b.created_date.cmp(&a.created_date)),
        SortSpec::CreatedAsc => polls.sort_by(|a, b| a.created_date.cmp(&b.created_date)),
    }
}

#[rocket::async_trait]
impl PollStore for MemoryStore {
    async fn list(&self, sort: SortSpec) -> Result<Vec<Poll>, StoreError> {
        let polls = self.polls.lock().map_err(|_| StoreError::LockFailed)?;
        let mut all: Vec<Poll> = polls.values().cloned().collect();
        sort_polls(&mut all, sort);
        Ok(all)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        let polls = self.polls.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(polls.get(&id).cloned())
    }

    async fn create(&self, poll: NewPoll) -> Result<Poll, StoreError> {
        let created = Poll {
            id: Uuid::new_v4(),
            title: poll.title,
            description: poll.description,
            options: poll.options,
            deadline: poll.deadline,
            status: poll.status,
            votes: poll.votes,
            created_date: OffsetDateTime::now_utc(),
            version: 1,
        };
        let mut polls = self.polls.lock().map_err(|_| StoreError::LockFailed)?;
        polls.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        update: PollUpdate,
        expected_version: Option<i64>,
    ) -> Result<Poll, StoreError> {
        let mut polls = self.polls.lock().map_err(|_| StoreError::LockFailed)?;
        let poll = polls.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(expected) = expected_version {
            if poll.version != expected {
                return Err(StoreError::Conflict { expected, found: poll.version });
            }
        }

        update.apply_to(poll);
        poll.version += 1;
        Ok(poll.clone())
    }
}
