use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;
use shared::{evaluator, mutator, models::*, CurrentUser, PollError};
use crate::{config::AppConfig, error::ApiError, store::{PollStore, StoreError}};

/// Runs poll operations against a store. Every write goes through a
/// version-checked update and is recomputed from a fresh read on conflict.
pub struct PollProcessor {
    store: Arc<dyn PollStore>,
    max_write_attempts: u32,
}

impl PollProcessor {
    pub fn new(store: Arc<dyn PollStore>, config: &AppConfig) -> Self {
        Self {
            store,
            max_write_attempts: config.max_write_attempts.max(1),
        }
    }

    pub async fn list_polls(
        &self,
        viewer: &CurrentUser,
        sort: SortSpec,
        now: OffsetDateTime,
    ) -> Result<Vec<PollView>, ApiError> {
        let polls = self.store.list(sort).await?;
        Ok(polls.into_iter()
            .map(|poll| evaluator::view(poll, &viewer.id, now))
            .collect())
    }

    pub async fn get_poll(
        &self,
        viewer: &CurrentUser,
        id: Uuid,
        now: OffsetDateTime,
    ) -> Result<PollView, ApiError> {
        let poll = self.fetch(id).await?;
        Ok(evaluator::view(poll, &viewer.id, now))
    }

    pub async fn create_poll(&self, actor: &CurrentUser, form: &PollForm) -> Result<Poll, ApiError> {
        require_admin(actor)?;
        let new_poll = mutator::create_poll(form)?;
        let poll = self.store.create(new_poll).await?;
        info!("Poll {} created by {} with {} options", poll.id, actor.id, poll.options.len());
        Ok(poll)
    }

    pub async fn edit_poll(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        patch: PollPatch,
    ) -> Result<Poll, ApiError> {
        require_admin(actor)?;
        shared::validate_poll_patch(&patch)?;
        let poll = self.write_with_retry(id, |current| {
            let update = mutator::edit_poll(current, patch.clone())?;
            Ok((update != PollUpdate::default()).then_some(update))
        }).await?;
        info!("Poll {} edited by {} (deadline {})", id, actor.id, poll.deadline);
        Ok(poll)
    }

    pub async fn cast_vote(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        option: &str,
        now: OffsetDateTime,
    ) -> Result<PollView, ApiError> {
        let poll = self.write_with_retry(id, |current| {
            if let Err(PollError::DuplicateBallots { count, .. }) = evaluator::user_ballot(Some(current), &actor.id) {
                warn!("Poll {} holds {} ballots for user {}, collapsing", current.id, count, actor.id);
            }
            let votes = mutator::checked_cast(current, &actor.id, option, now)?;
            Ok(Some(PollUpdate::votes(votes)))
        }).await?;
        debug!("User {} voted on poll {}", actor.id, id);
        Ok(evaluator::view(poll, &actor.id, now))
    }

    pub async fn summary(&self, viewer: &CurrentUser, now: OffsetDateTime) -> Result<ActivitySummary, ApiError> {
        let polls = self.store.list(SortSpec::default()).await?;
        Ok(evaluator::summarize(&polls, &viewer.id, now))
    }

    async fn fetch(&self, id: Uuid) -> Result<Poll, ApiError> {
        self.store.get(id).await?.ok_or(ApiError::NotFound)
    }

    /// Read, compute, conditionally write. `compute` returning `None` means
    /// there is nothing to write and the current poll is returned as is.
    async fn write_with_retry<F>(&self, id: Uuid, mut compute: F) -> Result<Poll, ApiError>
    where
        F: FnMut(&Poll) -> Result<Option<PollUpdate>, ApiError> + Send,
    {
        for attempt in 1..=self.max_write_attempts {
            let current = self.fetch(id).await?;
            let Some(update) = compute(&current)? else {
                return Ok(current);
            };

            match self.store.update(id, update, Some(current.version)).await {
                Ok(poll) => return Ok(poll),
                Err(StoreError::Conflict { expected, found }) => {
                    warn!(
                        "Write conflict on poll {} (attempt {}/{}, expected v{}, found v{})",
                        id, attempt, self.max_write_attempts, expected, found
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ApiError::Conflict)
    }
}

fn require_admin(actor: &CurrentUser) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        warn!("User {} attempted an admin-only poll operation", actor.id);
        Err(ApiError::Forbidden)
    }
}
