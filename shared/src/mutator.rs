//! Write-side poll operations. Each returns the new field values to persist
//! and leaves its input untouched; persistence is the caller's round-trip.

use thiserror::Error;
use time::OffsetDateTime;

use crate::evaluator::is_active;
use crate::models::{Ballot, NewPoll, Poll, PollForm, PollPatch, PollStatus, PollUpdate};
use crate::validation::{validate_poll_form, validate_poll_patch, ValidationError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PollError {
    #[error("Poll is not accepting votes")]
    Inactive,
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("User {user_id} has {count} ballots recorded on one poll")]
    DuplicateBallots { user_id: String, count: usize },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Upserts `user_id`'s single ballot and returns the full replacement list.
///
/// An existing ballot is replaced in place so list order is preserved; a new
/// voter is appended. Any further ballots for the same user are dropped.
/// No activity check happens here, see [`checked_cast`].
pub fn cast_or_change_vote(
    poll: &Poll,
    user_id: &str,
    selected_option: &str,
    now: OffsetDateTime,
) -> Vec<Ballot> {
    let ballot = Ballot {
        user_id: user_id.to_string(),
        option: selected_option.to_string(),
        timestamp: now,
    };

    let mut votes = Vec::with_capacity(poll.votes.len() + 1);
    let mut pending = Some(ballot);
    for existing in &poll.votes {
        if existing.user_id == user_id {
            if let Some(replacement) = pending.take() {
                votes.push(replacement);
            }
        } else {
            votes.push(existing.clone());
        }
    }
    if let Some(new_ballot) = pending {
        votes.push(new_ballot);
    }
    votes
}

/// [`cast_or_change_vote`] with the server-side policy applied: the poll must be
/// active at `now` and the option must be one the poll currently offers.
pub fn checked_cast(
    poll: &Poll,
    user_id: &str,
    selected_option: &str,
    now: OffsetDateTime,
) -> Result<Vec<Ballot>, PollError> {
    if !is_active(Some(poll), now) {
        return Err(PollError::Inactive);
    }
    if !poll.options.iter().any(|opt| opt == selected_option) {
        return Err(PollError::UnknownOption(selected_option.to_string()));
    }
    Ok(cast_or_change_vote(poll, user_id, selected_option, now))
}

/// Admin edit of title, description and deadline.
///
/// The deadline is not checked against the clock: a past value closes the
/// poll and a future one reopens it through [`is_active`].
pub fn edit_poll(poll: &Poll, patch: PollPatch) -> Result<PollUpdate, PollError> {
    validate_poll_patch(&patch)?;

    let mut update = PollUpdate::from(patch);
    update.title = update.title.map(|t| t.trim().to_string());
    update.description = update.description.map(|d| d.trim().to_string());
    // Whole-field writes; skip keys that would not change anything.
    if update.title.as_deref() == Some(poll.title.as_str()) {
        update.title = None;
    }
    if update.description.as_deref() == Some(poll.description.as_str()) {
        update.description = None;
    }
    if update.deadline == Some(poll.deadline) {
        update.deadline = None;
    }
    Ok(update)
}

pub fn create_poll(form: &PollForm) -> Result<NewPoll, ValidationError> {
    let options = validate_poll_form(form)?;
    let deadline = form.deadline.ok_or(ValidationError::MissingDeadline)?;

    Ok(NewPoll {
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        options,
        deadline,
        status: PollStatus::Active,
        votes: Vec::new(),
    })
}
