//! Pure read-side derivations over polls: tallies, the activity predicate and
//! viewer lookups. Every function takes `now` / `user_id` explicitly and
//! accepts a possibly-missing poll.

use std::collections::HashMap;
use time::OffsetDateTime;

use crate::models::{ActivitySummary, Ballot, OptionTally, Poll, PollStatus, PollView};
use crate::PollError;

/// Per-option counts and percentages, in `poll.options` order.
///
/// Ballots naming an option the poll no longer lists fall in no bucket and
/// are left out of the denominator; see [`uncounted_ballots`].
pub fn tally(poll: Option<&Poll>) -> Vec<OptionTally> {
    let Some(poll) = poll else { return Vec::new() };

    let mut counts: HashMap<&str, usize> = poll.options.iter()
        .map(|opt| (opt.as_str(), 0))
        .collect();

    for ballot in &poll.votes {
        if let Some(count) = counts.get_mut(ballot.option.as_str()) {
            *count += 1;
        }
    }

    let total: usize = counts.values().sum();

    poll.options.iter()
        .map(|opt| {
            let count = counts.get(opt.as_str()).copied().unwrap_or(0);
            OptionTally {
                option: opt.clone(),
                count,
                percentage: percentage(count, total),
            }
        })
        .collect()
}

pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

/// Sum of the tally buckets, i.e. the percentage denominator.
pub fn total_votes(results: &[OptionTally]) -> usize {
    results.iter().map(|r| r.count).sum()
}

/// Ballots whose option matches none of the poll's current options.
pub fn uncounted_ballots(poll: Option<&Poll>) -> usize {
    poll.map_or(0, |poll| {
        poll.votes.iter()
            .filter(|b| !poll.options.contains(&b.option))
            .count()
    })
}

/// A poll accepts votes only while flagged active and strictly before its deadline.
pub fn is_active(poll: Option<&Poll>, now: OffsetDateTime) -> bool {
    poll.is_some_and(|poll| poll.status == PollStatus::Active && poll.deadline > now)
}

/// The viewer's ballot, if any. More than one ballot for the same user is
/// reported rather than resolved silently.
pub fn user_ballot<'a>(poll: Option<&'a Poll>, user_id: &str) -> Result<Option<&'a Ballot>, PollError> {
    let Some(poll) = poll else { return Ok(None) };

    let mut mine = poll.votes.iter().filter(|b| b.user_id == user_id);
    let first = mine.next();
    let extra = mine.count();

    if extra > 0 {
        return Err(PollError::DuplicateBallots {
            user_id: user_id.to_string(),
            count: extra + 1,
        });
    }
    Ok(first)
}

pub fn has_user_voted(poll: Option<&Poll>, user_id: &str) -> bool {
    poll.is_some_and(|poll| poll.votes.iter().any(|b| b.user_id == user_id))
}

pub fn active_poll_count(polls: &[Poll], now: OffsetDateTime) -> usize {
    polls.iter().filter(|p| is_active(Some(p), now)).count()
}

/// Ballots a user has cast across every poll.
pub fn ballots_cast_by(polls: &[Poll], user_id: &str) -> usize {
    polls.iter()
        .map(|p| p.votes.iter().filter(|b| b.user_id == user_id).count())
        .sum()
}

pub fn summarize(polls: &[Poll], user_id: &str, now: OffsetDateTime) -> ActivitySummary {
    ActivitySummary {
        active_polls: active_poll_count(polls, now),
        my_ballots: ballots_cast_by(polls, user_id),
    }
}

/// Builds the per-viewer projection. Duplicate ballots degrade to the first
/// match so a damaged record still renders.
pub fn view(poll: Poll, user_id: &str, now: OffsetDateTime) -> PollView {
    let results = tally(Some(&poll));
    let total_votes = total_votes(&results);
    let my_choice = match user_ballot(Some(&poll), user_id) {
        Ok(ballot) => ballot.map(|b| b.option.clone()),
        Err(_) => poll.votes.iter()
            .find(|b| b.user_id == user_id)
            .map(|b| b.option.clone()),
    };

    PollView {
        results,
        total_votes,
        uncounted_ballots: uncounted_ballots(Some(&poll)),
        is_active: is_active(Some(&poll), now),
        my_choice,
        poll,
    }
}

/// Percentage as shown next to each option, one decimal place.
pub fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}
