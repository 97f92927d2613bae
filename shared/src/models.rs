use serde::{Serialize, Deserialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// Poll status flag as stored. Unknown values are preserved but never active.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PollStatus {
    #[default]
    Active,
    Closed,
    Other(String),
}

impl PollStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PollStatus::Active => "active",
            PollStatus::Closed => "closed",
            PollStatus::Other(s) => s,
        }
    }
}

impl From<String> for PollStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => PollStatus::Active,
            "closed" => PollStatus::Closed,
            _ => PollStatus::Other(value),
        }
    }
}

impl From<PollStatus> for String {
    fn from(status: PollStatus) -> Self {
        match status {
            PollStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for PollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's recorded choice, embedded in `Poll::votes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ballot {
    pub user_id: String,
    pub option: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// A community vote, stored in the "Vote" entity collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Poll {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    #[serde(default)]
    pub status: PollStatus,
    #[serde(default)]
    pub votes: Vec<Ballot>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    #[serde(default)]
    pub version: i64,
}

/// Fields submitted to the store's `create`; id, created_date and version are store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPoll {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    pub status: PollStatus,
    pub votes: Vec<Ballot>,
}

/// Raw admin input for a new poll, as typed into the create form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PollForm {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
}

/// Admin edit. Options and votes are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PollPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
}

impl PollPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.deadline.is_none()
    }
}

/// Partial update handed to the store. Each `Some` field overwrites the stored field whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<OffsetDateTime>,
    pub status: Option<PollStatus>,
    pub votes: Option<Vec<Ballot>>,
}

impl PollUpdate {
    pub fn votes(votes: Vec<Ballot>) -> Self {
        Self { votes: Some(votes), ..Self::default() }
    }

    /// Applies the update to an in-memory poll, leaving absent fields untouched.
    pub fn apply_to(self, poll: &mut Poll) {
        if let Some(title) = self.title {
            poll.title = title;
        }
        if let Some(description) = self.description {
            poll.description = description;
        }
        if let Some(deadline) = self.deadline {
            poll.deadline = deadline;
        }
        if let Some(status) = self.status {
            poll.status = status;
        }
        if let Some(votes) = self.votes {
            poll.votes = votes;
        }
    }
}

impl From<PollPatch> for PollUpdate {
    fn from(patch: PollPatch) -> Self {
        Self {
            title: patch.title,
            description: patch.description,
            deadline: patch.deadline,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastBallotRequest {
    pub option: String,
}

/// Ordering for `list`. The wire form mirrors the "-created_date" convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortSpec {
    #[default]
    CreatedDesc,
    CreatedAsc,
}

impl SortSpec {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("created_date") => SortSpec::CreatedAsc,
            _ => SortSpec::CreatedDesc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortSpec::CreatedDesc => "-created_date",
            SortSpec::CreatedAsc => "created_date",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionTally {
    pub option: String,
    pub count: usize,
    pub percentage: f64,
}

/// A poll as one viewer sees it at one instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollView {
    pub poll: Poll,
    pub results: Vec<OptionTally>,
    pub total_votes: usize,
    pub uncounted_ballots: usize,
    pub is_active: bool,
    pub my_choice: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActivitySummary {
    pub active_polls: usize,
    pub my_ballots: usize,
}
