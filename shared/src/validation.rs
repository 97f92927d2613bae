use std::collections::HashSet;
use crate::models::{PollForm, PollPatch};

pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,
    #[error("Description is required")]
    EmptyDescription,
    #[error("Deadline is required")]
    MissingDeadline,
    #[error("Too few options (minimum {MIN_OPTIONS})")]
    TooFewOptions,
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),
    #[error("Nothing to update")]
    EmptyPatch,
}

/// Trims every option and drops the ones left empty, keeping input order.
pub fn normalize_options(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|opt| opt.trim())
        .filter(|opt| !opt.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn validate_poll_form(form: &PollForm) -> Result<Vec<String>, ValidationError> {
    if form.title.trim().is_empty() { return Err(ValidationError::EmptyTitle); }
    if form.description.trim().is_empty() { return Err(ValidationError::EmptyDescription); }
    if form.deadline.is_none() { return Err(ValidationError::MissingDeadline); }

    let options = normalize_options(&form.options);
    if options.len() < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }

    // Exact match, since tallies compare options case-sensitively.
    let mut seen: HashSet<&String> = HashSet::with_capacity(options.len());
    if let Some(dup) = options.iter().find(|opt| !seen.insert(*opt)) {
        return Err(ValidationError::DuplicateOption(dup.clone()));
    }

    Ok(options)
}

pub fn validate_poll_patch(patch: &PollPatch) -> Result<(), ValidationError> {
    if patch.is_empty() { return Err(ValidationError::EmptyPatch); }
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ValidationError::EmptyTitle);
    }
    if patch.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(())
}
