use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Parses a `datetime-local` form value ("2024-05-01T18:30") in a fixed
/// offset. Blank or malformed input yields `None`, which create-form
/// validation reports as a missing deadline.
pub fn parse_deadline_input(raw: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    parse_local_deadline(raw, |_| offset)
}

/// Like [`parse_deadline_input`], but the offset is looked up for the typed
/// wall-clock time itself, so a deadline past a DST change lands on the
/// right instant.
pub fn parse_local_deadline(
    raw: &str,
    offset_at: impl Fn(PrimitiveDateTime) -> UtcOffset,
) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let minutes_only = format_description!("[year]-[month]-[day]T[hour]:[minute]");

    PrimitiveDateTime::parse(raw, minutes_only)
        .or_else(|_| PrimitiveDateTime::parse(raw, with_seconds))
        .ok()
        .map(|local| local.assume_offset(offset_at(local)).to_offset(UtcOffset::UTC))
}

/// Inverse of [`parse_deadline_input`], for pre-filling the edit form.
/// `offset` should be the one in force at `deadline`.
pub fn format_deadline_input(deadline: OffsetDateTime, offset: UtcOffset) -> String {
    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    deadline.to_offset(offset)
        .format(fmt)
        .unwrap_or_default()
}

/// Human-readable deadline for poll cards.
pub fn format_deadline_display(deadline: OffsetDateTime, offset: UtcOffset) -> String {
    let fmt = format_description!("[day] [month repr:short] [year], [hour]:[minute]");
    deadline.to_offset(offset)
        .format(fmt)
        .unwrap_or_default()
}
