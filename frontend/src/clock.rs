use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use wasm_bindgen::JsValue;

// getTimezoneOffset is UTC minus local, in minutes.
fn from_js(date: &js_sys::Date) -> UtcOffset {
    let minutes = date.get_timezone_offset();
    UtcOffset::from_whole_seconds(-(minutes as i32) * 60).unwrap_or(UtcOffset::UTC)
}

/// The browser's offset in force at `instant`, which may differ from today's across DST.
pub fn offset_at(instant: OffsetDateTime) -> UtcOffset {
    let millis = (instant.unix_timestamp_nanos() / 1_000_000) as f64;
    from_js(&js_sys::Date::new(&JsValue::from_f64(millis)))
}

/// The browser's offset for a wall-clock time typed into a `datetime-local` input.
pub fn offset_for_local(local: PrimitiveDateTime) -> UtcOffset {
    let date = js_sys::Date::new_with_year_month_day_hr_min_sec(
        local.year().max(0) as u32,
        u8::from(local.month()) as i32 - 1,
        local.day() as i32,
        local.hour() as i32,
        local.minute() as i32,
        local.second() as i32,
    );
    from_js(&date)
}

pub fn time_left(deadline: OffsetDateTime, now: OffsetDateTime) -> Option<String> {
    let remaining = deadline - now;
    (remaining > Duration::ZERO).then(|| render_time(remaining))
}

fn render_time(d: Duration) -> String {
    if d.whole_days() > 0 {
        format!("{}d {}h", d.whole_days(), d.whole_hours() % 24)
    } else if d.whole_hours() > 0 {
        format!("{}h {}m", d.whole_hours(), d.whole_minutes() % 60)
    } else if d.whole_minutes() > 0 {
        format!("{}m", d.whole_minutes())
    } else {
        "under a minute".to_string()
    }
}
