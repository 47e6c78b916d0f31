//! Message formatting helpers used by the logging macros, and timestamp rendering.

use std::fmt::{self, Write};

use time::{macros::format_description, OffsetDateTime};

use crate::LoggerError;

/// Separator placed between the arguments of the spread-style macros (`info!`, `warn!`, ...).
pub const DEFAULT_SEPARATOR: &str = " ";

/// Suffix appended to messages cut short by [`truncate`].
pub const TRUNCATION_MARKER: &str = "...";

/// Joins the [`Display`](fmt::Display) representation of every argument with
/// [`DEFAULT_SEPARATOR`]; no placeholder substitution is performed.
#[doc(hidden)]
pub fn spread(args: &[&dyn fmt::Display]) -> String {
    join(args.iter().copied(), DEFAULT_SEPARATOR)
}

/// Joins the [`Debug`](fmt::Debug) representation of every argument with single spaces.
///
/// Accepts any value implementing `Debug`, which makes it usable for values that have no
/// `Display` implementation.
#[doc(hidden)]
pub fn weak_join(args: &[&dyn fmt::Debug]) -> String {
    let mut out = String::new();
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{arg:?}");
    }
    out
}

fn join<'a>(args: impl Iterator<Item = &'a dyn fmt::Display>, separator: &str) -> String {
    let mut out = String::new();
    for (index, arg) in args.enumerate() {
        if index > 0 {
            out.push_str(separator);
        }
        let _ = write!(out, "{arg}");
    }
    out
}

/// Cuts `message` to at most `limit` bytes (on a character boundary) and appends
/// [`TRUNCATION_MARKER`] if anything was removed.
pub fn truncate(mut message: String, limit: usize) -> String {
    if message.len() <= limit {
        return message;
    }
    let mut end = limit;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message.truncate(end);
    message.push_str(TRUNCATION_MARKER);
    message
}

/// Current wall-clock time, in the local offset when it can be determined and UTC otherwise.
pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `YYYY-MM-DD HH:MM:SS.ffffff`, used in front of console lines.
pub(crate) fn console_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
    ))
    .unwrap_or_default()
}

/// `YYYY/MM/DD HH:MM:SS.ffffff`, the prefix the file formatter writes on every line.
pub(crate) fn file_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]/[month]/[day] [hour]:[minute]:[second].[subsecond digits:6]"
    ))
    .unwrap_or_default()
}

/// `YYYYMMDDHHMMSS`, the suffix of rotated backup files.
///
/// External tooling matches on this format; it must not change.
pub(crate) fn backup_suffix(at: OffsetDateTime) -> Result<String, LoggerError> {
    Ok(at.format(format_description!(
        "[year][month][day][hour][minute][second]"
    ))?)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn spread_joins_display_values() {
        assert_eq!(spread(&[&"user", &42, &true]), "user 42 true");
        assert_eq!(spread(&[&"{} is not a placeholder", &1]), "{} is not a placeholder 1");
        assert_eq!(spread(&[]), "");
    }

    #[test]
    fn weak_join_uses_debug_representations() {
        #[derive(Debug)]
        struct Point {
            x: i32,
        }
        assert_eq!(weak_join(&[&Point { x: 1 }, &Some(2)]), "Point { x: 1 } Some(2)");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short".to_string(), 16), "short");
        assert_eq!(
            truncate("this is a truncate message".to_string(), 9),
            "this is a..."
        );
        assert_eq!(truncate("héllo".to_string(), 2), "h...");
    }

    #[test]
    fn timestamps_have_the_expected_shapes() {
        let at = datetime!(2024-03-05 07:08:09.123456 UTC);
        assert_eq!(console_timestamp(at), "2024-03-05 07:08:09.123456");
        assert_eq!(file_timestamp(at), "2024/03/05 07:08:09.123456");
        assert_eq!(backup_suffix(at).ok().as_deref(), Some("20240305070809"));
    }
}
