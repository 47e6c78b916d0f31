//! Per-function call counting and timing.
//!
//! Open calls are tracked per thread and per function name, as a stack, so nested and concurrent
//! calls to the same function each get their own timing window. Aggregated statistics are keyed
//! by function name only.

use std::{
    fmt::{self, Write},
    thread::{self, ThreadId},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Wall-clock time spent between a matching enter/leave pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed(Duration);

impl Elapsed {
    /// The elapsed time as a [`Duration`].
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Whole hours.
    pub fn hours(&self) -> u64 {
        self.0.as_secs() / 3600
    }

    /// Whole minutes past the last full hour.
    pub fn minutes(&self) -> u64 {
        self.0.as_secs() % 3600 / 60
    }

    /// Whole seconds past the last full minute.
    pub fn seconds(&self) -> u64 {
        self.0.as_secs() % 60
    }

    /// Fractional milliseconds past the last full second.
    pub fn millis(&self) -> f64 {
        f64::from(self.0.subsec_micros()) / 1000.0
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}h {}m {}s {:.3}ms",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.millis()
        )
    }
}

/// Aggregated statistics of one tracked function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallStats {
    /// Completed enter/leave pairs.
    pub calls: u64,

    /// Sum of the elapsed time of all completed calls.
    pub total: Duration,

    /// Error-level records emitted from the function.
    pub errors: u64,
}

impl CallStats {
    /// Mean elapsed time per completed call, zero if no call completed.
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total.as_nanos() / u128::from(self.calls);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

#[derive(Debug, Default)]
struct Table {
    open: FxHashMap<(ThreadId, &'static str), Vec<Instant>>,
    stats: FxHashMap<&'static str, CallStats>,
}

/// The call-timing table, guarded by one lock.
#[derive(Debug, Default)]
pub(crate) struct CallTimer {
    table: Mutex<Table>,
}

impl CallTimer {
    /// Starts a timing window for `function` on the current thread.
    pub(crate) fn enter(&self, function: &'static str) {
        let key = (thread::current().id(), function);
        let mut table = self.table.lock();
        table.stats.entry(function).or_default();
        table.open.entry(key).or_default().push(Instant::now());
    }

    /// Closes the innermost open window for `function` on the current thread.
    ///
    /// Returns `None` if no window is open.
    pub(crate) fn leave(&self, function: &'static str) -> Option<Elapsed> {
        let key = (thread::current().id(), function);
        let mut table = self.table.lock();

        let windows = table.open.get_mut(&key)?;
        let started = windows.pop()?;
        if windows.is_empty() {
            table.open.remove(&key);
        }

        let elapsed = started.elapsed();
        let stats = table.stats.entry(function).or_default();
        stats.calls += 1;
        stats.total += elapsed;
        Some(Elapsed(elapsed))
    }

    /// Counts an error against `function`, if it has ever been entered.
    pub(crate) fn record_error(&self, function: &str) {
        if let Some(stats) = self.table.lock().stats.get_mut(function) {
            stats.errors += 1;
        }
    }

    pub(crate) fn stats(&self, function: &str) -> Option<CallStats> {
        self.table.lock().stats.get(function).copied()
    }

    /// Formats a table of all tracked functions, or only of `filter` if given.
    pub(crate) fn report(&self, filter: Option<&str>) -> String {
        let mut rows: Vec<(&'static str, CallStats)> = self
            .table
            .lock()
            .stats
            .iter()
            .filter(|(name, _)| filter.map_or(true, |wanted| wanted == **name))
            .map(|(name, stats)| (*name, *stats))
            .collect();
        rows.sort_unstable_by_key(|(name, _)| *name);

        if rows.is_empty() {
            return match filter {
                Some(name) => format!("no call statistics recorded for `{name}`"),
                None => "no call statistics recorded".to_string(),
            };
        }

        let mut report = format!(
            "{:<32} {:>10} {:>16} {:>8}",
            "function", "calls", "average", "errors"
        );
        for (name, stats) in rows {
            let average_ms = stats.average().as_secs_f64() * 1000.0;
            let _ = write!(
                report,
                "\n{name:<32} {:>10} {:>14.3}ms {:>8}",
                stats.calls, average_ms, stats.errors
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn elapsed_is_decomposed_into_units() {
        let elapsed = Elapsed(Duration::from_millis(3_723_456) + Duration::from_micros(789));
        assert_eq!(elapsed.hours(), 1);
        assert_eq!(elapsed.minutes(), 2);
        assert_eq!(elapsed.seconds(), 3);
        assert!((elapsed.millis() - 456.789).abs() < 1e-9);
        assert_eq!(elapsed.to_string(), "1h 2m 3s 456.789ms");
    }

    #[test]
    fn leave_without_enter_is_not_found() {
        let timer = CallTimer::default();
        assert_eq!(timer.leave("never_entered"), None);
        assert_eq!(timer.stats("never_entered"), None);
    }

    #[test]
    fn measures_a_sleeping_call() {
        let timer = CallTimer::default();
        timer.enter("sleepy");
        std::thread::sleep(Duration::from_millis(100));
        let elapsed = timer.leave("sleepy").expect("window should be open");

        let millis = elapsed.as_duration().as_millis();
        assert!((90..=200).contains(&millis), "elapsed {millis}ms");
        let stats = timer.stats("sleepy").expect("stats should exist");
        assert_eq!(stats.calls, 1);
        assert_eq!(stats.total, elapsed.as_duration());
        assert_eq!(timer.leave("sleepy"), None);
    }

    #[test]
    fn nested_calls_to_the_same_function_are_timed_independently() {
        let timer = CallTimer::default();
        timer.enter("recursive");
        std::thread::sleep(Duration::from_millis(20));
        timer.enter("recursive");
        let inner = timer.leave("recursive").expect("inner window should be open");
        let outer = timer.leave("recursive").expect("outer window should be open");

        assert!(outer > inner);
        assert_eq!(timer.stats("recursive").map(|stats| stats.calls), Some(2));
    }

    #[test]
    fn concurrent_threads_do_not_share_windows() {
        let timer = Arc::new(CallTimer::default());
        timer.enter("worker");

        let other = Arc::clone(&timer);
        let from_other_thread = std::thread::spawn(move || other.leave("worker"))
            .join()
            .expect("thread should not panic");
        assert_eq!(from_other_thread, None);
        assert!(timer.leave("worker").is_some());
    }

    #[test]
    fn errors_are_counted_for_entered_functions_only() {
        let timer = CallTimer::default();
        timer.record_error("unknown");
        assert_eq!(timer.stats("unknown"), None);

        timer.enter("handler");
        timer.record_error("handler");
        timer.record_error("handler");
        timer.leave("handler");
        assert_eq!(timer.stats("handler").map(|stats| stats.errors), Some(2));
    }

    #[test]
    fn report_lists_tracked_functions() {
        let timer = CallTimer::default();
        for name in ["beta", "alpha"] {
            timer.enter(name);
            timer.leave(name);
        }
        timer.record_error("beta");

        let report = timer.report(None);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.first().is_some_and(|line| line.starts_with("function")));
        assert!(lines.get(1).is_some_and(|line| line.starts_with("alpha")));
        assert!(lines
            .get(2)
            .is_some_and(|line| line.starts_with("beta") && line.ends_with(" 1")));

        assert_eq!(timer.report(Some("alpha")).lines().count(), 2);
        assert_eq!(
            timer.report(Some("gamma")),
            "no call statistics recorded for `gamma`"
        );
    }
}
