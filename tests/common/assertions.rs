//! Domain-specific assertion macros for rvsnoop harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* record was misclassified and *what* the table looked
//! like at the time.

// ---------------------------------------------------------------------------
// Classification assertions
// ---------------------------------------------------------------------------

/// Assert that a table classifies a record to the type with the given name.
///
/// ```rust
/// assert_classified_as!(table, msg("APP.ERROR"), "Error");
/// ```
#[macro_export]
macro_rules! assert_classified_as {
    ($table:expr, $record:expr, $name:expr) => {{
        let table: &rvsnoop::ClassificationTable = &$table;
        let record = $record;
        let expected: &str = $name;
        let actual = table.classify(&record);
        if actual.name() != expected {
            panic!(
                "assert_classified_as! failed:\n  record:   {:?}\n  expected: {:?}\n  actual:   {:?}\n  types:    {:?}",
                rvsnoop::Record::send_subject(&record),
                expected,
                actual.name(),
                table
                    .all_types()
                    .iter()
                    .map(|t| t.name().to_string())
                    .collect::<Vec<_>>()
            );
        }
    }};
}

/// Assert the exact sequence of filter events recorded by an `EventLog`,
/// draining it.
///
/// ```rust
/// assert_events!(log, [FilterEvent::Constrained]);
/// ```
#[macro_export]
macro_rules! assert_events {
    ($log:expr, [$($event:expr),* $(,)?]) => {{
        let actual = $log.drain();
        let expected: Vec<rvsnoop::FilterEvent> = vec![$($event),*];
        pretty_assertions::assert_eq!(actual, expected, "filter events");
    }};
}

/// Assert that a `Result` failed with an error matching the pattern.
///
/// ```rust
/// assert_err_matches!(table.rename(id, ""), rvsnoop::Error::InvalidArgument { .. });
/// ```
#[macro_export]
macro_rules! assert_err_matches {
    ($result:expr, $pattern:pat) => {{
        match $result {
            Err($pattern) => {}
            Err(other) => panic!(
                "assert_err_matches! failed:\n  expected: {}\n  actual:   Err({:?})",
                stringify!($pattern),
                other
            ),
            Ok(value) => panic!(
                "assert_err_matches! failed:\n  expected: {}\n  actual:   Ok({:?})",
                stringify!($pattern),
                value
            ),
        }
    }};
}
