//! Field splitting on the protocol delimiter.
//!
//! Splitting is purely positional: empty fields are preserved and no escaping
//! exists at this layer. Fields that may legitimately contain the delimiter
//! are recovered with [`split_bounded`], which leaves the remainder of the
//! line intact in its final field.

/// Field delimiter shared by requests and results.
pub const DELIMITER: char = '|';

/// Splits a line into all of its fields.
///
/// # Example
///
/// ```
/// let fields: Vec<&str> = tablekit::fields::split("table|0.1||update").collect();
/// assert_eq!(fields, ["table", "0.1", "", "update"]);
/// ```
pub fn split(line: &str) -> impl Iterator<Item = &str> {
    line.split(DELIMITER)
}

/// Splits a line into at most `max_fields` fields.
///
/// The last field holds the unsplit remainder of the line, delimiters
/// included.
///
/// # Example
///
/// ```
/// let fields: Vec<&str> = tablekit::fields::split_bounded("a|b|c|d", 3).collect();
/// assert_eq!(fields, ["a", "b", "c|d"]);
/// ```
pub fn split_bounded(line: &str, max_fields: usize) -> impl Iterator<Item = &str> {
    line.splitn(max_fields, DELIMITER)
}

/// Counts the fields on a line without allocating.
#[must_use]
pub fn count(line: &str) -> usize {
    line.matches(DELIMITER).count() + 1
}
