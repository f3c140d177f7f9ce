//! Small standalone helpers.

/// Sum of two integers.
#[must_use]
pub const fn add_two_numbers(a: i64, b: i64) -> i64 {
    a + b
}
