use std::iter::repeat;
use std::path::{Path, PathBuf};

use crate::error::ScheduleError;

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

/// Unwraps a required payload field.
#[inline]
pub fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ScheduleError> {
    value.ok_or(ScheduleError::MissingField(field))
}

/// Unwraps a required text field. Blank text counts as missing.
pub fn required_text(value: Option<String>, field: &'static str) -> Result<String, ScheduleError> {
    let text = required(value, field)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ScheduleError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
