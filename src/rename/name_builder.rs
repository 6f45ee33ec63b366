use chrono::{DateTime, Local};
use std::fmt::Write;
use std::path::Path;
use tracing::warn;

use crate::config::{RenameConfig, DEFAULT_DATE_FORMAT};
use crate::item::RenameItem;

/// Marker inserted after the project id in position mode
const POSITION_MARKER: &str = "pos";
/// Marker inserted after the project id in PA_MAT mode
const PA_MAT_MARKER: &str = "PA_MAT";

/// Format the date stamp shared by every item of a planning pass
pub fn format_batch_date(now: &DateTime<Local>, config: &RenameConfig) -> String {
    let mut out = String::new();
    if write!(out, "{}", now.format(&config.date_format)).is_err() {
        warn!(
            "Date format {:?} could not be rendered, using {:?}",
            config.date_format, DEFAULT_DATE_FORMAT
        );
        out.clear();
        let _ = write!(out, "{}", now.format(DEFAULT_DATE_FORMAT));
    }
    out
}

/// The item's own date when it is well formed, else the batch date
pub fn date_token<'a>(item: &'a RenameItem, batch_date: &'a str) -> &'a str {
    item.valid_explicit_date().unwrap_or(batch_date)
}

/// Zero-padded sequence number; padding is a minimum width
pub fn format_index(index: usize, padding: usize) -> String {
    format!("{:0width$}", index, width = padding)
}

/// Extension of `path` with its leading dot, case preserved
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// `project + tags + date`, joined by the separator
pub fn build_base_name(
    project: &str,
    ordered_tags: &[String],
    date: &str,
    config: &RenameConfig,
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(ordered_tags.len() + 2);
    parts.push(sanitize_filename(project));
    parts.extend(ordered_tags.iter().map(|tag| sanitize_filename(tag)));
    parts.push(sanitize_filename(date));
    parts.join(&config.separator)
}

/// Build the full file name for normal mode.
///
/// `ordered_tags` must already be sorted. `index` is `None` when no sequence
/// number should be appended.
pub fn build_name(
    project: &str,
    index: Option<usize>,
    ordered_tags: &[String],
    config: &RenameConfig,
    item: &RenameItem,
    batch_date: &str,
) -> String {
    let date = date_token(item, batch_date);
    let mut name = build_base_name(project, ordered_tags, date, config);

    if !item.suffix.is_empty() {
        name.push_str(&config.separator);
        name.push_str(&sanitize_filename(&item.suffix));
    }

    if let Some(index) = index {
        name.push_str(&config.separator);
        name.push_str(&format_index(index, config.index_padding));
    }

    name.push_str(&extension_of(&item.original_path));
    name
}

/// Grouping key for position mode: `project_pos[_suffix]`
pub fn build_position_base(project: &str, item: &RenameItem, config: &RenameConfig) -> String {
    let mut base = format!(
        "{}{}{}",
        sanitize_filename(project),
        config.separator,
        POSITION_MARKER
    );
    if !item.suffix.is_empty() {
        base.push_str(&config.separator);
        base.push_str(&sanitize_filename(&item.suffix));
    }
    base
}

pub fn build_position_name(
    base: &str,
    index: Option<usize>,
    item: &RenameItem,
    config: &RenameConfig,
) -> String {
    let mut name = base.to_string();
    if let Some(index) = index {
        name.push_str(&config.separator);
        name.push_str(&format_index(index, config.index_padding));
    }
    name.push_str(&extension_of(&item.original_path));
    name
}

/// Grouping key for PA_MAT mode: `project_PA_MAT<key>` where the key is the
/// item's PA_MAT value or, when empty, its date token
///
/// An item without its own date falls back to the batch date here too.
pub fn build_pa_mat_base(
    project: &str,
    item: &RenameItem,
    batch_date: &str,
    config: &RenameConfig,
) -> String {
    let key = if item.pa_mat.is_empty() {
        date_token(item, batch_date)
    } else {
        item.pa_mat.as_str()
    };

    format!(
        "{}{}{}{}",
        sanitize_filename(project),
        config.separator,
        PA_MAT_MARKER,
        sanitize_filename(key)
    )
}

pub fn build_pa_mat_name(
    base: &str,
    index: Option<usize>,
    item: &RenameItem,
    config: &RenameConfig,
) -> String {
    let mut name = base.to_string();
    if let Some(index) = index {
        name.push_str(&config.separator);
        name.push_str(&format_index(index, config.index_padding));
    }
    if !item.suffix.is_empty() {
        name.push_str(&config.separator);
        name.push_str(&sanitize_filename(&item.suffix));
    }
    name.push_str(&extension_of(&item.original_path));
    name
}

/// Replace characters that are invalid in file names
fn sanitize_filename(name: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    name.chars()
        .map(|c| {
            if invalid_chars.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}
