use chrono::{DateTime, Local};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::RenameConfig;
use crate::fs::FileSystem;
use crate::item::RenameItem;
use crate::validator::{validate_batch, ValidationError};

use super::collision::ensure_unique;
use super::name_builder::{
    build_name, build_pa_mat_base, build_pa_mat_name, build_position_base, build_position_name,
    format_batch_date,
};
use super::types::{MappingEntry, PlanOptions, PlanStatus, RenameMapping, RenameMode};

/// Compute a collision-free target path for every item, in the given order.
///
/// Nothing on disk is modified. Validation failures are returned before
/// any name is built.
pub fn build_mapping(
    project: &str,
    items: &[RenameItem],
    config: &RenameConfig,
    options: &PlanOptions,
    fs: &dyn FileSystem,
) -> Result<RenameMapping, ValidationError> {
    build_mapping_at(project, items, config, options, fs, &Local::now())
}

/// [`build_mapping`] with a fixed clock
pub fn build_mapping_at(
    project: &str,
    items: &[RenameItem],
    config: &RenameConfig,
    options: &PlanOptions,
    fs: &dyn FileSystem,
    now: &DateTime<Local>,
) -> Result<RenameMapping, ValidationError> {
    validate_batch(project, items, config, options, fs)?;

    let project = project.trim();
    let batch_date = format_batch_date(now, config);

    info!(
        project = %project,
        mode = ?options.mode,
        date = %batch_date,
        "Planning {} renames",
        items.len()
    );

    let names: Vec<String> = match options.mode {
        RenameMode::Normal => items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                build_name(
                    project,
                    Some(config.start_index.saturating_add(position)),
                    &item.sorted_tags(),
                    config,
                    item,
                    &batch_date,
                )
            })
            .collect(),
        RenameMode::Position => grouped_names(
            items,
            config,
            |item| build_position_base(project, item, config),
            |base, index, item| build_position_name(base, index, item, config),
        ),
        RenameMode::PaMat => grouped_names(
            items,
            config,
            |item| build_pa_mat_base(project, item, &batch_date, config),
            |base, index, item| build_pa_mat_name(base, index, item, config),
        ),
    };

    let mut claimed: HashSet<PathBuf> = HashSet::with_capacity(items.len());
    let mut entries = Vec::with_capacity(items.len());

    for (position, (item, name)) in items.iter().zip(names).enumerate() {
        let candidate = target_dir(item, options).join(&name);

        let entry = match ensure_unique(
            &candidate,
            &item.original_path,
            &claimed,
            &config.separator,
            fs,
        ) {
            Ok(new_path) => {
                claimed.insert(fs.absolute(&new_path));
                let status = if fs.same_location(&new_path, &item.original_path) {
                    PlanStatus::Unchanged
                } else {
                    PlanStatus::Ready
                };
                debug!(item = %item.id, from = ?item.original_path, to = ?new_path, "Planned");
                MappingEntry {
                    item: item.id,
                    position,
                    old_path: item.original_path.clone(),
                    new_path,
                    status,
                }
            }
            Err(e) => {
                warn!(item = %item.id, "Could not resolve a free name: {}", e);
                MappingEntry {
                    item: item.id,
                    position,
                    old_path: item.original_path.clone(),
                    new_path: candidate,
                    status: PlanStatus::Unresolved {
                        reason: e.to_string(),
                    },
                }
            }
        };
        entries.push(entry);
    }

    let mapping = RenameMapping {
        project: project.to_string(),
        mode: options.mode,
        entries,
    };

    info!(
        planned = mapping.len(),
        unchanged = mapping.unchanged_count(),
        unresolved = mapping.unresolved_count(),
        "Planning complete"
    );

    Ok(mapping)
}

fn target_dir(item: &RenameItem, options: &PlanOptions) -> PathBuf {
    match &options.dest_dir {
        Some(dir) => dir.clone(),
        None => item
            .original_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

/// Names for the modes that only number items sharing a base name.
/// Each group counts from `start_index`; output order follows `items`.
fn grouped_names<B, N>(
    items: &[RenameItem],
    config: &RenameConfig,
    base_of: B,
    name_of: N,
) -> Vec<String>
where
    B: Fn(&RenameItem) -> String,
    N: Fn(&str, Option<usize>, &RenameItem) -> String,
{
    let bases: Vec<String> = items.iter().map(&base_of).collect();

    let mut sizes: HashMap<&str, usize> = HashMap::new();
    for base in &bases {
        *sizes.entry(base.as_str()).or_default() += 1;
    }

    let mut counters: HashMap<&str, usize> = HashMap::new();
    items
        .iter()
        .zip(&bases)
        .map(|(item, base)| {
            let index = if sizes[base.as_str()] > 1 {
                let next = counters.entry(base.as_str()).or_insert(config.start_index);
                let current = *next;
                *next = next.saturating_add(1);
                Some(current)
            } else {
                None
            };
            name_of(base, index, item)
        })
        .collect()
}
