use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use tag_renamer::cli::Args;
use tag_renamer::config::{config_dir, load_config, AppConfig};
use tag_renamer::error::AppError;
use tag_renamer::fs::{absolute_path, StdFileSystem};
use tag_renamer::history::{read_history, write_history, write_undo_history};
use tag_renamer::item::{normalize_tag, WorkingSet};
use tag_renamer::logging;
use tag_renamer::output::{
    display_dry_run, display_execution_result, display_tags, display_undo_result,
};
use tag_renamer::progress::{should_use_colors, Progress};
use tag_renamer::rename::{build_mapping, spawn_execution, CancelFlag, PlanOptions};
use tag_renamer::scanner::collect_files;
use tag_renamer::tags::{extract_suffix_from_name, extract_tags_from_name, TagCatalog, TagUsage};
use tag_renamer::undo::UndoLog;

fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(args.verbose);

    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("\nError: {}", e.detailed_message());
        std::process::exit(e.exit_code().into());
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply_overrides(&mut config);

    let config_dir = config_dir();
    debug!(config_dir = ?config_dir, "Configuration loaded");

    let mut progress = Progress::new_with_ui(args.verbose > 0, should_use_colors());

    if args.list_tags {
        return list_tags(&args, &config, config_dir.as_deref());
    }

    if let Some(history_file) = &args.undo {
        info!("Undo mode: {:?}", history_file);
        return undo(history_file, args.no_history, &mut progress);
    }

    rename(&args, &config, config_dir.as_deref(), &mut progress)
}

fn list_tags(args: &Args, config: &AppConfig, config_dir: Option<&Path>) -> Result<(), AppError> {
    let catalog = TagCatalog::load(args.tags_file.as_deref(), config, config_dir)?;
    let usage = TagUsage::load(&usage_path(config, config_dir));

    display_tags(&catalog, &usage, &config.language, &mut std::io::stdout())
        .map_err(|e| AppError::Other(format!("Failed to display output: {}", e)))
}

fn undo(history_file: &Path, no_history: bool, progress: &mut Progress) -> Result<(), AppError> {
    if !history_file.exists() {
        return Err(AppError::PathNotFound {
            path: history_file.to_path_buf(),
        });
    }

    let history = read_history(history_file).map_err(|e| AppError::HistoryError {
        path: Some(history_file.to_path_buf()),
        message: e.to_string(),
    })?;

    let mut log = UndoLog::from_history(&history);
    let timestamp = history.executed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    progress.undo_start(log.len(), &timestamp);

    let report = log.undo_all(&StdFileSystem);
    progress.undo_outcomes(&report.outcomes);

    if !no_history && report.reverted_count() > 0 {
        let dir = history_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        match write_undo_history(&report, &history.project, dir) {
            Ok(path) => progress.history_written(&path),
            Err(e) => progress.warn(&format!("Could not write undo history: {}", e)),
        }
    }

    display_undo_result(&report, &mut std::io::stdout())
        .map_err(|e| AppError::Other(format!("Failed to display output: {}", e)))?;

    if report.failed_count() > 0 {
        return Err(AppError::UndoIncomplete {
            failed: report.failed_count(),
        });
    }

    Ok(())
}

fn rename(
    args: &Args,
    config: &AppConfig,
    config_dir: Option<&Path>,
    progress: &mut Progress,
) -> Result<(), AppError> {
    // Step 1: Collect files
    let files = collect_files(&args.paths, config)?;
    progress.scan_complete(files.len());

    let catalog = TagCatalog::load(args.tags_file.as_deref(), config, config_dir)?;

    // Step 2: Build the working set
    let tags: Vec<String> = args.tags.iter().map(|t| normalize_tag(t)).collect();
    for tag in tags.iter().filter(|t| !catalog.contains(t)) {
        progress.warn(&format!("Unknown tag code: {}", tag));
    }

    if let Some(date) = &args.date {
        if date.len() != 6 || !date.bytes().all(|b| b.is_ascii_digit()) {
            progress.warn(&format!("Ignoring date {:?}, expected six digits", date));
        }
    }

    let mut working_set = WorkingSet::new();
    for path in files {
        working_set.add_path(absolute_path(&path));
    }

    for item in working_set.items_mut() {
        let name = item.file_name();

        if !tags.is_empty() {
            item.tags.extend(tags.iter().cloned());
        } else if args.detect {
            item.tags.extend(extract_tags_from_name(&name, &catalog));
        }

        if let Some(suffix) = &args.suffix {
            item.suffix = suffix.clone();
        } else if args.detect {
            item.suffix = extract_suffix_from_name(&name, &catalog, args.mode);
        }

        if let Some(date) = &args.date {
            item.explicit_date = Some(date.clone());
        }
        if let Some(pa_mat) = &args.pa_mat {
            item.pa_mat = pa_mat.clone();
        }

        debug!(
            item = %item.id,
            name = %name,
            tags = ?item.sorted_tags(),
            suffix = %item.suffix,
            "Prepared item"
        );
    }

    // Step 3: Plan
    let options = PlanOptions {
        mode: args.mode,
        dest_dir: args.dest_dir.clone(),
    };
    let project = args.project.as_deref().unwrap_or("");
    let mapping = build_mapping(
        project,
        working_set.items(),
        &config.rename,
        &options,
        &StdFileSystem,
    )?;

    if args.dry {
        return display_dry_run(&mapping, &mut std::io::stdout())
            .map_err(|e| AppError::Other(format!("Failed to display output: {}", e)));
    }

    // Step 4: Execute
    let history_dir = history_dir(args, mapping.entries.first().map(|e| e.old_path.as_path()));
    let handle = spawn_execution(
        mapping.clone(),
        working_set.items().to_vec(),
        UndoLog::new(),
        StdFileSystem,
        CancelFlag::new(),
    );

    for event in handle.events().iter() {
        progress.execution_event(&event);
    }

    let result = handle.join().map_err(|e| AppError::Other(e.to_string()))?;
    let report = result.report;

    // Step 5: Persist history and tag usage
    if !args.no_history && result.undo_log.has_history() {
        if let Some(dir) = history_dir {
            match write_history(&result.undo_log, &mapping.project, &dir) {
                Ok(path) => progress.history_written(&path),
                Err(e) => progress.warn(&format!("Could not write history: {}", e)),
            }
        }
    }

    if report.succeeded > 0 {
        let mut usage = TagUsage::load(&usage_path(config, config_dir));
        for item in &result.items {
            if result.undo_log.entries().iter().any(|e| e.item == item.id) {
                usage.increment(&item.tags);
            }
        }
        if let Err(e) = usage.save() {
            warn!("Could not save tag usage: {}", e);
        }
    }

    display_execution_result(&report, &mut std::io::stdout())
        .map_err(|e| AppError::Other(format!("Failed to display output: {}", e)))?;

    if report.failed > 0 {
        return Err(AppError::PartialFailure {
            failed: report.failed,
            total: report.total(),
        });
    }

    Ok(())
}

/// History goes next to the renamed files
fn history_dir(args: &Args, first_source: Option<&Path>) -> Option<PathBuf> {
    if let Some(dest) = &args.dest_dir {
        return Some(dest.clone());
    }
    first_source.and_then(Path::parent).map(Path::to_path_buf)
}

fn usage_path(config: &AppConfig, config_dir: Option<&Path>) -> PathBuf {
    match config_dir {
        Some(dir) => config.tag_usage_path(dir),
        None => config.tag_usage_file.clone(),
    }
}
