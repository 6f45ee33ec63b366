use crate::rename::{ExecutionReport, PlanStatus, RenameMapping};
use crate::tags::{TagCatalog, TagUsage};
use crate::undo::{UndoReport, UndoStatus};
use std::io::{self, Write};

/// Display the planned renames without touching anything
pub fn display_dry_run(mapping: &RenameMapping, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "========================================")?;
    writeln!(writer, "              DRY RUN")?;
    writeln!(writer, "========================================")?;
    writeln!(writer)?;
    writeln!(writer, "Project:    {}", mapping.project)?;
    writeln!(writer, "Naming:     {}", mapping.mode.description())?;
    writeln!(writer, "Operations: {}", mapping.len())?;
    writeln!(writer)?;

    if mapping.is_empty() {
        writeln!(writer, "No files to rename.")?;
        return Ok(());
    }

    writeln!(writer, "Planned changes:")?;
    writeln!(writer)?;

    for entry in &mapping.entries {
        writeln!(writer, "  {}. {}", entry.position + 1, entry.old_name())?;
        match &entry.status {
            PlanStatus::Ready => writeln!(writer, "     To:   {}", entry.new_name())?,
            PlanStatus::Unchanged => writeln!(writer, "     [=] Already named correctly")?,
            PlanStatus::Unresolved { reason } => writeln!(writer, "     [!] {}", reason)?,
        }
        if entry.old_path.parent() != entry.new_path.parent() {
            if let Some(dir) = entry.new_path.parent() {
                writeln!(writer, "     Into: {}", dir.display())?;
            }
        }
        writeln!(writer)?;
    }

    let unchanged = mapping.unchanged_count();
    let unresolved = mapping.unresolved_count();

    writeln!(writer, "----------------------------------------")?;
    writeln!(writer, "Summary:")?;
    writeln!(
        writer,
        "  {} files would be renamed",
        mapping.len() - unchanged - unresolved
    )?;
    if unchanged > 0 {
        writeln!(writer, "  {} files already have their name", unchanged)?;
    }
    if unresolved > 0 {
        writeln!(writer, "  {} files have no free name and would be skipped", unresolved)?;
    }

    writeln!(writer)?;
    writeln!(writer, "Run without --dry to apply these changes.")?;

    Ok(())
}

/// Display the outcome of an execution
pub fn display_execution_result(
    report: &ExecutionReport,
    writer: &mut impl Write,
) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "Successfully renamed {} files.", report.succeeded)?;

    if report.failed > 0 {
        writeln!(writer, "  {} renames failed:", report.failed)?;
        for failure in &report.failures {
            writeln!(writer, "    - {}", failure)?;
        }
    }

    if report.cancelled {
        writeln!(writer, "  Cancelled; {} files were not attempted.", report.skipped)?;
    }

    Ok(())
}

/// Display the outcome of an undo
pub fn display_undo_result(report: &UndoReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "Restored {} files.", report.reverted_count())?;

    let missing = report.missing_count();
    if missing > 0 {
        writeln!(writer, "  {} renamed files no longer exist and were skipped.", missing)?;
    }

    if report.failed_count() > 0 {
        writeln!(writer, "  {} files could not be restored:", report.failed_count())?;
        for outcome in &report.outcomes {
            if let UndoStatus::Failed { error } = &outcome.status {
                writeln!(
                    writer,
                    "    - {} -> {}: {}",
                    outcome.entry.new_path.display(),
                    outcome.entry.original_path.display(),
                    error
                )?;
            }
        }
    }

    Ok(())
}

/// List known tags, most used first
pub fn display_tags(
    catalog: &TagCatalog,
    usage: &TagUsage,
    language: &str,
    writer: &mut impl Write,
) -> io::Result<()> {
    let mut codes: Vec<&str> = catalog.codes().collect();
    codes.sort_by(|a, b| usage.count(b).cmp(&usage.count(a)).then_with(|| a.cmp(b)));

    let width = codes.iter().map(|c| c.len()).max().unwrap_or(0);

    for code in codes {
        let description = catalog.description(code, language).unwrap_or("");
        let count = usage.count(code);
        if count > 0 {
            writeln!(writer, "{:<width$}  {} ({})", code, description, count, width = width)?;
        } else {
            writeln!(writer, "{:<width$}  {}", code, description, width = width)?;
        }
    }

    Ok(())
}
