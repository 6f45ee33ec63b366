use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::rename::RenameMode;

#[derive(Parser, Debug)]
#[command(name = "tag-renamer")]
#[command(author, version, about, long_about = None)]
#[command(about = "Tag photo and video files and rename them by project naming convention")]
pub struct Args {
    /// Files or directories to rename (directories are not entered recursively)
    #[arg(required_unless_present_any = ["undo", "list_tags"])]
    pub paths: Vec<PathBuf>,

    /// Project identifier placed at the start of every name
    #[arg(short, long)]
    pub project: Option<String>,

    /// Tag code applied to every file (repeatable)
    #[arg(short, long = "tag", value_name = "CODE")]
    pub tags: Vec<String>,

    /// Free-text suffix appended to every name
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// Explicit six-digit date used instead of today
    #[arg(long, value_name = "YYMMDD")]
    pub date: Option<String>,

    /// Naming scheme
    #[arg(short, long, value_enum, default_value_t = RenameMode::Normal)]
    pub mode: RenameMode,

    /// PA_MAT key used in pa-mat mode
    #[arg(long, value_name = "KEY")]
    pub pa_mat: Option<String>,

    /// Move renamed files into this directory
    #[arg(long, value_name = "DIR")]
    pub dest_dir: Option<PathBuf>,

    /// First sequence number
    #[arg(long)]
    pub start_index: Option<usize>,

    /// Minimum digits of the sequence number
    #[arg(long)]
    pub padding: Option<usize>,

    /// Token separator
    #[arg(long)]
    pub separator: Option<String>,

    /// strftime pattern of the date token
    #[arg(long)]
    pub date_format: Option<String>,

    /// Take tags and suffix from each file's current name when none are given
    #[arg(long)]
    pub detect: bool,

    /// Config file to use instead of the one in the config directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tag catalog to use instead of the configured one
    #[arg(long, value_name = "FILE")]
    pub tags_file: Option<PathBuf>,

    /// Simulate changes without modifying the filesystem
    #[arg(short, long)]
    pub dry: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Undo the renames recorded in a history file
    #[arg(short, long, value_name = "HISTORY_FILE", conflicts_with = "paths")]
    pub undo: Option<PathBuf>,

    /// Do not write a history file
    #[arg(long)]
    pub no_history: bool,

    /// List known tag codes, most used first
    #[arg(long)]
    pub list_tags: bool,
}

impl Args {
    /// Overlay naming flags on the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        let rename = &mut config.rename;
        if let Some(start_index) = self.start_index {
            rename.start_index = start_index;
        }
        if let Some(padding) = self.padding {
            rename.index_padding = padding;
        }
        if let Some(separator) = &self.separator {
            rename.separator = separator.clone();
        }
        if let Some(date_format) = &self.date_format {
            rename.date_format = date_format.clone();
        }
    }
}
