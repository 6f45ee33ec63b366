use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::rename::RenameMode;

use super::TagCatalog;

static TOKEN_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

static DATE_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").unwrap());

/// Longest run of tokens tried as one tag code (`CTR_AU`, `AU_DO`, ...)
const MAX_TAG_TOKENS: usize = 3;

/// Alphanumeric tokens of the file stem, empty ones dropped
fn tokens(name: &str) -> Vec<&str> {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    TOKEN_SPLIT_REGEX
        .split(stem)
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_numeric(token: &str) -> bool {
    token.bytes().all(|b| b.is_ascii_digit())
}

/// Known tag codes found in a file name, upper case.
///
/// Codes that contain underscores match runs of adjacent tokens; the
/// longest match wins.
pub fn extract_tags_from_name(name: &str, catalog: &TagCatalog) -> BTreeSet<String> {
    let tokens = tokens(name);
    let mut found = BTreeSet::new();
    let mut i = 0;

    while i < tokens.len() {
        let longest = (1..=MAX_TAG_TOKENS.min(tokens.len() - i))
            .rev()
            .map(|len| (len, tokens[i..i + len].join("_").to_uppercase()))
            .find(|(_, code)| catalog.contains(code));

        match longest {
            Some((len, code)) => {
                found.insert(code);
                i += len;
            }
            None => i += 1,
        }
    }

    debug!(name = %name, tags = ?found, "Extracted tags");
    found
}

/// The free-text suffix encoded in a file name built in `mode`
pub fn extract_suffix_from_name(name: &str, catalog: &TagCatalog, mode: RenameMode) -> String {
    let tokens = tokens(name);

    match mode {
        RenameMode::Position => tokens
            .iter()
            .rev()
            .find(|t| is_numeric(t))
            .map(|t| t.to_string())
            .unwrap_or_default(),
        RenameMode::PaMat => {
            let mut rest = after_date(&tokens);
            while rest.last().is_some_and(|t| is_numeric(t)) {
                rest = &rest[..rest.len() - 1];
            }
            rest.join("_")
        }
        RenameMode::Normal => {
            let mut rest = after_date(&tokens);
            while rest.first().is_some_and(|t| is_numeric(t)) {
                rest = &rest[1..];
            }
            while rest.last().is_some_and(|t| is_numeric(t)) {
                rest = &rest[..rest.len() - 1];
            }
            if rest.len() == 1 && catalog.contains(rest[0]) {
                return String::new();
            }
            rest.join("_")
        }
    }
}

/// Tokens after the first six-digit token, or nothing when there is none
fn after_date<'a>(tokens: &'a [&'a str]) -> &'a [&'a str] {
    match tokens.iter().position(|t| DATE_TOKEN_REGEX.is_match(t)) {
        Some(idx) => &tokens[idx + 1..],
        None => &[],
    }
}
