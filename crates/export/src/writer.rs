use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::open::open_in_companion;
use crate::signing::{SignMode, Signer};
use crate::stats::{ensure_parent, write_atomic};
use serde::Serialize;
use shortcut_model::{ContainerFormat, Shortcut};
use std::path::{Path, PathBuf};

const EXTENSION: &str = "shortcut";
const FALLBACK_NAME: &str = "Shortcut";
const MAX_NAME_CHARS: usize = 120;

/// What [`write_shortcut`] produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub format: ContainerFormat,
    pub bytes_written: u64,
    pub action_count: usize,
    pub sign_mode: SignMode,
    pub signed: bool,
    pub opened: bool,
    /// Non-fatal problems (signing fallback, opener failure)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// File-system-safe stem for `name`: path separators, control characters
/// and reserved punctuation become `_`, surrounding dots and spaces are
/// trimmed, and an empty result falls back to `Shortcut`.
pub fn sanitize_file_name(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_NAME_CHARS)
        .collect();
    let trimmed = mapped.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Target path for `shortcut` inside `dir`.
pub fn output_path(dir: &Path, shortcut: &Shortcut) -> PathBuf {
    dir.join(format!("{}.{EXTENSION}", sanitize_file_name(&shortcut.name)))
}

/// Validate references, encode, write, sign and open per `config`, using
/// the default signing tool.
pub fn write_shortcut(shortcut: &Shortcut, config: &ExportConfig) -> Result<ExportOutcome> {
    write_shortcut_with(shortcut, config, &Signer::default())
}

pub fn write_shortcut_with(
    shortcut: &Shortcut,
    config: &ExportConfig,
    signer: &Signer,
) -> Result<ExportOutcome> {
    shortcut.validate_references()?;
    let bytes = shortcut.encode(config.format)?;
    let path = output_path(&config.output_dir, shortcut);
    let mut warnings = Vec::new();

    let signed = if config.sign_mode.is_enabled() {
        sign_into(&path, &bytes, config.sign_mode, signer, &mut warnings)?
    } else {
        write_atomic(&path, &bytes)?;
        false
    };

    let bytes_written = std::fs::metadata(&path)
        .map(|meta| meta.len())
        .unwrap_or(bytes.len() as u64);
    log::info!(
        "Wrote {} ({} action(s), {}, {} bytes{})",
        path.display(),
        shortcut.actions.len(),
        config.format,
        bytes_written,
        if signed { ", signed" } else { "" }
    );

    let opened = if config.open_after_write {
        match open_in_companion(&path) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{err}");
                warnings.push(err.to_string());
                false
            }
        }
    } else {
        false
    };

    Ok(ExportOutcome {
        path,
        format: config.format,
        bytes_written,
        action_count: shortcut.actions.len(),
        sign_mode: config.sign_mode,
        signed,
        opened,
        warnings,
    })
}

/// Stage the unsigned bytes in a private directory beside `path`, sign
/// there, then rename the result over `path`. Falls back to the unsigned
/// file (with a warning) when signing fails.
fn sign_into(
    path: &Path,
    bytes: &[u8],
    mode: SignMode,
    signer: &Signer,
    warnings: &mut Vec<String>,
) -> Result<bool> {
    let parent = ensure_parent(path)?;
    let staging = tempfile::Builder::new()
        .prefix(".sign-")
        .tempdir_in(&parent)
        .map_err(|err| ExportError::io(&parent, err))?;
    let unsigned = staging.path().join(format!("unsigned.{EXTENSION}"));
    let signed = staging.path().join(format!("signed.{EXTENSION}"));
    std::fs::write(&unsigned, bytes).map_err(|err| ExportError::io(&unsigned, err))?;

    let (source, is_signed) = match signer.sign(&unsigned, &signed, mode) {
        Ok(()) => (signed, true),
        Err(err) => {
            log::warn!("{err}; keeping unsigned output");
            warnings.push(format!("{err}; wrote unsigned file instead"));
            (unsigned, false)
        }
    };
    std::fs::rename(&source, path).map_err(|err| ExportError::io(path, err))?;
    Ok(is_signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_are_sanitised() {
        assert_eq!(sanitize_file_name("Hello World"), "Hello World");
        assert_eq!(sanitize_file_name("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_file_name("  ..  "), "Shortcut");
        assert_eq!(sanitize_file_name("../escape"), "_escape");
        assert_eq!(sanitize_file_name("tab\there"), "tab_here");
        assert_eq!(sanitize_file_name(&"x".repeat(500)).chars().count(), 120);
    }

    #[test]
    fn output_path_appends_extension() {
        let shortcut = Shortcut::builder("Daily: Report").build();
        assert_eq!(
            output_path(Path::new("/out"), &shortcut),
            PathBuf::from("/out/Daily_ Report.shortcut")
        );
    }
}
