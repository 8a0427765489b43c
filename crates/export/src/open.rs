use crate::error::{ExportError, Result};
use std::path::Path;
use std::process::Command;

const OPENER: &str = "open";

/// Hand `path` to the companion app through the platform opener.
pub fn open_in_companion(path: &Path) -> Result<()> {
    open_with(Path::new(OPENER), path)
}

pub fn open_with(program: &Path, path: &Path) -> Result<()> {
    let status = Command::new(program)
        .arg(path)
        .status()
        .map_err(|err| ExportError::Open(format!("run {}: {err}", program.display())))?;
    if !status.success() {
        return Err(ExportError::Open(format!(
            "{} {} exited with {status}",
            program.display(),
            path.display()
        )));
    }
    log::info!("Opened {}", path.display());
    Ok(())
}
