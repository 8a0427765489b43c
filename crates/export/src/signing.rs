use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

const DEFAULT_SIGNER: &str = "shortcuts";

/// Who may import a signed shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignMode {
    /// Leave the file unsigned
    #[default]
    Off,
    Anyone,
    PeopleWhoKnowMe,
}

impl SignMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Anyone => "anyone",
            Self::PeopleWhoKnowMe => "people-who-know-me",
        }
    }

    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignMode {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "off" | "none" | "false" => Ok(Self::Off),
            "anyone" => Ok(Self::Anyone),
            "people-who-know-me" => Ok(Self::PeopleWhoKnowMe),
            other => Err(format!(
                "unknown sign mode '{other}' (expected off|anyone|people-who-know-me)"
            )),
        }
    }
}

/// Runs the platform signing tool:
/// `shortcuts sign --mode <mode> --input <in> --output <out>`.
#[derive(Debug, Clone)]
pub struct Signer {
    program: PathBuf,
}

impl Default for Signer {
    fn default() -> Self {
        Self::with_program(DEFAULT_SIGNER)
    }
}

impl Signer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn sign(&self, input: &Path, output: &Path, mode: SignMode) -> Result<()> {
        if !mode.is_enabled() {
            return Err(ExportError::Signing("sign mode is off".to_string()));
        }
        log::debug!(
            "Signing {} -> {} (mode {mode})",
            input.display(),
            output.display()
        );
        let out = Command::new(&self.program)
            .arg("sign")
            .arg("--mode")
            .arg(mode.as_str())
            .arg("--input")
            .arg(input)
            .arg("--output")
            .arg(output)
            .output()
            .map_err(|err| {
                ExportError::Signing(format!("run {}: {err}", self.program.display()))
            })?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(ExportError::Signing(format!(
                "{} exited with {}: {}",
                self.program.display(),
                out.status,
                stderr.trim()
            )));
        }
        if !output.exists() {
            return Err(ExportError::Signing(format!(
                "{} reported success but wrote no file",
                self.program.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_modes_parse_loosely() {
        assert_eq!("anyone".parse::<SignMode>(), Ok(SignMode::Anyone));
        assert_eq!(
            "People_Who_Know_Me".parse::<SignMode>(),
            Ok(SignMode::PeopleWhoKnowMe)
        );
        assert_eq!("none".parse::<SignMode>(), Ok(SignMode::Off));
        assert!("everyone".parse::<SignMode>().is_err());
    }

    #[test]
    fn missing_signer_is_a_signing_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.shortcut");
        std::fs::write(&input, b"bplist00").unwrap();
        let signer = Signer::with_program(dir.path().join("no-such-signer"));
        let err = signer
            .sign(&input, &dir.path().join("out.shortcut"), SignMode::Anyone)
            .unwrap_err();
        assert!(matches!(err, ExportError::Signing(_)));
    }

    #[test]
    fn off_mode_never_runs_the_tool() {
        let signer = Signer::with_program("/definitely/not/here");
        let err = signer
            .sign(Path::new("a"), Path::new("b"), SignMode::Off)
            .unwrap_err();
        assert!(err.to_string().contains("off"));
    }
}
