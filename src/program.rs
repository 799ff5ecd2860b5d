//! Loading programs from disk and analyzing batches of files
//!
//! A program is read completely and classified before the state machine
//! runs. Files in a batch are independent: each gets its own machine, and
//! one unreadable file does not affect the others.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::dialect::{detect_modeline_power_mode, PowerMode};
use crate::error::{Error, Result};
use crate::machine::{build_layer_trace_with, LayerTrace, MachineOptions, PathBuilder, Toolpath};
use crate::parser::{classify_text, ParsedLine};
use crate::summary::{summarize, FileReport, FileSummary};

/// A classified G-code program
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// File name without directories, used in summaries
    pub name: String,
    pub path: Option<PathBuf>,
    pub lines: Vec<ParsedLine>,
}

impl Program {
    /// Classify in-memory program text
    pub fn from_source(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            path: None,
            lines: classify_text(text),
        }
    }

    /// Read and classify a file
    ///
    /// Invalid UTF-8 is replaced rather than rejected; G-code is ASCII and
    /// stray bytes usually sit in comments.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_bytes(path, &bytes))
    }

    /// Async variant of [`Program::load`]
    pub async fn load_async(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::io(path, e))?;
        Ok(Self::from_bytes(path, &bytes))
    }

    fn from_bytes(path: &Path, bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::info!("Loaded {} ({} bytes)", path.display(), bytes.len());

        Self {
            name,
            path: Some(path.to_path_buf()),
            lines: classify_text(&text),
        }
    }

    pub fn modeline_power_mode(&self) -> Option<PowerMode> {
        detect_modeline_power_mode(&self.lines)
    }

    pub fn toolpath(&self, options: MachineOptions) -> Toolpath {
        PathBuilder::new(options).build(&self.lines)
    }

    pub fn layer_trace(&self, options: MachineOptions) -> LayerTrace {
        build_layer_trace_with(&self.lines, options)
    }

    pub fn summary(&self) -> FileSummary {
        summarize(&self.name, &self.lines)
    }

    /// Metrics mode: summary, thermal overview and layer records
    pub fn report(&self, options: MachineOptions) -> FileReport {
        FileReport::new(self.summary(), self.layer_trace(options))
    }
}

/// Outcome of analyzing one file of a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<FileReport>,
}

/// Analyze several files concurrently
///
/// Results are returned in the order of `paths`.
pub async fn analyze_files(paths: &[PathBuf], config: &Config) -> Vec<FileOutcome> {
    let config = Arc::new(config.clone());

    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| {
            let config = Arc::clone(&config);
            tokio::spawn(async move {
                let program = Program::load_async(&path).await?;
                let options = config.machine_options(&program.lines);
                Ok::<_, Error>(program.report(options))
            })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (path, handle) in paths.iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::Join(e)),
        };
        if let Err(e) = &result {
            log::warn!("Skipping {}: {}", path.display(), e);
        }
        outcomes.push(FileOutcome {
            path: path.clone(),
            result,
        });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source() {
        let program = Program::from_source("inline.nc", "G1 X1\nG1 X2\n");

        assert_eq!(program.name, "inline.nc");
        assert_eq!(program.lines.len(), 2);
        assert_eq!(program.path, None);
    }

    #[test]
    fn test_load_uses_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("square.nc");
        std::fs::write(&path, "S100\nG1 X10 F500\nG1 Y10\n").expect("write");

        let program = Program::load(&path).expect("load");
        assert_eq!(program.name, "square.nc");
        assert_eq!(program.summary().max_power, 100.0);
        assert_eq!(program.summary().max_feed_rate, 500.0);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Program::load(dir.path().join("missing.nc")).expect_err("should fail");
        assert!(err.is_io());
    }

    #[test]
    fn test_load_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("latin1.nc");
        std::fs::write(&path, b"; caf\xe9\nG1 X3\n").expect("write");

        let program = Program::load(&path).expect("load");
        let toolpath = program.toolpath(MachineOptions::default());
        assert_eq!(toolpath.segments.len(), 1);
    }
}
