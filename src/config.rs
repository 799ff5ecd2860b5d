//! Configuration management for the G-code tools.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project (`.gcode-tools.toml`) and user config files
//! - Power mode selection: CLI > file modeline > project > user > default

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::dialect::{detect_modeline_power_mode, PowerMode};
use crate::error::{Error, Result};
use crate::geometry::DEFAULT_ARC_TOLERANCE;
use crate::machine::MachineOptions;
use crate::parser::ParsedLine;

/// Name of the per-project config file, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".gcode-tools.toml";

/// Points per tessellated arc when nothing else is configured
pub const DEFAULT_ARC_SAMPLES: usize = 100;

/// Command-line arguments for the G-code tools
#[derive(Debug, Parser)]
#[command(name = "gcode-tools")]
#[command(about = "Toolpath preview and summaries for laser/CNC G-code")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file to use instead of the project/user lookup
    #[arg(long, global = true, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    /// How inline S words on motion lines are applied
    #[arg(long, global = true, value_enum)]
    pub power_mode: Option<PowerMode>,

    /// Points per tessellated arc
    #[arg(long, global = true)]
    pub arc_samples: Option<usize>,

    /// Tolerance in mm for the arc radius check
    #[arg(long, global = true)]
    pub arc_tolerance: Option<f64>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Re-run whenever an input file changes
    #[arg(long, global = true)]
    pub watch: bool,

    /// Log level for the tools
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Reconstruct the toolpath of one file
    Preview {
        file: PathBuf,
        /// Emit tessellated polylines instead of analytic segments
        #[arg(long)]
        tessellate: bool,
    },
    /// Max speed and max power of each file
    Summary {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Temperature and fan speed per layer
    Layers { file: PathBuf },
}

impl Command {
    /// Files the command reads
    pub fn inputs(&self) -> Vec<PathBuf> {
        match self {
            Command::Preview { file, .. } | Command::Layers { file } => vec![file.clone()],
            Command::Summary { files } => files.clone(),
        }
    }
}

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings read from a TOML config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub power_mode: Option<PowerMode>,
    pub arc_samples: Option<usize>,
    pub arc_tolerance: Option<f64>,
}

impl FileConfig {
    /// Load a config file; a missing file is not an error
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(path, e)),
        };

        let config = toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config file: {}", path.display());
        Ok(Some(config))
    }

    /// Fill unset fields from a lower-priority config
    fn or(self, fallback: FileConfig) -> FileConfig {
        FileConfig {
            power_mode: self.power_mode.or(fallback.power_mode),
            arc_samples: self.arc_samples.or(fallback.arc_samples),
            arc_tolerance: self.arc_tolerance.or(fallback.arc_tolerance),
        }
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,
    /// Power mode explicitly set via command line
    pub cli_power_mode: Option<PowerMode>,
    /// Power mode from config files, or the built-in default
    pub default_power_mode: PowerMode,
    pub arc_samples: usize,
    pub arc_tolerance: f64,
    pub format: OutputFormat,
    pub watch: bool,
    pub log_level: String,
    /// Project config that was found, if any
    pub project_config_path: Option<PathBuf>,
}

/// Location of the per-user config file, if the platform has a config dir
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gcode-tools").join("config.toml"))
}

impl Config {
    /// Create configuration from the process arguments and working directory
    pub fn from_args_and_env() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        Self::from_args(Args::parse(), &cwd)
    }

    /// Create configuration from explicit arguments
    ///
    /// `project_dir` is searched for [`PROJECT_CONFIG_FILE`] unless
    /// `--config` names a file.
    pub fn from_args(args: Args, project_dir: &Path) -> Result<Self> {
        Self::from_args_with_user_config(args, project_dir, user_config_path().as_deref())
    }

    /// Like [`Config::from_args`], with the user config file given explicitly
    ///
    /// `None` skips the user config entirely.
    pub fn from_args_with_user_config(
        args: Args,
        project_dir: &Path,
        user_config: Option<&Path>,
    ) -> Result<Self> {
        let mut project_config_path = None;

        let file_config = match &args.config {
            // A file named on the command line must exist
            Some(path) => FileConfig::load(path)?.ok_or_else(|| {
                Error::io(
                    path,
                    io::Error::new(io::ErrorKind::NotFound, "config file not found"),
                )
            })?,
            None => {
                let project_path = project_dir.join(PROJECT_CONFIG_FILE);
                let project = FileConfig::load(&project_path)?;
                if project.is_some() {
                    project_config_path = Some(project_path);
                }

                let user = match user_config {
                    Some(path) => FileConfig::load(path)?,
                    None => None,
                };

                project.unwrap_or_default().or(user.unwrap_or_default())
            }
        };

        Ok(Config {
            command: args.command,
            cli_power_mode: args.power_mode,
            default_power_mode: file_config.power_mode.unwrap_or_default(),
            arc_samples: args
                .arc_samples
                .or(file_config.arc_samples)
                .unwrap_or(DEFAULT_ARC_SAMPLES)
                .max(2),
            arc_tolerance: args
                .arc_tolerance
                .or(file_config.arc_tolerance)
                .unwrap_or(DEFAULT_ARC_TOLERANCE)
                .abs(),
            format: args.format,
            watch: args.watch,
            log_level: args.log_level,
            project_config_path,
        })
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }

    /// The power mode for one program
    ///
    /// Priority: CLI > modeline in the file > config files > default.
    pub fn effective_power_mode(&self, lines: &[ParsedLine]) -> PowerMode {
        if let Some(mode) = self.cli_power_mode {
            return mode;
        }
        detect_modeline_power_mode(lines).unwrap_or(self.default_power_mode)
    }

    /// Machine options for one program
    pub fn machine_options(&self, lines: &[ParsedLine]) -> MachineOptions {
        MachineOptions {
            power_mode: self.effective_power_mode(lines),
            arc_tolerance: self.arc_tolerance,
        }
    }
}
