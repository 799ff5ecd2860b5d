use anyhow::{bail, Context, Result};

use crate::config::{Command, Config, OutputFormat};
use crate::output;
use crate::program::{analyze_files, Program};
use crate::watch::FileWatcher;

/// Run the command-line tool
pub async fn run() -> Result<()> {
    let config = Config::from_args_and_env().context("Failed to load configuration")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if let Some(path) = &config.project_config_path {
        log::info!("Using project config {}", path.display());
    }

    if !config.watch {
        let rendered = render(&config).await?;
        print!("{}", rendered);
        return Ok(());
    }

    watch(&config).await
}

/// Re-render every time one of the inputs changes
///
/// Failures are logged and the loop keeps going, so a half-written file does
/// not end the session.
async fn watch(config: &Config) -> Result<()> {
    let inputs = config.command.inputs();
    let mut watcher = FileWatcher::new(&inputs).context("Failed to start file watcher")?;

    loop {
        match render(config).await {
            Ok(rendered) => print!("{}", rendered),
            Err(e) => log::error!("{:#}", e),
        }

        if watcher.next_change().await.is_none() {
            log::info!("File watcher stopped");
            return Ok(());
        }
    }
}

/// Run the configured command and render its result
pub async fn render(config: &Config) -> Result<String> {
    match &config.command {
        Command::Preview { file, tessellate } => {
            let program = Program::load_async(file).await?;
            let toolpath = program.toolpath(config.machine_options(&program.lines));

            Ok(match (config.format, *tessellate) {
                (OutputFormat::Text, _) => output::preview_text(&program.name, &toolpath),
                (OutputFormat::Json, false) => json(&toolpath)?,
                (OutputFormat::Json, true) => json(&serde_json::json!({
                    "bounds": toolpath.bounds,
                    "polylines": toolpath.polylines(config.arc_samples),
                    "diagnostics": toolpath.diagnostics,
                }))?,
            })
        }
        Command::Summary { files } => {
            let outcomes = analyze_files(files, config).await;
            let rows = output::summary_rows(&outcomes);

            if rows.iter().all(|row| row.error.is_some()) {
                bail!("None of the {} input files could be analyzed", rows.len());
            }

            match config.format {
                OutputFormat::Text => Ok(output::summary_table(&rows)),
                OutputFormat::Json => json(&rows),
            }
        }
        Command::Layers { file } => {
            let program = Program::load_async(file).await?;
            let report = program.report(config.machine_options(&program.lines));

            match config.format {
                OutputFormat::Text => Ok(output::layers_text(&report)),
                OutputFormat::Json => json(&report),
            }
        }
    }
}

fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use clap::Parser;
    use std::fs;

    fn config_for(argv: &[&str], dir: &std::path::Path) -> Config {
        let mut full = vec!["gcode-tools"];
        full.extend_from_slice(argv);
        Config::from_args_with_user_config(Args::parse_from(full), dir, None).expect("config")
    }

    #[tokio::test]
    async fn test_render_layers_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("print.gcode");
        fs::write(&path, "M104 S200\nG1 Z0.2\nM106 S255\nG1 Z0.4\n").expect("write");

        let config = config_for(
            &["--format", "json", "layers", path.to_str().expect("utf-8 path")],
            dir.path(),
        );
        let rendered = render(&config).await.expect("render");
        let value: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");

        assert_eq!(value["layer_count"], 2);
        assert_eq!(value["layers"][0]["temperature"], 200.0);
        assert_eq!(value["layers"][1]["fan_speed"], 100.0);
    }

    #[tokio::test]
    async fn test_render_layers_missing_file_names_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.gcode");

        let config = config_for(&["layers", missing.to_str().expect("utf-8 path")], dir.path());
        let err = render(&config).await.expect_err("should fail");
        assert!(format!("{:#}", err).contains("absent.gcode"));
    }

    #[tokio::test]
    async fn test_render_summary_fails_when_nothing_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.nc");

        let config = config_for(&["summary", missing.to_str().expect("utf-8 path")], dir.path());
        assert!(render(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_render_tessellated_preview() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("circle.nc");
        fs::write(&path, "G0 X10\nG2 X10 Y0 I-5 J0 S300\n").expect("write");

        let config = config_for(
            &[
                "--format",
                "json",
                "--arc-samples",
                "8",
                "preview",
                path.to_str().expect("utf-8 path"),
                "--tessellate",
            ],
            dir.path(),
        );
        let rendered = render(&config).await.expect("render");
        let value: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");

        let polylines = value["polylines"].as_array().expect("polylines");
        assert_eq!(polylines.len(), 2);
        assert_eq!(polylines[1]["points"].as_array().map(Vec::len), Some(8));
        assert_eq!(polylines[1]["burn"], true);
    }
}
