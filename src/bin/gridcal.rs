use anyhow::{Context, Result};
use clap::Parser;
use gridcal::cli::{Cli, Command};
use gridcal::client::extractor::{CommandExtractor, EventExtractor, ResponseFileExtractor};
use gridcal::client::sync::{DryRun, IcsExport};
use gridcal::config::Config;
use gridcal::context::{AppContext, StandardContext};
use gridcal::model::grid::Sheet;
use gridcal::pipeline::{Pipeline, PipelineError, RunOutcome, require_file};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

const SHOWN_FAILURES: usize = 3;

enum Target {
    DryRun,
    Export(PathBuf),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON and prompts.
    if let Err(e) = TermLogger::init(
        cli.log_level(),
        ConfigBuilder::new().build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let ctx = StandardContext::new(cli.root.clone()).with_config_file(cli.config.clone());
    let config = Config::load_or_default(&ctx)?;
    let pipeline = Pipeline::new(config);

    match cli.command {
        Command::Analyze { sheet } => {
            let sheet = pipeline.load_sheet(&sheet).await?;
            print_analysis(&pipeline, &sheet);
        }
        Command::Prompt { sheet } => {
            let sheet = pipeline.load_sheet(&sheet).await?;
            let analysis = pipeline.analyze(&sheet);
            println!("{}", pipeline.build_prompt(&sheet, &analysis));
        }
        Command::Merge { response } => {
            let raw = read_response(&response).await?;
            let outcome = pipeline.finalize(&raw)?;
            for warning in &outcome.warnings {
                eprintln!(
                    "warning: '{}' has a malformed {}: {}",
                    warning.title, warning.field, warning.error
                );
            }
            println!("{}", serde_json::to_string_pretty(&outcome.events)?);
        }
        Command::Run {
            sheet,
            response,
            output,
            dry_run,
        } => {
            let sheet_path = sheet;
            let sheet = pipeline.load_sheet(&sheet_path).await?;
            let target = if dry_run {
                Target::DryRun
            } else {
                match output {
                    Some(path) => Target::Export(path),
                    None => Target::Export(ctx.get_export_path(&file_stem(&sheet_path))?),
                }
            };

            if let Some(path) = response {
                require_file(&path, "response file")?;
                let extractor = ResponseFileExtractor::new(path);
                run_sheet(&pipeline, &sheet, &extractor, target).await?;
            } else {
                let extractor = CommandExtractor::from_argv(&pipeline.config.extractor_command)
                    .ok_or_else(|| PipelineError::MissingResource {
                        what: "extractor command",
                        location: Config::get_path_string(&ctx).unwrap_or_default(),
                    })?;
                run_sheet(&pipeline, &sheet, &extractor, target).await?;
            }
        }
        Command::Config { write } => {
            if write {
                pipeline.config.save(&ctx)?;
                log::info!("Saved configuration");
            }
            println!("Config file: {}", Config::get_path_string(&ctx)?);
            println!();
            print!("{}", toml::to_string_pretty(&pipeline.config)?);
        }
    }

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

async fn read_response(source: &str) -> Result<String> {
    if source == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("Failed to read response from stdin")?;
        return Ok(raw);
    }
    let path = Path::new(source);
    require_file(path, "response file")?;
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn print_analysis(pipeline: &Pipeline, sheet: &Sheet) {
    let analysis = pipeline.analyze(sheet);
    println!(
        "Sheet '{}': {} rows x {} columns",
        sheet.name,
        sheet.grid.row_count(),
        sheet.grid.col_count()
    );
    println!();
    println!("Time axis ({} rows):", analysis.axis.len());
    for (row, entry) in analysis.axis.iter() {
        let interval = entry
            .interval
            .map(|i| i.to_string())
            .unwrap_or_else(|| "no range".to_string());
        println!(
            "  Row {:>3} [{}]: {} -> {}",
            row, entry.kind, entry.text, interval
        );
    }
    println!();
    println!("Merged cells ({}):", analysis.hints.len());
    for hint in &analysis.hints {
        println!("  {}", hint);
    }
}

async fn run_sheet<E: EventExtractor>(
    pipeline: &Pipeline,
    sheet: &Sheet,
    extractor: &E,
    target: Target,
) -> Result<()> {
    match target {
        Target::DryRun => {
            let sink = DryRun::default();
            let outcome = pipeline.process(sheet, extractor, &sink).await?;
            print_outcome(&outcome);
            if !sink.payloads().is_empty() {
                println!("Dry run: nothing was written.");
            }
        }
        Target::Export(path) => {
            let sink = IcsExport::new(path, pipeline.config.calendar_name.clone());
            let outcome = pipeline.process(sheet, extractor, &sink).await?;
            print_outcome(&outcome);
            if let RunOutcome::Synced { report, .. } = &outcome
                && report.success_count > 0
            {
                let written = sink.finish()?;
                println!("Wrote {} events to {}", written, sink.path().display());
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoEvents => println!("No events found."),
        RunOutcome::Synced {
            report, warnings, ..
        } => {
            for warning in warnings {
                eprintln!(
                    "warning: '{}' has a malformed {}: {}",
                    warning.title, warning.field, warning.error
                );
            }
            println!(
                "Synced {}/{} events ({} failed)",
                report.success_count, report.total, report.failed_count
            );
            for failure in report.failures.iter().take(SHOWN_FAILURES) {
                println!("  failed: {}: {}", failure.event.brief(), failure.error);
            }
            if report.failures.len() > SHOWN_FAILURES {
                println!("  ... and {} more", report.failures.len() - SHOWN_FAILURES);
            }
        }
    }
}
