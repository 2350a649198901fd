use anyhow::{Context, Result};
use clap::Parser;
use class_leak::classify::{ENTITY_MARKERS, SERIALIZATION_MARKERS};
use class_leak::cli::{CheckArgs, Cli, Commands, OutputFormat};
use class_leak::config::AnalysisConfig;
use class_leak::engine::Engine;
use class_leak::report::LeakReport;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = parse_cli();
    init_logging(cli.verbose);

    match cli.command.clone() {
        Commands::Markers => {
            let markers = serde_json::json!({
                "serialization": SERIALIZATION_MARKERS,
                "entity": ENTITY_MARKERS,
            });
            println!("{}", serde_json::to_string_pretty(&markers)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => check(&cli, &args),
    }
}

fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();
    Cli::parse_from(rewrite_args_for_implicit_check(args))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn rewrite_args_for_implicit_check(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["check", "markers", "help"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if a == "--jobs" || a == "-j" {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(idx, "check".to_string());
        }
    }

    args
}

fn check(cli: &Cli, args: &CheckArgs) -> Result<ExitCode> {
    let start = Instant::now();
    let config = AnalysisConfig::from_check_args(cli, args)?;
    let engine = Engine::new(config.source_provider(), config.report_builder())
        .with_jobs(config.jobs);

    let report = engine
        .run(&config.paths)
        .context("Failed to analyze source paths")?;

    info!(
        files = report.summary.files_scanned,
        classes = report.summary.classes_found,
        leaks = report.summary.leak_count,
        duration_ms = start.elapsed().as_millis() as u64,
        "analysis finished"
    );
    for failed in &report.summary.failed_files {
        eprintln!("[class-leak] skipped {}: {}", failed.file_path, failed.reason);
    }

    write_report(&report, args.format, args.output.as_deref())?;

    if args.fail_on_leaks && !report.is_clean() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn write_report(report: &LeakReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let content = match format {
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Text => render_text(report)?,
    };

    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        std::fs::write(path, &content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}

fn render_text(report: &LeakReport) -> Result<String> {
    let summary = &report.summary;
    let mut out = String::new();
    for leak in report.records() {
        out.push_str(&format!("{}  {}", leak.file_path, leak.class_name));
        if !leak.attributes.is_empty() {
            out.push_str(&format!("  [{}]", leak.attributes.join(", ")));
        }
        out.push('\n');
    }
    if !report.leaks.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("files_scanned: {}\n", summary.files_scanned));
    out.push_str(&format!("classes_found: {}\n", summary.classes_found));
    out.push_str(&format!("leaks: {}\n", summary.leak_count));
    if summary.filtered_out > 0 {
        out.push_str(&format!("filtered_out: {}\n", summary.filtered_out));
    }
    if summary.skipped_declarations > 0 {
        out.push_str(&format!(
            "skipped_declarations: {}\n",
            summary.skipped_declarations
        ));
    }
    if !summary.failed_files.is_empty() {
        out.push_str(&format!("failed_files: {}\n", summary.failed_files.len()));
    }
    if summary.cancelled {
        out.push_str("cancelled: true\n");
    }
    out.push_str(&format!("fingerprint: {}\n", report.fingerprint()?));
    Ok(out)
}
