//! CLI binary for tex2dtx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tex2dtx::config::parse_override;
use tex2dtx::metadata::parse_date;
use tex2dtx::{
    convert, convert_to_file, inspect, ConversionConfig, ConversionOutput,
    ConversionProgressCallback, Diagnostic, ProgressCallback, Severity,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the resource entries plus a log
/// line per parsed source file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading resources…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Parsing");
    }

    fn on_file_complete(&self, index: usize, total: usize, name: &str, commands: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {:<32}  {}",
            green("✓"),
            index,
            total,
            name,
            dim(&format!("{commands} commands")),
        ));
        self.bar.set_message(name.to_string());
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, _total_files: usize, source_files: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} source files parsed",
            green("✔"),
            bold(&source_files.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Write <pkg_name>.dtx into the current directory
  tex2dtx resources

  # Write into a target directory
  tex2dtx resources -o build

  # Override package metadata
  tex2dtx resources --set pkg_name=glmatrix --set pkg_author="Jane Doe"

  # Reproducible output
  tex2dtx resources --date 2024/01/31 --stdout > glmatrix.dtx

  # List sections and commands without rendering
  tex2dtx resources --inspect-only

RESOURCE DIRECTORY:
  *_<section>.tex         annotated sources, one section per file
  package_config.txt      key=value metadata (pkg_date=today for the run date)
  docu/pkg_packages.tex                   \RequirePackage lines of the package
  docu/docu_packages_and_settings.tex     documentation-only preamble
  docu/introduction.tex                   introduction text
  docu/example.tex                        usage example

TEMPLATES (--templates DIR):
  01_head.tex  02_preamble_template.tex  03_postamble_template.tex
  04_generate_template.tex  05_predocument.tex  06_document_template.tex

ENVIRONMENT VARIABLES:
  TEX2DTX_OUTPUT_DIR      Target directory
  TEX2DTX_TEMPLATES       Template directory
  TEX2DTX_DATE            Pinned date (YYYY/MM/DD)
  RUST_LOG                Log filter (overrides -v / -q)
"#;

/// Convert annotated LaTeX macro sources into a docstrip .dtx document.
#[derive(Parser, Debug)]
#[command(
    name = "tex2dtx",
    version,
    about = "Convert annotated LaTeX macro sources into a docstrip .dtx document",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory holding the annotated .tex sources.
    resource_dir: PathBuf,

    /// Directory to write <pkg_name>.dtx into.
    #[arg(short, long, env = "TEX2DTX_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Directory with the six header templates (built-ins otherwise).
    #[arg(long, env = "TEX2DTX_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Metadata override, applied after package_config.txt. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, String)>,

    /// Date used for pkg_date (YYYY/MM/DD).
    #[arg(long, env = "TEX2DTX_DATE", value_parser = parse_date_arg)]
    date: Option<NaiveDate>,

    /// Source file extension.
    #[arg(long, env = "TEX2DTX_EXTENSION", default_value = "tex")]
    extension: String,

    /// Print the document to stdout instead of writing a file.
    #[arg(long)]
    stdout: bool,

    /// Output structured JSON (ConversionOutput) instead of the document.
    #[arg(long, env = "TEX2DTX_JSON")]
    json: bool,

    /// List metadata, sections and commands only, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "TEX2DTX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TEX2DTX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TEX2DTX_QUIET")]
    quiet: bool,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("expected YYYY/MM/DD, got '{s}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs; verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.stdout;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress && !cli.inspect_only {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let report = inspect(&cli.resource_dir, &config).context("Failed to inspect resources")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else {
            println!("Directory:    {}", cli.resource_dir.display());
            println!("Output:       {}", report.file_name);
            for (key, value) in report.metadata.iter() {
                println!("{:<13} {}", format!("{key}:"), value);
            }
            for section in &report.sections {
                println!();
                println!("[{}]", section.key);
                for name in &section.commands {
                    println!("  \\{name}");
                }
                for name in &section.private_commands {
                    println!("  \\{name}  (private)");
                }
            }
            if !cli.quiet {
                print_diagnostics(&report.diagnostics);
            }
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    if cli.stdout || cli.json {
        let output = convert(&cli.resource_dir, &config).context("Conversion failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.document.as_bytes())
                .context("Failed to write to stdout")?;
        }

        if !cli.quiet && !cli.json {
            print_diagnostics(&output.diagnostics);
        }
    } else {
        let (path, output) = convert_to_file(&cli.resource_dir, &cli.output_dir, &config)
            .with_context(|| format!("Conversion of {} failed", cli.resource_dir.display()))?;

        if !cli.quiet {
            print_diagnostics(&output.diagnostics);
            print_summary(&output, &path);
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder().extension(cli.extension.clone());

    if let Some(ref dir) = cli.templates {
        builder = builder.template_dir(dir);
    }
    for (key, value) in &cli.overrides {
        builder = builder.metadata_override(key.clone(), value.clone());
    }
    if let Some(date) = cli.date {
        builder = builder.today(date);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Warning-level diagnostics to stderr; info-level ones only go to the log.
fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics.iter().filter(|d| d.severity() == Severity::Warning) {
        eprintln!("{} {}", yellow("⚠"), d);
    }
}

fn print_summary(output: &ConversionOutput, path: &std::path::Path) {
    let stats = &output.stats;
    eprintln!(
        "{}  {} sections  {} commands  {}ms  →  {}",
        if stats.warnings == 0 {
            green("✔")
        } else {
            cyan("⚠")
        },
        stats.sections,
        stats.public_commands + stats.private_commands,
        stats.total_duration_ms,
        bold(&path.display().to_string()),
    );
    if stats.private_commands > 0 || stats.todos > 0 {
        eprintln!(
            "   {} private  /  {} open TODOs",
            dim(&stats.private_commands.to_string()),
            dim(&stats.todos.to_string()),
        );
    }
}
