//! CLI binary for mdbatch.
//!
//! `mdbatch serve` starts the local web UI; `mdbatch convert` runs the same
//! sequential batch over a folder and writes `.md` files next to each other
//! in an output folder.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mdbatch::{
    convert_directory_to_dir, AppState, CommandConverter, ConversionConfig,
    ConversionProgressCallback, ProgressCallback, ServerConfig,
    TracingProgressCallback,
};
use std::io;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar with one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_file_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_file_complete(&self, _index: usize, _total: usize, name: &str, markdown_len: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            name,
            dim(&format!("{markdown_len} bytes"))
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, _index: usize, _total: usize, name: &str, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!("  {} {}  {}", red("✗"), name, red(&msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the web UI on the default port (8501)
  mdbatch serve

  # Listen on all interfaces, port 9000
  mdbatch serve --host 0.0.0.0 --port 9000

  # Use a different converter (must print Markdown on stdout)
  mdbatch serve --converter pandoc --converter-arg=-t --converter-arg=gfm

  # Convert a folder without the UI
  mdbatch convert -i docs/ -o converted/ --recursive

  # Only PDFs and Word files, JSON report on stdout
  mdbatch convert -i docs/ -o converted/ -e .pdf .docx --json

ENVIRONMENT VARIABLES:
  MDBATCH_HOST            Bind address for `serve`
  MDBATCH_PORT            Port for `serve`
  MDBATCH_MAX_UPLOAD_MB   Request body limit for `serve`
  MDBATCH_CONVERTER       Converter program (default: markitdown)
  RUST_LOG                Overrides the log filter (e.g. mdbatch=debug)
"#;

/// Batch-convert documents to Markdown with an external converter.
#[derive(Parser, Debug)]
#[command(
    name = "mdbatch",
    version,
    about = "Batch-convert documents to Markdown and download them as a zip",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "MDBATCH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "MDBATCH_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the local web UI.
    Serve(ServeArgs),
    /// Convert every file in a folder into an output folder.
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct ConverterArgs {
    /// Converter program, invoked as `<converter> [args..] <file>`.
    #[arg(long, env = "MDBATCH_CONVERTER", default_value = mdbatch::config::DEFAULT_CONVERTER)]
    converter: String,

    /// Extra argument passed to the converter before the file path (repeatable).
    #[arg(long = "converter-arg", allow_hyphen_values = true)]
    converter_args: Vec<String>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "MDBATCH_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "MDBATCH_PORT", default_value_t = mdbatch::config::DEFAULT_PORT)]
    port: u16,

    /// Maximum size of one form submission, in MiB.
    #[arg(long, env = "MDBATCH_MAX_UPLOAD_MB", default_value_t = 256)]
    max_upload_mb: usize,

    #[command(flatten)]
    converter: ConverterArgs,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input directory containing files to convert.
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for generated .md files.
    #[arg(short, long)]
    output: PathBuf,

    /// Only include these extensions (e.g. .pdf .xlsx). If omitted, all files are attempted.
    #[arg(short, long, num_args = 1..)]
    extensions: Vec<String>,

    /// Recurse into subdirectories.
    #[arg(short, long)]
    recursive: bool,

    /// Print the batch result as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MDBATCH_NO_PROGRESS")]
    no_progress: bool,

    #[command(flatten)]
    converter: ConverterArgs,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar covers per-file feedback for `convert`, so library
    // INFO logs are only shown for `serve` unless --verbose is given.
    let show_progress = match &cli.command {
        Command::Convert(a) => !cli.quiet && !a.no_progress && !a.json,
        Command::Serve(_) => false,
    };
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

    match cli.command {
        Command::Serve(args) => {
            serve(args).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Convert(args) => convert(args, cli.quiet, show_progress).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = ConversionConfig::builder()
        .converter_program(&args.converter.converter)
        .converter_args(args.converter.converter_args.clone())
        .progress_callback(Arc::new(TracingProgressCallback))
        .build()
        .context("Invalid configuration")?;

    let server = ServerConfig {
        host: args.host,
        port: args.port,
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
    };

    let converter = Arc::new(CommandConverter::from_config(&config));
    let state = AppState::new(converter, config);

    mdbatch::web::serve(server, state)
        .await
        .context("Web server failed")
}

async fn convert(args: ConvertArgs, quiet: bool, show_progress: bool) -> Result<ExitCode> {
    let mut builder = ConversionConfig::builder()
        .converter_program(&args.converter.converter)
        .converter_args(args.converter.converter_args.clone())
        .recursive(args.recursive)
        .extensions(args.extensions.clone());

    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new() as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;
    let converter = CommandConverter::from_config(&config);

    let output = match convert_directory_to_dir(&args.input, &args.output, &converter, &config).await
    {
        Ok(output) => output,
        Err(e) if e.is_input_error() => {
            eprintln!("{} {}", red("error:"), e);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Conversion failed")),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    if !quiet {
        for result in output.successes() {
            if let Some(ref dst) = result.output_path {
                eprintln!("Converted: {} -> {}", result.source.display(), dst.display());
            }
        }
        for result in output.failures() {
            if let Some(ref e) = result.error {
                eprintln!("Failed to convert {}: {}", result.source.display(), e);
            }
        }
        eprintln!(
            "{} Finished: {}/{} files converted successfully  {}",
            if output.stats.failed_files == 0 {
                green("✔")
            } else {
                red("⚠")
            },
            bold(&output.stats.converted_files.to_string()),
            output.stats.total_files,
            dim(&format!("{}ms", output.stats.total_duration_ms)),
        );
    }

    Ok(ExitCode::SUCCESS)
}
