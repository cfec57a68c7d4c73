//! CLI binary for edgequake-ocr.
//!
//! A thin shim over the library crate: flags (or interactive prompts when no
//! flags are given) become one `ConversionRequest`, which is converted once.

use anyhow::{bail, Context, Result};
use clap::Parser;
use edgequake_ocr::pipeline::input::validate_input;
use edgequake_ocr::{
    convert, inspect, ConversionConfig, ConversionProgressCallback, ConversionRequest, OcrError,
    OutputFormat, PageSeparator, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Start as a spinner; `on_conversion_start` switches to a bar once the
    /// page count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading input…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Recognising");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, page_num: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&page_num))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Recognising {total_pages} page(s)…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(page_num, Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, text_len: usize) {
        let secs = self.elapsed_secs(page_num);
        let note = if text_len == 0 {
            "blank".to_string()
        } else {
            format!("{text_len:>5} chars")
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&note),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(page_num);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let first_line = error.lines().next().unwrap_or(error);
        let msg: String = if first_line.chars().count() > 80 {
            first_line.chars().take(79).chain(['…']).collect()
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let failed = total_pages.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} page(s) recognised",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages recognised  ({} failed)",
                if failed == total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive mode (prompts for input, format, and output)
  edgeocr

  # Image to text
  edgeocr --input receipt.jpg --output receipt.txt --format txt

  # Scanned PDF to a searchable text-only PDF
  edgeocr --input scan.pdf --output scan --format pdf     # writes scan.pdf

  # Page banners between pages, higher render resolution
  edgeocr --input book.pdf --output book.txt --format txt --separator banner --dpi 300

  # Inspect a document (no OCR)
  edgeocr --input scan.pdf --inspect-only

EXIT CODES:
  0  success (some pages may have failed; see the summary)
  1  internal or usage error
  2  invalid input (missing file, unsupported extension, undecodable image)
  3  unsupported output format
  4  PDF could not be opened or rendered
  5  no text recognised on any page (no output written)
  6  output could not be written

ENVIRONMENT VARIABLES:
  EDGEOCR_TESSERACT   Path to the tesseract executable
  PDFIUM_LIB_PATH     Path to libpdfium (file or directory)
  RUST_LOG            Override log filtering (e.g. edgequake_ocr=debug)

SETUP:
  tesseract-ocr must be installed (apt install tesseract-ocr / brew install tesseract).
  PDF input additionally needs the pdfium shared library.
"#;

/// Extract text from images and PDFs with OCR.
#[derive(Parser, Debug)]
#[command(
    name = "edgeocr",
    version,
    about = "Extract text from images and PDFs with OCR",
    long_about = "Recognise the text in an image (.png, .jpg, .jpeg) or PDF and write it as a \
UTF-8 text file or a new text-only PDF. Run without --input/--output/--format for an \
interactive prompt.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file: .png, .jpg, .jpeg, or .pdf.
    #[arg(short, long, env = "EDGEOCR_INPUT")]
    input: Option<PathBuf>,

    /// Output file. The format's extension is appended when missing.
    #[arg(short, long, env = "EDGEOCR_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format: txt or pdf.
    #[arg(short, long, env = "EDGEOCR_FORMAT")]
    format: Option<String>,

    /// Rendering DPI for PDF pages (72–400).
    #[arg(long, env = "EDGEOCR_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "EDGEOCR_PASSWORD")]
    password: Option<String>,

    /// Tesseract executable.
    #[arg(long, env = "EDGEOCR_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Page separator: blank, banner, or a custom string.
    #[arg(long, env = "EDGEOCR_SEPARATOR", default_value = "blank")]
    separator: String,

    /// Print document information only, no OCR.
    #[arg(long)]
    inspect_only: bool,

    /// Print the conversion summary as JSON on stdout.
    #[arg(long, env = "EDGEOCR_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "EDGEOCR_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EDGEOCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "EDGEOCR_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    match run(cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            let code = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<OcrError>())
                .map(|ocr| ocr.kind().exit_code())
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli, show_progress: bool) -> Result<()> {
    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let input = cli
            .input
            .as_ref()
            .context("--inspect-only requires --input <PATH>")?;
        let meta = inspect(input, cli.password.as_deref())
            .await
            .context("Failed to inspect input")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", input.display());
            if let Some(kind) = meta.kind {
                println!("Kind:         {:?}", kind);
            }
            println!("Pages:        {}", meta.page_count);
            if let Some((w, h)) = meta.dimensions {
                println!("Dimensions:   {}x{} px", w, h);
            }
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if !meta.pdf_version.is_empty() {
                println!("PDF Version:  {}", meta.pdf_version);
            }
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
        }
        return Ok(());
    }

    // ── Build request ────────────────────────────────────────────────────
    let request = match (&cli.input, &cli.output, &cli.format) {
        (Some(input), Some(output), Some(format)) => {
            let format: OutputFormat = format.parse()?;
            ConversionRequest::new(input, format.ensure_extension(output), format)
        }
        (None, None, None) => interactive_request()?,
        _ => bail!("--input, --output and --format must be given together (or none of them for interactive mode)"),
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let result = convert(&request, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise result")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}/{} pages  {}ms  →  {}",
            if result.pages_failed == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            result.pages_processed,
            result.total_pages,
            result.duration_ms,
            bold(&result.output_path.display().to_string()),
        );
        if result.pages_failed > 0 {
            eprintln!(
                "   {} page(s) could not be recognised and were left empty",
                red(&result.pages_failed.to_string())
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .tesseract_program(cli.tesseract.clone())
        .page_separator(parse_separator(&cli.separator));

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "blank" | "none" | "" => PageSeparator::BlankLine,
        "banner" => PageSeparator::Banner,
        _ => PageSeparator::Custom(s.to_string()),
    }
}

// ── Interactive mode ─────────────────────────────────────────────────────────

/// Collect input path, output format, and output path from the terminal.
///
/// Each question is repeated until the answer is valid.
fn interactive_request() -> Result<ConversionRequest> {
    let stdin = io::stdin();
    let mut lines = stdin.lock();

    println!("\n{}", bold("OCR Command-Line Application"));
    println!("===========================");

    let input = loop {
        let answer = prompt(&mut lines, "\nEnter the path to your input file (PDF or image): ")?;
        let path = PathBuf::from(answer);
        match validate_input(&path) {
            Ok(_) => break path,
            Err(e) => eprintln!("{} {}", red("Error:"), e),
        }
    };

    let format = loop {
        println!("\nSelect output format:");
        println!("1. Text file (.txt)");
        println!("2. PDF file (.pdf)");
        match prompt(&mut lines, "Enter your choice (1 or 2): ")?.as_str() {
            "1" => break OutputFormat::Text,
            "2" => break OutputFormat::Pdf,
            _ => eprintln!("Invalid choice. Please try again."),
        }
    };

    let output = loop {
        let answer = prompt(
            &mut lines,
            &format!("\nEnter the output file path (with .{} extension): ", format),
        )?;
        let path = PathBuf::from(answer);
        if format.matches_extension(&path) {
            break path;
        }
        eprintln!(
            "{} output file must end with .{}",
            red("Error:"),
            format.extension()
        );
    };

    println!("\nProcessing file...");
    Ok(ConversionRequest::new(input, output, format))
}

/// Print `question`, read one trimmed line. EOF is an error.
fn prompt(lines: &mut impl BufRead, question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut buf = String::new();
    let n = lines
        .read_line(&mut buf)
        .context("Failed to read from stdin")?;
    if n == 0 {
        bail!("Input closed before all questions were answered");
    }
    Ok(buf.trim().to_string())
}
