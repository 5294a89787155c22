use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use html_fixer_cli::Commands;
use html_fixer_cli::HtmlFixerCli;
use html_fixer_cli::OutputFormat;
use html_fixer_core::EscapeMode;
use html_fixer_core::FixerError;
use html_fixer_core::TextEncoding;
use html_fixer_core::config::DEFAULT_INCLUDE_PATTERNS;
use html_fixer_core::config::FixerConfig;
use html_fixer_core::escape_html;
use html_fixer_core::processor::ProcessOptions;
use html_fixer_core::processor::ProcessSummary;
use html_fixer_core::processor::process_files;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = HtmlFixerCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(&args, use_color);

	let result = match &args.command {
		Some(Commands::Fix {
			patterns,
			dry_run,
			watch,
		}) => run_fix(&args, patterns, *dry_run, *watch),
		Some(Commands::Check {
			patterns,
			diff,
			format,
		}) => run_check(&args, patterns, *diff, *format),
		Some(Commands::Escape) => run_escape(&args),
		None => {
			eprintln!("No subcommand specified. Run `html-fixer --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<FixerError>() {
			Ok(fixer_err) => {
				let report: miette::Report = (*fixer_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` takes precedence over the verbosity flags.
fn init_tracing(args: &HtmlFixerCli, use_color: bool) {
	let default_level = if args.verbose {
		"debug"
	} else if args.quiet {
		"error"
	} else {
		"warn"
	};

	tracing_subscriber::registry()
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_target(false)
				.with_ansi(use_color)
				.with_filter(
					EnvFilter::try_from_default_env()
						.unwrap_or_else(|_| EnvFilter::new(default_level)),
				),
		)
		.init();
}

fn resolve_root(args: &HtmlFixerCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Everything a run needs: options with command-line overrides applied and
/// the patterns to match.
struct RunSettings {
	root: PathBuf,
	options: ProcessOptions,
	patterns: Vec<String>,
}

fn load_settings(
	args: &HtmlFixerCli,
	patterns: &[String],
	dry_run: bool,
) -> Result<RunSettings, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = FixerConfig::load(&root)?;
	let mut options = ProcessOptions::from_config(root.clone(), config.as_ref())?;

	if let Some(mode) = args.mode {
		options.mode = mode.into();
	}
	if let Some(label) = &args.encoding {
		options.encoding = TextEncoding::for_label(label)?;
	}
	options.dry_run = dry_run;

	let patterns = if !patterns.is_empty() {
		patterns.to_vec()
	} else if let Some(config) = config.filter(|config| !config.include.patterns.is_empty()) {
		config.include.patterns
	} else {
		DEFAULT_INCLUDE_PATTERNS.iter().map(ToString::to_string).collect()
	};

	tracing::debug!(
		root = %root.display(),
		mode = %options.mode,
		encoding = %options.encoding,
		?patterns,
		"resolved settings"
	);

	Ok(RunSettings {
		root,
		options,
		patterns,
	})
}

fn run_fix(
	args: &HtmlFixerCli,
	patterns: &[String],
	dry_run: bool,
	watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	// Run the initial pass.
	let summary = run_fix_once(args, patterns, dry_run)?;

	if !watch {
		if summary.failed_files > 0 {
			process::exit(1);
		}
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, escaping...");
		if let Err(e) = run_fix_once(args, patterns, false) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn run_fix_once(
	args: &HtmlFixerCli,
	patterns: &[String],
	dry_run: bool,
) -> Result<ProcessSummary, Box<dyn std::error::Error>> {
	let settings = load_settings(args, patterns, dry_run)?;
	let summary = process_files(&settings.patterns, &settings.options)?;
	let root = &settings.root;

	print_failures(&summary, root);

	if summary.files_with_changes == 0 {
		if !args.quiet {
			println!(
				"No unescaped entities found in {} file(s).",
				summary.total_files - summary.failed_files
			);
		}
		return Ok(summary);
	}

	if args.quiet {
		return Ok(summary);
	}

	if dry_run {
		println!(
			"Dry run: would escape {} entities in {} file(s):",
			summary.total_entities_escaped, summary.files_with_changes
		);
		for file in summary.changed() {
			let rel = make_relative(&file.file_path, root);
			println!("  {rel} ({})", file.escaped_count());
		}
	} else {
		println!(
			"{} {} entities in {} file(s).",
			colored!("Escaped", green),
			summary.total_entities_escaped,
			summary.files_with_changes
		);

		if args.verbose {
			for file in summary.changed() {
				let rel = make_relative(&file.file_path, root);
				println!("  {rel} ({})", file.escaped_count());
			}
		}
	}

	Ok(summary)
}

fn print_failures(summary: &ProcessSummary, root: &Path) {
	for file in summary.failed() {
		let rel = make_relative(&file.file_path, root);
		eprintln!(
			"{} {rel}: {}",
			colored!("error:", red),
			file.error().unwrap_or_default()
		);
	}
}

fn run_check(
	args: &HtmlFixerCli,
	patterns: &[String],
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let settings = load_settings(args, patterns, true)?;
	let summary = process_files(&settings.patterns, &settings.options)?;
	let root = &settings.root;

	if summary.is_clean() {
		match format {
			OutputFormat::Json => {
				println!("{}", check_json(&summary, root));
			}
			OutputFormat::Github => {
				println!("All files are escaped.");
			}
			OutputFormat::Text => {
				if !args.quiet {
					println!(
						"Check passed: no unescaped entities in {} file(s).",
						summary.total_files
					);
				}
			}
		}
		return Ok(());
	}

	match format {
		OutputFormat::Json => {
			println!("{}", check_json(&summary, root));
		}
		OutputFormat::Github => {
			for file in summary.failed() {
				let rel = make_relative(&file.file_path, root);
				println!(
					"::error file={rel}::Could not check file: {}",
					file.error().unwrap_or_default()
				);
			}
			for file in summary.changed() {
				let rel = make_relative(&file.file_path, root);
				println!(
					"::warning file={rel}::{} unescaped entities",
					file.escaped_count()
				);
			}
			eprintln!("{}", check_summary(&summary));
		}
		OutputFormat::Text => {
			eprintln!("Check failed.");
			print_failures(&summary, root);

			if summary.files_with_changes > 0 {
				eprintln!();
				eprintln!("Files with unescaped entities:");
				for file in summary.changed() {
					let rel = make_relative(&file.file_path, root);
					eprintln!("  {rel} ({})", file.escaped_count());

					if show_diff {
						let (Some(result), Ok(bytes)) =
							(file.result(), std::fs::read(&file.file_path))
						else {
							continue;
						};
						let current = settings.options.encoding.decode(&bytes, &file.file_path)?;
						print_diff(&current, &result.content);
					}
				}
			}

			eprintln!();
			eprintln!("{}", check_summary(&summary));
		}
	}

	process::exit(1);
}

fn check_json(summary: &ProcessSummary, root: &Path) -> serde_json::Value {
	let files: Vec<serde_json::Value> = summary
		.changed()
		.map(|file| {
			serde_json::json!({
				"file": make_relative(&file.file_path, root),
				"escaped_count": file.escaped_count(),
			})
		})
		.collect();
	let errors: Vec<serde_json::Value> = summary
		.failed()
		.map(|file| {
			serde_json::json!({
				"file": make_relative(&file.file_path, root),
				"message": file.error(),
			})
		})
		.collect();

	serde_json::json!({
		"ok": summary.is_clean(),
		"total_files": summary.total_files,
		"files_with_changes": summary.files_with_changes,
		"total_entities_escaped": summary.total_entities_escaped,
		"failed_files": summary.failed_files,
		"files": files,
		"errors": errors,
	})
}

fn check_summary(summary: &ProcessSummary) -> String {
	let mut parts = Vec::new();
	if summary.failed_files > 0 {
		parts.push(format!("{} file(s) could not be checked", summary.failed_files));
	}
	if summary.files_with_changes > 0 {
		parts.push(format!(
			"{} entities need escaping in {} file(s)",
			summary.total_entities_escaped, summary.files_with_changes
		));
	}
	format!(
		"{} Run `html-fixer fix` to escape them.",
		colored!(format!("{}.", parts.join(", ")), yellow)
	)
}

fn run_escape(args: &HtmlFixerCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = FixerConfig::load(&root)?;
	let mode = args
		.mode
		.map(EscapeMode::from)
		.or(config.as_ref().and_then(|config| config.mode))
		.unwrap_or_default();
	let encoding = match args
		.encoding
		.as_deref()
		.or(config.as_ref().and_then(|config| config.encoding.as_deref()))
	{
		Some(label) => TextEncoding::for_label(label)?,
		None => TextEncoding::default(),
	};

	let mut input = Vec::new();
	std::io::stdin().read_to_end(&mut input)?;

	let stdin_path = Path::new("<stdin>");
	let content = encoding.decode(&input, stdin_path)?;
	let result = escape_html(&content, mode);
	let output = encoding.encode(&result.content, stdin_path)?;

	let mut stdout = std::io::stdout().lock();
	stdout.write_all(&output)?;
	stdout.flush()?;

	if args.verbose {
		eprintln!(
			"{} {} entities escaped ({mode} mode).",
			colored!("info:", bold),
			result.escaped_count
		);
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
		if change.missing_newline() {
			eprintln!();
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
		.replace('\\', "/")
}
