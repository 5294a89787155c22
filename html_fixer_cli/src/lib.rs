use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use html_fixer_core::EscapeMode;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Escape HTML entities in text content without touching markup.",
	long_about = "html-fixer escapes quotes, ampersands and angle brackets in the text content \
	              of HTML, JSX and XML-ish files while leaving tags, comments, CDATA sections \
	              and doctype declarations exactly as they are.\n\nTag-shaped text that is not \
	              real markup, such as `I <3 you` or `click <here>`, is escaped too.\n\nQuick \
	              start:\n  html-fixer fix            Escape every matching file in place\n  \
	              html-fixer check          Report files that still need escaping\n  html-fixer \
	              escape < in     Escape stdin to stdout"
)]
pub struct HtmlFixerCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. Patterns and the config file are
	/// resolved against it.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output, including debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Only print errors.
	#[arg(long, short, global = true, default_value_t = false, conflicts_with = "verbose")]
	pub quiet: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Which characters to escape. Overrides `mode` in `html-fixer.toml`.
	#[arg(long, short, global = true, value_enum)]
	pub mode: Option<ModeArg>,

	/// Text encoding used to read and write files (and stdin and stdout for
	/// `escape`), as a WHATWG label such as `utf-8`, `utf-16le` or `latin1`.
	/// Overrides `encoding` in `html-fixer.toml`.
	#[arg(long, short, global = true)]
	pub encoding: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Escape entities in every matching file and write the files back.
	///
	/// Files are selected by the given glob patterns, or by `[include]` in
	/// `html-fixer.toml`, or by `**/*.html`, `**/*.htm` and `**/*.xhtml`.
	/// Prefix a pattern with `!` to exclude matches. Files ignored by
	/// `.gitignore` are skipped.
	///
	/// A file that cannot be read or decoded is reported and the remaining
	/// files are still processed.
	Fix {
		/// Glob patterns selecting the files to process, relative to the
		/// project root.
		patterns: Vec<String>,

		/// Preview changes without writing files. Prints which files would be
		/// modified and how many entities would be escaped.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch for file changes and re-run automatically.
		#[arg(long, default_value_t = false, conflicts_with = "dry_run")]
		watch: bool,
	},
	/// Check that no matching file needs escaping.
	///
	/// Never writes files. Exits with status 1 when any file would change or
	/// could not be processed, which makes it suitable for CI pipelines.
	Check {
		/// Glob patterns selecting the files to check, relative to the
		/// project root.
		patterns: Vec<String>,

		/// Show a diff of the escaped content for each file that would
		/// change.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations that appear inline on PRs.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Escape text read from stdin and write the result to stdout.
	Escape,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
	/// Quotes, ampersands and angle brackets only.
	Essential,
	/// Also common typographic symbols such as `©`, `™` and dashes.
	Extended,
}

impl From<ModeArg> for EscapeMode {
	fn from(value: ModeArg) -> Self {
		match value {
			ModeArg::Essential => EscapeMode::Essential,
			ModeArg::Extended => EscapeMode::Extended,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each entry includes the file
	/// path and the number of entities that would be escaped.
	Json,
	/// GitHub Actions annotation format. Emits `::warning` or `::error`
	/// annotations that appear inline on pull request diffs.
	Github,
}
