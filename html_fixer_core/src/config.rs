use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::EscapeMode;
use crate::FixerError;
use crate::FixerResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default text encoding label used to read and write files.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Patterns used when neither the command line nor the config names any.
pub const DEFAULT_INCLUDE_PATTERNS: [&str; 3] = ["**/*.html", "**/*.htm", "**/*.xhtml"];

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"html-fixer.toml",
	".html-fixer.toml",
	".config/html-fixer.toml",
];

/// Configuration loaded from an `html-fixer.toml` file.
///
/// ```toml
/// mode = "extended"
/// encoding = "utf-8"
/// max_file_size = 1048576
/// disable_gitignore = false
///
/// [include]
/// patterns = ["src/**/*.html", "src/**/*.tsx"]
///
/// [exclude]
/// patterns = ["vendor/", "*.min.html"]
/// ```
#[derive(Debug, Deserialize)]
pub struct FixerConfig {
	/// Escape mode used when none is given on the command line.
	#[serde(default)]
	pub mode: Option<EscapeMode>,
	/// Encoding label used to read and write files.
	#[serde(default)]
	pub encoding: Option<String>,
	/// Files to process when no patterns are given on the command line.
	#[serde(default)]
	pub include: IncludeConfig,
	/// Files and directories to skip.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Files larger than this many bytes fail instead of being processed.
	/// Defaults to 10 MB.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
}

/// Glob patterns selecting the files to process.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeConfig {
	/// Glob patterns relative to the project root. A leading `!` negates.
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Configuration for excluding files and directories from processing.
///
/// Patterns follow gitignore syntax and are applied on top of any
/// `.gitignore` rules (unless `disable_gitignore` is set).
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Examples: `"build/"`, `"*.min.html"`, `"!keep.html"`.
	#[serde(default)]
	pub patterns: Vec<String>,
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

impl FixerConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> FixerResult<Option<FixerConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Parse config file contents.
	pub fn parse(content: &str) -> FixerResult<FixerConfig> {
		toml::from_str(content).map_err(|e| FixerError::ConfigParse(e.to_string()))
	}
}
