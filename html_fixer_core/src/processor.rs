use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::EscapeMode;
use crate::EscapeResult;
use crate::FixerError;
use crate::FixerResult;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::config::FixerConfig;
use crate::encoding::TextEncoding;
use crate::escape_html;

/// Options for controlling how files are discovered and processed.
///
/// Use [`ProcessOptions::new`] for sensible defaults or
/// [`ProcessOptions::from_config`] to construct from a [`FixerConfig`].
#[derive(Debug, Clone)]
pub struct ProcessOptions {
	/// Escaping mode.
	pub mode: EscapeMode,
	/// If true, files are never written; results report what would change.
	pub dry_run: bool,
	/// Encoding used to read and write files.
	pub encoding: TextEncoding,
	/// Directory that glob patterns are resolved against.
	pub root: PathBuf,
	/// Gitignore-style patterns to skip.
	pub exclude_patterns: Vec<String>,
	/// Maximum file size to process in bytes.
	pub max_file_size: u64,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
}

impl ProcessOptions {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			mode: EscapeMode::default(),
			dry_run: false,
			encoding: TextEncoding::default(),
			root: root.into(),
			exclude_patterns: Vec::new(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}

	/// Construct [`ProcessOptions`] from an optional [`FixerConfig`].
	pub fn from_config(root: impl Into<PathBuf>, config: Option<&FixerConfig>) -> FixerResult<Self> {
		let mut options = Self::new(root);
		let Some(config) = config else {
			return Ok(options);
		};

		if let Some(mode) = config.mode {
			options.mode = mode;
		}
		if let Some(label) = &config.encoding {
			options.encoding = TextEncoding::for_label(label)?;
		}
		options.exclude_patterns.clone_from(&config.exclude.patterns);
		options.max_file_size = config.max_file_size;
		options.disable_gitignore = config.disable_gitignore;

		Ok(options)
	}
}

/// The result of processing a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
	/// Path to the file.
	pub file_path: PathBuf,
	/// The escape result, or the message of the error that stopped this file.
	pub outcome: Result<EscapeResult, String>,
}

impl FileResult {
	pub fn is_success(&self) -> bool {
		self.outcome.is_ok()
	}

	pub fn result(&self) -> Option<&EscapeResult> {
		self.outcome.as_ref().ok()
	}

	pub fn error(&self) -> Option<&str> {
		self.outcome.as_ref().err().map(String::as_str)
	}

	pub fn has_changes(&self) -> bool {
		self.result().is_some_and(|result| result.has_changes)
	}

	pub fn escaped_count(&self) -> usize {
		self.result().map_or(0, |result| result.escaped_count)
	}
}

/// Aggregate results of a batch run.
#[derive(Debug, Clone, Default)]
pub struct ProcessSummary {
	/// Total files processed.
	pub total_files: usize,
	/// Files that had (or, in a dry run, would have) changes.
	pub files_with_changes: usize,
	/// Total entities escaped across all files.
	pub total_entities_escaped: usize,
	/// Files that failed to read, decode, encode or write.
	pub failed_files: usize,
	/// Individual file results in processing order.
	pub files: Vec<FileResult>,
}

impl ProcessSummary {
	pub fn from_results(files: Vec<FileResult>) -> Self {
		Self {
			total_files: files.len(),
			files_with_changes: files.iter().filter(|file| file.has_changes()).count(),
			total_entities_escaped: files.iter().map(FileResult::escaped_count).sum(),
			failed_files: files.iter().filter(|file| !file.is_success()).count(),
			files,
		}
	}

	/// Returns true if no file needed changes and none failed.
	pub fn is_clean(&self) -> bool {
		self.files_with_changes == 0 && self.failed_files == 0
	}

	/// Results for files that had changes.
	pub fn changed(&self) -> impl Iterator<Item = &FileResult> {
		self.files.iter().filter(|file| file.has_changes())
	}

	/// Results for files that failed.
	pub fn failed(&self) -> impl Iterator<Item = &FileResult> {
		self.files.iter().filter(|file| !file.is_success())
	}
}

/// Escape a single file, writing it back when it changed and this is not a
/// dry run. Errors are captured in the returned [`FileResult`].
pub fn process_file(path: &Path, options: &ProcessOptions) -> FileResult {
	let outcome = escape_file(path, options).map_err(|error| error.to_string());

	match &outcome {
		Ok(result) => {
			tracing::debug!(
				file = %path.display(),
				escaped = result.escaped_count,
				dry_run = options.dry_run,
				"processed file"
			);
		}
		Err(message) => {
			tracing::debug!(file = %path.display(), error = %message, "failed to process file");
		}
	}

	FileResult {
		file_path: path.to_path_buf(),
		outcome,
	}
}

fn escape_file(path: &Path, options: &ProcessOptions) -> FixerResult<EscapeResult> {
	let metadata = std::fs::metadata(path)?;
	if metadata.len() > options.max_file_size {
		return Err(FixerError::FileTooLarge {
			path: path.display().to_string(),
			size: metadata.len(),
			limit: options.max_file_size,
		});
	}

	let bytes = std::fs::read(path)?;
	let content = options.encoding.decode(&bytes, path)?;
	let result = escape_html(&content, options.mode);

	if result.has_changes && !options.dry_run {
		let encoded = options.encoding.encode(&result.content, path)?;
		std::fs::write(path, encoded)?;
	}

	Ok(result)
}

/// Discover the files matching `patterns` and escape each of them.
///
/// A failure in one file is recorded in its [`FileResult`] and does not stop
/// the remaining files. Only an invalid pattern or an unreadable directory
/// tree aborts the run.
pub fn process_files(patterns: &[String], options: &ProcessOptions) -> FixerResult<ProcessSummary> {
	let files = discover_files(patterns, options)?;
	tracing::debug!(count = files.len(), "discovered files");

	let results = files
		.iter()
		.map(|file| process_file(file, options))
		.collect();

	Ok(ProcessSummary::from_results(results))
}

/// Glob patterns split into positive matches and `!` negations.
struct PatternSet {
	include: GlobSet,
	negated: GlobSet,
}

impl PatternSet {
	fn new(root: &Path, patterns: &[String]) -> FixerResult<Self> {
		let mut include = GlobSetBuilder::new();
		let mut negated = GlobSetBuilder::new();

		for pattern in patterns {
			let (builder, raw) = match pattern.strip_prefix('!') {
				Some(rest) => (&mut negated, rest),
				None => (&mut include, pattern.as_str()),
			};
			let normalized = normalize_pattern(root, raw);
			let glob = GlobBuilder::new(&normalized)
				.literal_separator(true)
				.build()
				.map_err(|e| FixerError::InvalidPattern {
					pattern: pattern.clone(),
					reason: e.kind().to_string(),
				})?;
			builder.add(glob);
		}

		let build = |builder: GlobSetBuilder| {
			builder.build().map_err(|e| FixerError::InvalidPattern {
				pattern: patterns.join(" "),
				reason: e.to_string(),
			})
		};

		Ok(Self {
			include: build(include)?,
			negated: build(negated)?,
		})
	}

	fn is_match(&self, relative: &Path) -> bool {
		self.include.is_match(relative) && !self.negated.is_match(relative)
	}

	fn is_negated(&self, relative: &Path) -> bool {
		self.negated.is_match(relative)
	}
}

/// A pattern without glob metacharacters names exactly one path.
fn is_literal_pattern(pattern: &str) -> bool {
	!pattern.starts_with('!') && !pattern.contains(['*', '?', '[', ']', '{', '}'])
}

/// Make a pattern relative to `root`: strip a leading `./` and, for absolute
/// patterns inside the root, the root prefix.
fn normalize_pattern(root: &Path, pattern: &str) -> String {
	let pattern = pattern.trim();
	if let Some(rest) = pattern.strip_prefix("./") {
		return rest.to_string();
	}

	let as_path = Path::new(pattern);
	if as_path.is_absolute() {
		if let Ok(relative) = as_path.strip_prefix(root) {
			return relative.to_string_lossy().replace('\\', "/");
		}
	}

	pattern.to_string()
}

/// Find every file under the options' root that matches `patterns`.
///
/// Hidden directories, `node_modules` and `target` are never entered. Files
/// ignored by the root `.gitignore` (unless disabled) or by the configured
/// exclude patterns are skipped. A literal pattern naming an existing file
/// selects that file even when it lives in a skipped directory or is ignored;
/// only a `!` negation removes it. The result is sorted and free of
/// duplicates.
pub fn discover_files(patterns: &[String], options: &ProcessOptions) -> FixerResult<Vec<PathBuf>> {
	let root = options.root.as_path();
	let pattern_set = PatternSet::new(root, patterns)?;

	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;

	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();
	let walker = Walker {
		root,
		pattern_set: &pattern_set,
		gitignore: &gitignore,
		custom_exclude: &custom_exclude,
	};
	walker.walk_dir(root, &mut files, &mut visited_dirs)?;

	for pattern in patterns.iter().filter(|pattern| is_literal_pattern(pattern)) {
		let relative = PathBuf::from(normalize_pattern(root, pattern));
		let path = root.join(&relative);
		if path.is_file() && !pattern_set.is_negated(&relative) {
			files.push(path);
		}
	}

	files.sort();
	files.dedup();
	Ok(files)
}

/// Build a `Gitignore` matcher from the `[exclude]` patterns.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> FixerResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder
			.add_line(None, pattern)
			.map_err(|e| FixerError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			})?;
	}
	builder
		.build()
		.map_err(|e| FixerError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the root's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		if let Some(error) = builder.add(gitignore_path) {
			tracing::warn!(%error, "ignoring unreadable .gitignore");
		}
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

struct Walker<'a> {
	root: &'a Path,
	pattern_set: &'a PatternSet,
	gitignore: &'a Gitignore,
	custom_exclude: &'a Gitignore,
}

impl Walker<'_> {
	fn walk_dir(
		&self,
		dir: &Path,
		files: &mut Vec<PathBuf>,
		visited_dirs: &mut HashSet<PathBuf>,
	) -> FixerResult<()> {
		if !dir.is_dir() {
			return Ok(());
		}

		// Detect symlink cycles by tracking canonical paths.
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !visited_dirs.insert(canonical) {
			return Err(FixerError::SymlinkCycle {
				path: dir.display().to_string(),
			});
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();
			let is_dir = path.is_dir();

			if is_dir
				&& path
					.file_name()
					.and_then(|name| name.to_str())
					.is_some_and(is_ignored_directory_name)
			{
				continue;
			}

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.custom_exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				self.walk_dir(&path, files, visited_dirs)?;
			} else if let Ok(relative) = path.strip_prefix(self.root) {
				if self.pattern_set.is_match(relative) {
					files.push(path);
				}
			}
		}

		Ok(())
	}
}
