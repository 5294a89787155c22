use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FixerError {
	#[error(transparent)]
	#[diagnostic(code(html_fixer::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(html_fixer::config_parse),
		help("check that html-fixer.toml is valid TOML with `mode`, [include] and/or [exclude] entries")
	)]
	ConfigParse(String),

	#[error("invalid file pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(html_fixer::invalid_pattern),
		help("patterns use glob syntax, e.g. `**/*.html` or `!vendor/**`")
	)]
	InvalidPattern { pattern: String, reason: String },

	#[error("unknown text encoding: `{0}`")]
	#[diagnostic(
		code(html_fixer::unknown_encoding),
		help("use a WHATWG encoding label such as utf-8, utf-16le, latin1 or windows-1252")
	)]
	UnknownEncoding(String),

	#[error("`{path}` is not valid {encoding}")]
	#[diagnostic(
		code(html_fixer::decode),
		help("pass `--encoding` with the encoding the file was saved in")
	)]
	Decode { path: String, encoding: String },

	#[error("escaped content of `{path}` cannot be represented in {encoding}")]
	#[diagnostic(code(html_fixer::encode))]
	Encode { path: String, encoding: String },

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(html_fixer::file_too_large),
		help("increase `max_file_size` in html-fixer.toml or exclude this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(html_fixer::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

pub type FixerResult<T> = Result<T, FixerError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
