use std::path::Path;

use assert_cmd::Command;
use html_fixer_core::AnyEmptyResult;
use insta_cmd::get_cargo_bin;

pub fn html_fixer_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("html-fixer"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

/// Write `content` to `relative` under `root`, creating parent directories.
#[allow(dead_code)]
pub fn write_file(root: &Path, relative: &str, content: impl AsRef<[u8]>) -> AnyEmptyResult {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)?;
	Ok(())
}
