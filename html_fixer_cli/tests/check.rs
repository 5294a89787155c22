mod common;

use clap::Parser;
use html_fixer_cli::Commands;
use html_fixer_cli::HtmlFixerCli;
use html_fixer_cli::OutputFormat;
use html_fixer_core::AnyEmptyResult;
use rstest::rstest;
use serde_json::Value;
use similar_asserts::assert_eq;

#[test]
fn check_passes_when_escaped() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(
		tmp.path(),
		"index.html",
		"<!DOCTYPE html>\n<p title=\"a&b\">Tom &amp; Jerry</p>\n",
	)?;

	common::html_fixer_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Check passed: no unescaped entities in 1 file(s).",
		));

	Ok(())
}

#[test]
fn check_fails_when_unescaped() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "page.html", "<p>Click <here> now</p>\n")?;

	common::html_fixer_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("Check failed."))
		.stderr(predicates::str::contains("page.html (2)"))
		.stderr(predicates::str::contains(
			"2 entities need escaping in 1 file(s). Run `html-fixer fix` to escape them.",
		));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("page.html"))?,
		"<p>Click <here> now</p>\n"
	);

	Ok(())
}

#[test]
fn check_shows_diff() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "page.html", "<h1>Title</h1>\n<p>It's</p>\n")?;

	common::html_fixer_cmd()
		.arg("check")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("   <h1>Title</h1>"))
		.stderr(predicates::str::contains("  -<p>It's</p>"))
		.stderr(predicates::str::contains("  +<p>It&#39;s</p>"));

	Ok(())
}

#[test]
fn check_outputs_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "page.html", "<p>\"quoted\"</p>")?;
	common::write_file(tmp.path(), "clean.html", "<p>fine</p>")?;

	let output = common::html_fixer_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.get_output()
		.stdout
		.clone();

	let report: Value = serde_json::from_slice(&output)?;
	assert_eq!(report["ok"], Value::Bool(false));
	assert_eq!(report["total_files"], 2);
	assert_eq!(report["files_with_changes"], 1);
	assert_eq!(report["total_entities_escaped"], 2);
	assert_eq!(report["failed_files"], 0);
	assert_eq!(report["files"][0]["file"], "page.html");
	assert_eq!(report["files"][0]["escaped_count"], 2);
	assert_eq!(report["errors"], Value::Array(vec![]));

	Ok(())
}

#[test]
fn check_outputs_json_when_clean() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "page.html", "<p>fine</p>")?;

	let output = common::html_fixer_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	let report: Value = serde_json::from_slice(&output)?;
	assert_eq!(report["ok"], Value::Bool(true));
	assert_eq!(report["total_files"], 1);

	Ok(())
}

#[test]
fn check_outputs_github_annotations() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "docs/page.html", "Tom & Jerry")?;
	common::write_file(tmp.path(), "bad.html", [0xff, 0xfe])?;

	common::html_fixer_cmd()
		.arg("check")
		.arg("--format")
		.arg("github")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains(
			"::warning file=docs/page.html::1 unescaped entities",
		))
		.stdout(predicates::str::contains(
			"::error file=bad.html::Could not check file:",
		))
		.stderr(predicates::str::contains("1 file(s) could not be checked"));

	Ok(())
}

#[test]
fn check_honors_mode() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "page.html", "<p>© 2024</p>")?;

	common::html_fixer_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::html_fixer_cmd()
		.arg("check")
		.arg("--mode")
		.arg("extended")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("page.html (1)"));

	Ok(())
}

#[rstest]
#[case::defaults(&["html-fixer", "check"], false, OutputFormat::Text)]
#[case::diff(&["html-fixer", "check", "--diff"], true, OutputFormat::Text)]
#[case::json(&["html-fixer", "check", "--format", "json"], false, OutputFormat::Json)]
#[case::github(
	&["html-fixer", "check", "--diff", "--format", "github"],
	true,
	OutputFormat::Github
)]
fn check_flags_are_accepted_by_cli_parser(
	#[case] argv: &[&str],
	#[case] expected_diff: bool,
	#[case] expected_format: OutputFormat,
) {
	let cli = HtmlFixerCli::parse_from(argv);
	let Some(Commands::Check {
		diff,
		format,
		patterns,
	}) = cli.command
	else {
		panic!("expected Check command");
	};

	assert_eq!(diff, expected_diff);
	assert_eq!(format, expected_format);
	assert!(patterns.is_empty());
}

#[rstest]
#[case::unknown_format(&["html-fixer", "check", "--format", "xml"])]
#[case::missing_format(&["html-fixer", "check", "--format"])]
fn check_rejects_invalid_flags(#[case] argv: &[&str]) {
	assert!(HtmlFixerCli::try_parse_from(argv).is_err());
}
