mod common;

use html_fixer_core::AnyEmptyResult;

#[test]
fn escape_reads_stdin_and_writes_stdout() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let output = common::html_fixer_cmd()
		.arg("escape")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("Click <here> & <div>I <3 you</div>")
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	let stdout = String::from_utf8(output)?;
	insta::assert_snapshot!(stdout, @"Click &lt;here&gt; &amp; <div>I &lt;3 you</div>");

	Ok(())
}

#[test]
fn escape_preserves_trailing_newlines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::html_fixer_cmd()
		.arg("escape")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("<!-- it's -->\nit's\n\n")
		.assert()
		.success()
		.stdout("<!-- it's -->\nit&#39;s\n\n");

	Ok(())
}

#[test]
fn escape_extended_mode() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::html_fixer_cmd()
		.arg("escape")
		.arg("--mode")
		.arg("extended")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("© “quoted” — done…")
		.assert()
		.success()
		.stdout("&copy; &ldquo;quoted&rdquo; &mdash; done&hellip;");

	Ok(())
}

#[test]
fn escape_verbose_reports_count_on_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::html_fixer_cmd()
		.arg("escape")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("a & b & c")
		.assert()
		.success()
		.stdout("a &amp; b &amp; c")
		.stderr(predicates::str::contains("2 entities escaped (essential mode)."));

	Ok(())
}

#[test]
fn escape_reads_and_writes_the_given_encoding() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let output = common::html_fixer_cmd()
		.arg("escape")
		.arg("--encoding")
		.arg("latin1")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin(b"Caf\xe9 & co".as_slice())
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	assert_eq!(output, b"Caf\xe9 &amp; co".to_vec());

	Ok(())
}

#[test]
fn escape_uses_the_configured_encoding() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "html-fixer.toml", "encoding = \"utf-16le\"\n")?;

	let input: Vec<u8> = "a & b".encode_utf16().flat_map(u16::to_le_bytes).collect();
	let expected: Vec<u8> = "a &amp; b"
		.encode_utf16()
		.flat_map(u16::to_le_bytes)
		.collect();

	let output = common::html_fixer_cmd()
		.arg("escape")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin(input)
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	assert_eq!(output, expected);

	Ok(())
}

#[test]
fn escape_rejects_input_that_does_not_decode() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::html_fixer_cmd()
		.arg("escape")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin(b"Caf\xe9 & co".as_slice())
		.assert()
		.code(2)
		.stdout(predicates::str::is_empty())
		.stderr(predicates::str::contains("`<stdin>` is not valid UTF-8"));

	Ok(())
}
