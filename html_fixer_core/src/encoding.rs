use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use encoding_rs::Encoding;
use encoding_rs::UTF_8;
use encoding_rs::UTF_16BE;
use encoding_rs::UTF_16LE;

use crate::FixerError;
use crate::FixerResult;

/// The text encoding files are read and written with.
///
/// Byte order marks are kept as part of the content so that a file is written
/// back exactly as it was read, apart from the escaped entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl Default for TextEncoding {
	fn default() -> Self {
		Self(UTF_8)
	}
}

impl fmt::Display for TextEncoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl TextEncoding {
	/// Resolve a WHATWG encoding label such as `utf-8`, `utf-16le` or
	/// `latin1`.
	pub fn for_label(label: &str) -> FixerResult<Self> {
		Encoding::for_label(label.trim().as_bytes())
			.map(Self)
			.ok_or_else(|| FixerError::UnknownEncoding(label.to_string()))
	}

	/// The canonical name of the encoding.
	pub fn name(self) -> &'static str {
		self.0.name()
	}

	/// Decode the bytes read from `path`. Malformed input is an error rather
	/// than being replaced.
	pub fn decode(self, bytes: &[u8], path: &Path) -> FixerResult<String> {
		self.0
			.decode_without_bom_handling_and_without_replacement(bytes)
			.map(Cow::into_owned)
			.ok_or_else(|| FixerError::Decode {
				path: path.display().to_string(),
				encoding: self.name().to_string(),
			})
	}

	/// Encode `text` for writing to `path`. Characters the encoding cannot
	/// represent are an error.
	pub fn encode(self, text: &str, path: &Path) -> FixerResult<Vec<u8>> {
		// encoding_rs only encodes to UTF-8 for the UTF-16 family.
		if self.0 == UTF_16LE {
			return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
		}
		if self.0 == UTF_16BE {
			return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
		}

		let (bytes, _, had_errors) = self.0.encode(text);
		if had_errors {
			return Err(FixerError::Encode {
				path: path.display().to_string(),
				encoding: self.name().to_string(),
			});
		}

		Ok(bytes.into_owned())
	}
}
