use std::fmt;
use std::str::FromStr;

use derive_more::Deref;
use serde::Deserialize;
use serde::Serialize;

/// Which tier of characters gets escaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
	/// Quotes, ampersands and angle brackets.
	#[default]
	Essential,
	/// Everything in [`EscapeMode::Essential`] plus common typographic symbols
	/// such as `©`, `™` and dashes.
	Extended,
}

impl EscapeMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Essential => "essential",
			Self::Extended => "extended",
		}
	}
}

impl fmt::Display for EscapeMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EscapeMode {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"essential" => Ok(Self::Essential),
			"extended" => Ok(Self::Extended),
			other => Err(format!(
				"unknown escape mode `{other}`, expected `essential` or `extended`"
			)),
		}
	}
}

/// A literal and the entity it is replaced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityEntry {
	pub literal: &'static str,
	pub entity: &'static str,
}

const fn entry(literal: &'static str, entity: &'static str) -> EntityEntry {
	EntityEntry { literal, entity }
}

/// `&` leads so that a literal ampersand is never confused with the start of
/// an entity produced by a later entry.
const ESSENTIAL_ENTITIES: &[EntityEntry] = &[
	entry("&", "&amp;"),
	entry("<", "&lt;"),
	entry(">", "&gt;"),
	entry("\"", "&quot;"),
	entry("'", "&#39;"),
];

/// The essential tier followed by the typographic additions.
const EXTENDED_ENTITIES: &[EntityEntry] = &[
	entry("&", "&amp;"),
	entry("<", "&lt;"),
	entry(">", "&gt;"),
	entry("\"", "&quot;"),
	entry("'", "&#39;"),
	entry("\u{00A9}", "&copy;"),
	entry("\u{00AE}", "&reg;"),
	entry("\u{2122}", "&trade;"),
	entry("\u{2014}", "&mdash;"),
	entry("\u{2013}", "&ndash;"),
	entry("\u{2026}", "&hellip;"),
	entry("\u{2018}", "&lsquo;"),
	entry("\u{2019}", "&rsquo;"),
	entry("\u{201C}", "&ldquo;"),
	entry("\u{201D}", "&rdquo;"),
	entry("\u{2022}", "&bull;"),
	entry("\u{00B0}", "&deg;"),
	entry("\u{00B1}", "&plusmn;"),
	entry("\u{00D7}", "&times;"),
	entry("\u{00F7}", "&divide;"),
	entry("\u{20AC}", "&euro;"),
	entry("\u{00A3}", "&pound;"),
	entry("\u{00A5}", "&yen;"),
	entry("\u{00A7}", "&sect;"),
	entry("\u{00B6}", "&para;"),
	entry("\u{00A0}", "&nbsp;"),
];

/// An ordered, read-only view over the entries for one [`EscapeMode`].
///
/// Order is the tie-break when more than one literal could match at the same
/// position: the first entry wins.
#[derive(Debug, Clone, Copy, Deref)]
pub struct EntityTable(&'static [EntityEntry]);

impl EntityTable {
	/// Return the first entry whose literal starts `text`.
	pub fn match_at(&self, text: &str) -> Option<&'static EntityEntry> {
		self.0.iter().find(|entry| text.starts_with(entry.literal))
	}
}

/// The entity table for `mode`.
pub fn entities_for(mode: EscapeMode) -> EntityTable {
	match mode {
		EscapeMode::Essential => EntityTable(ESSENTIAL_ENTITIES),
		EscapeMode::Extended => EntityTable(EXTENDED_ENTITIES),
	}
}

/// Length in bytes of an already-escaped entity at the start of `text`.
///
/// Recognizes named references (`&amp;`), decimal references (`&#39;`) and
/// hexadecimal references (`&#x27;`). The terminating `;` is required.
pub fn escaped_entity_len(text: &str) -> Option<usize> {
	let bytes = text.as_bytes();
	if bytes.first() != Some(&b'&') {
		return None;
	}

	let body_len = match bytes.get(1)? {
		b'#' => match bytes.get(2)? {
			b'x' | b'X' => {
				let digits = count_while(&bytes[3..], u8::is_ascii_hexdigit);
				(digits > 0).then_some(2 + digits)?
			}
			_ => {
				let digits = count_while(&bytes[2..], u8::is_ascii_digit);
				(digits > 0).then_some(1 + digits)?
			}
		},
		first if first.is_ascii_alphabetic() => {
			1 + count_while(&bytes[2..], u8::is_ascii_alphanumeric)
		}
		_ => return None,
	};

	let end = 1 + body_len;
	(bytes.get(end) == Some(&b';')).then_some(end + 1)
}

fn count_while(bytes: &[u8], predicate: impl Fn(&u8) -> bool) -> usize {
	bytes.iter().take_while(|&byte| predicate(byte)).count()
}
