use crate::entities::EntityTable;
use crate::entities::EscapeMode;
use crate::entities::entities_for;
use crate::entities::escaped_entity_len;
use crate::segmenter::SpanKind;
use crate::segmenter::segment;

/// The outcome of escaping one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeResult {
	/// The escaped document.
	pub content: String,
	/// Number of literals that were replaced with entities.
	pub escaped_count: usize,
	/// `true` exactly when `escaped_count > 0`.
	pub has_changes: bool,
}

impl EscapeResult {
	fn new(content: String, escaped_count: usize) -> Self {
		Self {
			content,
			escaped_count,
			has_changes: escaped_count > 0,
		}
	}
}

/// Escape the literals of `table` in a run of plain text.
///
/// Entities that are already escaped (`&amp;`, `&#39;`, `&#x27;`) are copied
/// through unchanged, so escaping is idempotent. Returns the escaped text and
/// the number of replacements.
pub fn escape_text(text: &str, table: &EntityTable) -> (String, usize) {
	let mut output = String::with_capacity(text.len());
	let mut count = 0;
	let mut cursor = 0;

	while cursor < text.len() {
		let rest = &text[cursor..];

		if let Some(len) = escaped_entity_len(rest) {
			output.push_str(&rest[..len]);
			cursor += len;
			continue;
		}

		if let Some(entry) = table.match_at(rest) {
			output.push_str(entry.entity);
			cursor += entry.literal.len();
			count += 1;
			continue;
		}

		let Some(ch) = rest.chars().next() else {
			break;
		};
		output.push(ch);
		cursor += ch.len_utf8();
	}

	(output, count)
}

/// Escape entities in the text content of `document`, leaving tags,
/// comments, CDATA sections, doctype declarations and processing
/// instructions exactly as they are.
///
/// Tag-shaped text that is not real markup (`<3`, `<here>` without a
/// matching `</here>`) is escaped like any other text.
pub fn escape_html(document: &str, mode: EscapeMode) -> EscapeResult {
	let table = entities_for(mode);
	let segmentation = segment(document);
	let mut content = String::with_capacity(document.len());
	let mut escaped_count = 0;

	for span in &segmentation.spans {
		let raw = span.as_str(document);
		match span.kind {
			SpanKind::Markup(_) => content.push_str(raw),
			SpanKind::Text => {
				let (escaped, count) = escape_text(raw, &table);
				content.push_str(&escaped);
				escaped_count += count;
			}
		}
	}

	tracing::debug!(
		mode = %mode,
		spans = segmentation.spans.len(),
		escaped_count,
		"escaped document"
	);

	EscapeResult::new(content, escaped_count)
}

/// Whether escaping `document` in `mode` would change anything.
pub fn has_unescaped_entities(document: &str, mode: EscapeMode) -> bool {
	escape_html(document, mode).has_changes
}
