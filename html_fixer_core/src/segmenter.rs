use std::ops::Range;

use logos::Lexer;
use logos::Logos;

use crate::tags::ClosingTagRegistry;
use crate::tags::TagToken;

/// Raw tokens produced by logos. Every byte of the input belongs to exactly
/// one token; constructs whose terminator never appears come back as errors
/// and are treated as text.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
	#[token("<![CDATA[", |lex| close_after(lex, "]]>"))]
	Cdata,
	#[token("<!--", |lex| close_after(lex, "-->"))]
	Comment,
	#[regex("<![dD][oO][cC][tT][yY][pP][eE]", |lex| close_after(lex, ">"))]
	Doctype,
	#[token("<?", |lex| close_after(lex, "?>"))]
	ProcessingInstruction,
	#[regex("</?[a-zA-Z]", |lex| close_after(lex, ">"))]
	Tag,
	#[regex("[^<]+")]
	Text,
	#[token("<")]
	LessThan,
}

/// Extend the current token through the first occurrence of `terminator`.
fn close_after(lex: &mut Lexer<'_, RawToken>, terminator: &str) -> bool {
	let Some(offset) = lex.remainder().find(terminator) else {
		return false;
	};

	lex.bump(offset + terminator.len());
	true
}

/// The flavour of a preserved markup span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
	Cdata,
	Comment,
	Doctype,
	ProcessingInstruction,
	Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
	/// Passed through untouched.
	Markup(MarkupKind),
	/// Subject to entity escaping.
	Text,
}

/// A contiguous byte range of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
	pub kind: SpanKind,
	pub range: Range<usize>,
}

impl Span {
	pub fn is_markup(&self) -> bool {
		matches!(self.kind, SpanKind::Markup(_))
	}

	/// The slice of `source` covered by this span.
	pub fn as_str<'a>(&self, source: &'a str) -> &'a str {
		&source[self.range.clone()]
	}
}

/// The spans of one document together with the closing tag names that were
/// used to classify them.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
	/// Ordered spans. Concatenating them reproduces the document exactly.
	pub spans: Vec<Span>,
	pub closing_tags: ClosingTagRegistry,
}

impl Segmentation {
	/// Rebuild the source document from its spans.
	pub fn reconstruct(&self, source: &str) -> String {
		self.spans.iter().map(|span| span.as_str(source)).collect()
	}
}

struct Candidate {
	kind: Option<MarkupKind>,
	range: Range<usize>,
}

fn scan(document: &str) -> Vec<Candidate> {
	RawToken::lexer(document)
		.spanned()
		.map(|(token, range)| {
			let kind = match token {
				Ok(RawToken::Cdata) => Some(MarkupKind::Cdata),
				Ok(RawToken::Comment) => Some(MarkupKind::Comment),
				Ok(RawToken::Doctype) => Some(MarkupKind::Doctype),
				Ok(RawToken::ProcessingInstruction) => Some(MarkupKind::ProcessingInstruction),
				Ok(RawToken::Tag) => Some(MarkupKind::Tag),
				Ok(RawToken::Text | RawToken::LessThan) | Err(()) => None,
			};

			Candidate { kind, range }
		})
		.collect()
}

/// Append `range` to `spans`, merging adjacent text.
fn push_span(spans: &mut Vec<Span>, kind: SpanKind, range: Range<usize>) {
	if kind == SpanKind::Text {
		if let Some(last) = spans.last_mut() {
			if last.kind == SpanKind::Text && last.range.end == range.start {
				last.range.end = range.end;
				return;
			}
		}
	}

	spans.push(Span { kind, range });
}

/// Split `document` into markup and text spans.
///
/// Closing tags are collected from the whole document before any tag is
/// classified, so an unknown element such as `<book>` is kept as markup when
/// `</book>` appears anywhere, including before it.
pub fn segment(document: &str) -> Segmentation {
	let candidates = scan(document);

	let closing_tags: ClosingTagRegistry = candidates
		.iter()
		.filter(|candidate| candidate.kind == Some(MarkupKind::Tag))
		.map(|candidate| &document[candidate.range.clone()])
		.collect();

	let mut spans = Vec::new();
	for Candidate { kind, range } in candidates {
		let kind = match kind {
			Some(MarkupKind::Tag) => {
				let raw = &document[range.clone()];
				let token = TagToken::from_span(raw, &closing_tags);
				if token.verdict.is_markup() {
					SpanKind::Markup(MarkupKind::Tag)
				} else {
					tracing::trace!(
						tag = raw,
						name = token.name.as_deref(),
						offset = range.start,
						"tag-shaped text will be escaped"
					);
					SpanKind::Text
				}
			}
			Some(kind) => SpanKind::Markup(kind),
			None => SpanKind::Text,
		};

		push_span(&mut spans, kind, range);
	}

	Segmentation {
		spans,
		closing_tags,
	}
}
