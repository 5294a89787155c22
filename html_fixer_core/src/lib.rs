//! `html_fixer_core` escapes HTML entities in the text content of HTML, JSX
//! and XML-ish documents while leaving markup untouched. Quotes, ampersands
//! and angle brackets (and, in extended mode, typographic symbols) are
//! replaced with entities; tags, comments, CDATA sections, doctype
//! declarations and processing instructions are copied through byte for
//! byte.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document text
//!   → Segmenter (logos lexer splits markup-shaped spans from text)
//!   → Closing-tag pre-scan (collects every `</name>` in the document)
//!   → Tag classifier (real markup is preserved, `<3` or `<here>` becomes text)
//!   → Entity escaper (escapes text spans, skipping already-escaped entities)
//!   → Spans rejoined in order, with a count of replacements
//! ```
//!
//! ## Modules
//!
//! - [`entities`]: Escape modes and their ordered entity tables.
//! - [`tags`]: Known element names, tag name extraction and classification.
//! - [`segmenter`]: Splitting a document into markup and text spans.
//! - [`config`]: Configuration loading from `html-fixer.toml`.
//! - [`processor`]: File discovery, reading, writing and batch summaries.
//!
//! ## Quick Start
//!
//! ```rust
//! use html_fixer_core::EscapeMode;
//! use html_fixer_core::escape_html;
//!
//! let result = escape_html(r#"<p class="x">Tom & "Jerry"</p>"#, EscapeMode::Essential);
//! assert_eq!(result.content, r#"<p class="x">Tom &amp; &quot;Jerry&quot;</p>"#);
//! assert_eq!(result.escaped_count, 3);
//! assert!(result.has_changes);
//! ```

pub use encoding::*;
pub use entities::EscapeMode;
pub use error::*;
pub use escaper::*;

pub mod config;
mod encoding;
pub mod entities;
#[allow(unused_assignments)]
mod error;
mod escaper;
pub mod processor;
pub mod segmenter;
pub mod tags;
