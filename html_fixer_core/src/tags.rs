use std::collections::HashSet;
use std::sync::LazyLock;

use derive_more::Deref;

/// HTML5 elements (void elements included), SVG elements and MathML elements.
///
/// Names are stored lowercased; lookups lowercase the candidate first.
const KNOWN_TAG_NAMES: &[&str] = &[
	// HTML
	"a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
	"blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col",
	"colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt",
	"em", "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
	"h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins",
	"kbd", "label", "legend", "li", "link", "main", "map", "mark", "math", "menu", "meta",
	"meter", "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p", "picture",
	"portal", "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "search",
	"section", "select", "slot", "small", "source", "span", "strong", "style", "sub", "summary",
	"sup", "svg", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "time",
	"title", "tr", "track", "u", "ul", "var", "video", "wbr",
	// SVG
	"animate", "animatemotion", "animatetransform", "circle", "clippath", "defs", "desc",
	"ellipse", "feblend", "fecolormatrix", "fecomponenttransfer", "fecomposite",
	"feconvolvematrix", "fediffuselighting", "fedisplacementmap", "fedistantlight",
	"fedropshadow", "feflood", "fefunca", "fefuncb", "fefuncg", "fefuncr", "fegaussianblur",
	"feimage", "femerge", "femergenode", "femorphology", "feoffset", "fepointlight",
	"fespecularlighting", "fespotlight", "fetile", "feturbulence", "filter", "foreignobject",
	"g", "image", "line", "lineargradient", "marker", "mask", "metadata", "mpath", "path",
	"pattern", "polygon", "polyline", "radialgradient", "rect", "set", "stop", "switch",
	"symbol", "text", "textpath", "tspan", "use", "view",
	// MathML
	"annotation", "annotation-xml", "maction", "merror", "mfrac", "mi", "mmultiscripts", "mn",
	"mo", "mover", "mpadded", "mphantom", "mprescripts", "mroot", "mrow", "ms", "mspace",
	"msqrt", "mstyle", "msub", "msubsup", "msup", "mtable", "mtd", "mtext", "mtr", "munder",
	"munderover", "none", "semantics",
];

static KNOWN_TAGS: LazyLock<HashSet<&'static str>> =
	LazyLock::new(|| KNOWN_TAG_NAMES.iter().copied().collect());

/// Whether `name` is a known HTML, SVG or MathML element, ignoring case.
pub fn is_known_tag(name: &str) -> bool {
	KNOWN_TAGS.contains(name.to_ascii_lowercase().as_str())
}

/// Whether `name` looks like markup on its own: a known element, a custom
/// element (contains `-`) or a component (leading uppercase letter).
pub fn is_valid_tag_name(name: &str) -> bool {
	if name.is_empty() {
		return false;
	}

	is_known_tag(name) || name.contains('-') || name.starts_with(|c: char| c.is_ascii_uppercase())
}

fn is_name_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || byte == b'-'
}

/// Extract the element name from a tag-shaped span: `<name ...>`,
/// `</name>` or `<name/>`.
pub fn extract_tag_name(span: &str) -> Option<&str> {
	let rest = span.strip_prefix('<')?;
	let rest = rest.strip_prefix('/').unwrap_or(rest);
	let len = rest.bytes().take_while(|&byte| is_name_byte(byte)).count();

	(len > 0).then(|| &rest[..len])
}

/// The element name of a span that is exactly a closing tag, `</name>`.
pub fn closing_tag_name(span: &str) -> Option<&str> {
	let name = span.strip_prefix("</")?.strip_suffix('>')?;

	(!name.is_empty() && name.bytes().all(is_name_byte)).then_some(name)
}

/// Names that appear as `</name>` somewhere in a document.
///
/// Lookups are case-sensitive: `<Book>` is not vouched for by `</book>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct ClosingTagRegistry(HashSet<String>);

impl ClosingTagRegistry {
	/// Record the name of `span` if it is a closing tag.
	pub fn observe(&mut self, span: &str) {
		if let Some(name) = closing_tag_name(span) {
			self.0.insert(name.to_string());
		}
	}

	pub fn has(&self, name: &str) -> bool {
		self.0.contains(name)
	}
}

impl<'a> FromIterator<&'a str> for ClosingTagRegistry {
	fn from_iter<T: IntoIterator<Item = &'a str>>(spans: T) -> Self {
		let mut registry = Self::default();
		for span in spans {
			registry.observe(span);
		}
		registry
	}
}

/// Whether a tag-shaped span is kept as markup or escaped as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagVerdict {
	PreserveAsMarkup,
	TreatAsText,
}

impl TagVerdict {
	pub fn is_markup(self) -> bool {
		self == Self::PreserveAsMarkup
	}
}

/// A tag-shaped span after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
	/// The extracted element name, if the span has one.
	pub name: Option<String>,
	pub verdict: TagVerdict,
}

impl TagToken {
	/// Extract the name of `span` and classify it against `registry`.
	pub fn from_span(span: &str, registry: &ClosingTagRegistry) -> Self {
		let name = extract_tag_name(span);
		let verdict = classify(name, span, registry);

		Self {
			name: name.map(ToString::to_string),
			verdict,
		}
	}
}

/// Decide whether a bracketed span is real markup.
///
/// Declarations and processing instructions (`<!`, `<?`) are always markup.
/// A span without an element name is text. Otherwise the span is markup when
/// its name is valid on its own, when a matching `</name>` exists in the
/// document, or when it is self-closing (`/>`).
pub fn classify(name: Option<&str>, span: &str, registry: &ClosingTagRegistry) -> TagVerdict {
	if span.starts_with("<!") || span.starts_with("<?") {
		return TagVerdict::PreserveAsMarkup;
	}

	let Some(name) = name else {
		return TagVerdict::TreatAsText;
	};

	if is_valid_tag_name(name) || registry.has(name) || span.trim().ends_with("/>") {
		TagVerdict::PreserveAsMarkup
	} else {
		TagVerdict::TreatAsText
	}
}
