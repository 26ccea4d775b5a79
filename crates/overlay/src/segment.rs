use crate::AutoCloseConfig;

/// Index of a segment within its [`SegmentArena`](crate::SegmentArena).
///
/// Bracket halves reference their partner by id rather than by pointer, so
/// the symmetric pairing never forms an ownership cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(pub(crate) usize);

impl SegmentId {
	/// Raw arena index.
	pub fn index(self) -> usize {
		self.0
	}
}

/// One renderable or logical unit of a suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// A run of ordinary suggestion text spanning one line.
	Normal {
		/// Absolute document offset of the first character.
		start_offset: usize,
		/// Absolute document offset one past the last character.
		end_offset: usize,
		/// Zero-based line within the suggestion.
		line: usize,
		/// Line text with matched closing brackets blanked out.
		text: String,
	},
	/// The opening half of a paired bracket.
	Open(OpenBracket),
	/// The closing half of a paired bracket, rendered standalone.
	Close(CloseBracket),
	/// Text displaced from the invocation line, rendered struck through.
	RightContext {
		/// The displaced text.
		strike_text: String,
		/// First line of the suggestion it is anchored after.
		first_line: String,
	},
}

/// Opening half of a bracket pair.
///
/// `resolved` tracks typing state, not pairing: it starts `true`, flips to
/// `false` when the user types over the open (its close is now owed by the
/// ghost overlay), and back to `true` once the close is typed or the open is
/// deleted. Teardown synthesizes auto-close text for every open left
/// unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBracket {
	/// Absolute document offset of the bracket character.
	pub offset: usize,
	/// The opening symbol.
	pub symbol: char,
	/// Indentation of the line holding the bracket, used to synthesize a
	/// correctly indented closing line for multi-line braces.
	pub indent: String,
	/// Typing state; see the type docs.
	pub resolved: bool,
	/// Whether the host's auto-close fired for this bracket during preview.
	pub auto_close_seen: bool,
	/// Partner id; always set for arena-resident opens.
	pub paired_close: Option<SegmentId>,
}

impl OpenBracket {
	/// The canonical text a non-suppressed auto-close editor would have
	/// inserted for this bracket, or `None` when the bracket is resolved or
	/// its class is not configured to auto-close.
	pub fn auto_close_content(&self, config: AutoCloseConfig) -> Option<String> {
		if self.resolved || !config.closes(self.symbol) {
			return None;
		}
		let content = match self.symbol {
			'(' => ")".to_string(),
			'[' => "]".to_string(),
			'<' => ">".to_string(),
			'"' => "\"".to_string(),
			'\'' => "'".to_string(),
			'{' => format!("\n{}}}", self.indent),
			_ => return None,
		};
		Some(content)
	}
}

/// Closing half of a bracket pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseBracket {
	/// Absolute document offset of the bracket character.
	pub offset: usize,
	/// Zero-based line within the suggestion.
	pub line: usize,
	/// Text of the line up to (not including) the bracket, as measured text
	/// for horizontal placement by the renderer.
	pub line_prefix: String,
	/// The closing symbol.
	pub symbol: char,
	/// Partner id; set at link time, symmetric with the open's back-link.
	pub paired_open: SegmentId,
}

/// The closing symbol expected for an opening one.
pub(crate) fn expected_close(open: char) -> Option<char> {
	match open {
		'(' => Some(')'),
		'[' => Some(']'),
		'{' => Some('}'),
		'<' => Some('>'),
		'"' => Some('"'),
		'\'' => Some('\''),
		_ => None,
	}
}
