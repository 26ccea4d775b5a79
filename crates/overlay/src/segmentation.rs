use smallvec::SmallVec;

use crate::SegmentArena;
use crate::segment::{CloseBracket, OpenBracket, Segment, expected_close};

struct UnresolvedOpen {
	symbol: char,
	abs_idx: usize,
	indent: String,
}

/// Scans a suggestion into segments and the offset-indexed bracket table.
///
/// Single left-to-right pass, line by line. Paired punctuation is matched
/// with a stack; a matched close is blanked out of its line's normal text and
/// both halves become standalone segments. Mismatched punctuation degrades to
/// literal text and is never an error. `caret_line_indent` is the indentation
/// prefix of the document line holding the caret, used for the first
/// suggestion line (which continues that line) and for synthesizing closing
/// lines of multi-line braces.
///
/// With `delayed_braces` set, an open `{` registers in the bracket table at
/// the first newline after it; hosts with delayed brace auto-close only
/// insert the `}` once that line break is typed.
pub fn segment_suggestion(
	text: &str,
	invocation_offset: usize,
	caret_line_indent: &str,
	delayed_braces: bool,
) -> SegmentArena {
	let mut arena = SegmentArena::new(text.len());
	let mut stack: SmallVec<[UnresolvedOpen; 8]> = SmallVec::new();
	let bytes = text.as_bytes();

	let mut line_start = 0;
	let mut line_no = 0;
	loop {
		let rest = &text[line_start..];
		let (line_len, sep_len) = match rest.find('\n') {
			Some(nl) if nl > 0 && rest.as_bytes()[nl - 1] == b'\r' => (nl - 1, 2),
			Some(nl) => (nl, 1),
			None => (rest.len(), 0),
		};
		let line = &text[line_start..line_start + line_len];

		let indent = if line_no == 0 {
			caret_line_indent.to_string()
		} else {
			let first_non_ws = line
				.find(|c: char| c != ' ' && c != '\t')
				.unwrap_or(line.len());
			line[..first_non_ws].to_string()
		};

		let mut blanked = line.to_string();
		for (j, c) in line.char_indices() {
			let abs_idx = line_start + j;
			// A bracket preceded by whitespace is a comparison operator, not
			// an angle bracket. Deliberately approximate.
			let after_ws = abs_idx > 0 && bytes[abs_idx - 1].is_ascii_whitespace();
			if is_close_bracket(c, after_ws, &stack) {
				let Some(top) = stack.pop() else {
					continue;
				};
				if expected_close(top.symbol) != Some(c) {
					// Dropped without re-push; the close stays literal text.
					continue;
				}
				let open_id = arena.push(Segment::Open(OpenBracket {
					offset: invocation_offset + top.abs_idx,
					symbol: top.symbol,
					indent: top.indent,
					resolved: true,
					auto_close_seen: false,
					paired_close: None,
				}));
				let close_id = arena.push(Segment::Close(CloseBracket {
					offset: invocation_offset + abs_idx,
					line: line_no,
					line_prefix: line[..j].to_string(),
					symbol: c,
					paired_open: open_id,
				}));
				if let Segment::Open(open) = arena.get_mut(open_id) {
					open.paired_close = Some(close_id);
				}

				let open_slot = if top.symbol == '{' && delayed_braces {
					text[top.abs_idx..]
						.find('\n')
						.map(|nl| top.abs_idx + nl)
						.unwrap_or(top.abs_idx)
				} else {
					top.abs_idx
				};
				arena.register(open_slot, open_id);
				arena.register(abs_idx, close_id);
				blanked.replace_range(j..j + 1, " ");
			} else if is_open_bracket(c, after_ws) {
				stack.push(UnresolvedOpen {
					symbol: c,
					abs_idx,
					indent: indent.clone(),
				});
			}
		}

		let start_offset = invocation_offset + line_start;
		arena.push(Segment::Normal {
			start_offset,
			end_offset: start_offset + line.len(),
			line: line_no,
			text: blanked,
		});

		if sep_len == 0 {
			break;
		}
		line_start += line_len + sep_len;
		line_no += 1;
		if line_start >= text.len() {
			break;
		}
	}

	arena
}

fn is_close_bracket(c: char, after_ws: bool, stack: &[UnresolvedOpen]) -> bool {
	match c {
		'"' | '\'' => stack.last().is_some_and(|top| top.symbol == c),
		'>' => !after_ws,
		')' | ']' | '}' => true,
		_ => false,
	}
}

fn is_open_bracket(c: char, after_ws: bool) -> bool {
	match c {
		'<' => !after_ws,
		'(' | '[' | '{' | '"' | '\'' => true,
		_ => false,
	}
}
