use ghostline_overlay::{AutoCloseConfig, SegmentArena};

use crate::instruction::{DocEdit, TypeaheadInstruction};
use crate::policy::{CURLY_AUTO_CLOSE, PreprocessCategory, TypeaheadPolicy};

/// Policy for hosts that defer brace auto-close until a line break and treat
/// angle brackets as part of the round/square bracket class.
///
/// Deleting an unresolved open under such hosts also removes the
/// auto-inserted close, so deletion gives back one slot of padding per
/// non-brace unresolved open walked over. The padding accounting is a
/// heuristic tuned against observed host behavior; deeply nested mixed
/// bracket/quote runs have acknowledged edge cases.
#[derive(Debug, Clone)]
pub struct DelayedBracePolicy {
	config: AutoCloseConfig,
}

impl DelayedBracePolicy {
	/// Builds the policy from the host's auto-close preferences. The angle
	/// bracket class follows the round/square bracket flag, as the host does
	/// not distinguish them.
	pub fn new(config: AutoCloseConfig) -> Self {
		Self {
			config: AutoCloseConfig {
				angle_brackets: config.brackets,
				..config
			},
		}
	}

	fn class_auto_closes(&self, symbol: char) -> bool {
		match symbol {
			')' | ']' | '>' => self.config.brackets,
			'"' | '\'' => self.config.quotes,
			_ => false,
		}
	}

	fn categorize(
		&self,
		distance: usize,
		input: &str,
		arena: &mut SegmentArena,
	) -> PreprocessCategory {
		let symbol = arena.bracket_symbol(distance);
		let first = input.chars().next();

		if matches!(input, "()" | "<>" | "[]") && symbol == first {
			arena.set_auto_close_seen(distance);
			return PreprocessCategory::BracketOpen;
		}
		if matches!(input, "\"\"" | "''") && symbol == first {
			if arena.open_at(distance).is_some() {
				arena.set_auto_close_seen(distance);
				return PreprocessCategory::QuoteOpen;
			}
			return PreprocessCategory::QuoteClose;
		}
		if CURLY_AUTO_CLOSE.is_match(input) {
			for idx in distance..arena.len() {
				if arena.open_at(idx).is_some_and(|open| open.symbol == '{') {
					arena.set_auto_close_seen(idx);
					break;
				}
			}
			return PreprocessCategory::Braces;
		}
		PreprocessCategory::None
	}
}

impl TypeaheadPolicy for DelayedBracePolicy {
	fn auto_close(&self) -> AutoCloseConfig {
		self.config
	}

	fn braces_delayed(&self) -> bool {
		true
	}

	fn preprocess_inserted_text(
		&self,
		distance: usize,
		event_offset: usize,
		input: &str,
		_caret: usize,
		arena: &mut SegmentArena,
	) -> TypeaheadInstruction {
		if input.is_empty() || distance >= arena.len() {
			return TypeaheadInstruction::none();
		}
		match self.categorize(distance, input, arena) {
			PreprocessCategory::BracketOpen | PreprocessCategory::QuoteOpen => {
				// The host inserted both halves at once; collapse to the one
				// logical character the suggestion expects.
				TypeaheadInstruction {
					edit: Some(DocEdit {
						offset: event_offset,
						length: 2,
						content: input[..1].to_string(),
					}),
					caret: None,
				}
			}
			PreprocessCategory::QuoteClose => TypeaheadInstruction {
				edit: Some(DocEdit {
					offset: event_offset,
					length: 2,
					content: input[..1].to_string(),
				}),
				caret: None,
			},
			PreprocessCategory::Braces => truncate_brace_template(event_offset, input),
			PreprocessCategory::None => TypeaheadInstruction::none(),
		}
	}

	fn postprocess_inserted_text(
		&self,
		distance: usize,
		current_offset: usize,
		input: &str,
		arena: &SegmentArena,
	) -> TypeaheadInstruction {
		if distance >= arena.len() {
			return TypeaheadInstruction::none();
		}
		let Some(close) = arena.close_at(distance) else {
			return TypeaheadInstruction::none();
		};
		if input.chars().count() != 1 || input.chars().next() != Some(close.symbol) {
			return TypeaheadInstruction::none();
		}
		let open = arena
			.open(close.paired_open)
			.expect("close brackets pair with opens");
		if open.resolved || !open.auto_close_seen || !self.class_auto_closes(close.symbol) {
			return TypeaheadInstruction::none();
		}
		TypeaheadInstruction {
			edit: None,
			caret: Some(current_offset + 1),
		}
	}

	fn process_verified_keystroke(
		&self,
		distance: usize,
		input: char,
		caret: usize,
		expanded_caret: usize,
		arena: &SegmentArena,
	) -> TypeaheadInstruction {
		if distance >= arena.len() {
			return TypeaheadInstruction::none();
		}
		let Some(close) = arena.close_at(distance) else {
			return TypeaheadInstruction::none();
		};
		if close.symbol != input || !self.class_auto_closes(input) {
			return TypeaheadInstruction::none();
		}
		let open = arena
			.open(close.paired_open)
			.expect("close brackets pair with opens");
		if open.resolved || !open.auto_close_seen {
			return TypeaheadInstruction::none();
		}
		TypeaheadInstruction {
			edit: Some(DocEdit {
				offset: expanded_caret,
				length: 0,
				content: input.to_string(),
			}),
			caret: Some(caret + 1),
		}
	}

	fn recompute_distance_on_delete(
		&self,
		deleted_len: usize,
		distance: usize,
		arena: &mut SegmentArena,
	) -> isize {
		let mut padding = 0isize;
		for i in 1..=deleted_len {
			if i > distance {
				break;
			}
			let idx = distance - i;
			if let Some(open) = arena.open_at(idx) {
				if !open.resolved && open.symbol != '{' {
					padding += 1;
				}
			}
			arena.mark_deleted(idx);
		}
		distance as isize - (deleted_len as isize - padding)
	}

	fn outstanding_padding(&self, arena: &SegmentArena) -> usize {
		arena
			.opens_reverse()
			.filter(|open| !open.resolved && open.symbol != '{')
			.count()
	}
}

pub(crate) fn truncate_brace_template(event_offset: usize, input: &str) -> TypeaheadInstruction {
	let Some(first_nl) = input.find('\n') else {
		return TypeaheadInstruction::none();
	};
	let Some(second_nl) = input[first_nl + 1..].find('\n').map(|i| first_nl + 1 + i) else {
		return TypeaheadInstruction::none();
	};
	TypeaheadInstruction {
		edit: Some(DocEdit {
			offset: event_offset,
			length: input.len(),
			content: input[..second_nl].to_string(),
		}),
		caret: None,
	}
}
