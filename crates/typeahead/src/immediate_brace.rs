use ghostline_overlay::{AutoCloseConfig, SegmentArena};

use crate::delayed_brace::truncate_brace_template;
use crate::instruction::{DocEdit, TypeaheadInstruction};
use crate::policy::{CURLY_AUTO_CLOSE, PreprocessCategory, TypeaheadPolicy};

/// Policy for hosts that auto-close every class immediately, braces included.
///
/// Deleting an unresolved open does not delete its auto-inserted close under
/// these hosts, so deletion needs no padding compensation and teardown owes
/// no padding either.
#[derive(Debug, Clone)]
pub struct ImmediateBracePolicy {
	config: AutoCloseConfig,
}

impl ImmediateBracePolicy {
	/// Builds the policy from the host's auto-close preferences.
	pub fn new(config: AutoCloseConfig) -> Self {
		Self { config }
	}

	fn categorize(
		&self,
		distance: usize,
		input: &str,
		arena: &mut SegmentArena,
	) -> PreprocessCategory {
		let symbol = arena.bracket_symbol(distance);
		let first = input.chars().next();

		if matches!(input, "()" | "<>" | "[]" | "{}") && symbol == first {
			arena.set_auto_close_seen(distance);
			return PreprocessCategory::BracketOpen;
		}
		if matches!(input, "\"\"" | "''")
			&& symbol == first
			&& arena.open_at(distance).is_some()
		{
			arena.set_auto_close_seen(distance);
			return PreprocessCategory::QuoteOpen;
		}
		if CURLY_AUTO_CLOSE.is_match(input) {
			arena.set_auto_close_seen(distance);
			return PreprocessCategory::Braces;
		}
		PreprocessCategory::None
	}
}

impl TypeaheadPolicy for ImmediateBracePolicy {
	fn auto_close(&self) -> AutoCloseConfig {
		self.config
	}

	fn braces_delayed(&self) -> bool {
		false
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
				// Collapse the auto-inserted pair to the single open the
				// suggestion expects.
				TypeaheadInstruction {
					edit: Some(DocEdit {
						offset: event_offset,
						length: 2,
						content: input[..1].to_string(),
					}),
					caret: None,
				}
			}
			PreprocessCategory::Braces => truncate_brace_template(event_offset, input),
			_ => TypeaheadInstruction::none(),
		}
	}

	fn postprocess_inserted_text(
		&self,
		_distance: usize,
		_current_offset: usize,
		_input: &str,
		_arena: &SegmentArena,
	) -> TypeaheadInstruction {
		TypeaheadInstruction::none()
	}

	fn process_verified_keystroke(
		&self,
		_distance: usize,
		_input: char,
		_caret: usize,
		_expanded_caret: usize,
		_arena: &SegmentArena,
	) -> TypeaheadInstruction {
		TypeaheadInstruction::none()
	}

	fn recompute_distance_on_delete(
		&self,
		deleted_len: usize,
		distance: usize,
		arena: &mut SegmentArena,
	) -> isize {
		for i in 1..=deleted_len {
			if i > distance {
				break;
			}
			arena.mark_deleted(distance - i);
		}
		distance as isize - deleted_len as isize
	}

	fn outstanding_padding(&self, _arena: &SegmentArena) -> usize {
		// Deleting an unresolved open leaves its close in the buffer here,
		// so there is never padding to give back.
		0
	}
}
