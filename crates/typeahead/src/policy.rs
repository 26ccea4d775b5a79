use std::sync::LazyLock;

use ghostline_overlay::{AutoCloseConfig, SegmentArena};
use regex::Regex;

use crate::instruction::TypeaheadInstruction;
use crate::{DelayedBracePolicy, ImmediateBracePolicy};

/// Shape of the buffer a host produces when it expands a delayed brace
/// auto-close: the typed newline, the indented body line, and a synthesized
/// closing line.
pub(crate) static CURLY_AUTO_CLOSE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\n[ \t]*\n\s*\}").expect("static pattern"));

/// How one event's buffer was categorized during preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreprocessCategory {
	None,
	BracketOpen,
	QuoteOpen,
	QuoteClose,
	Braces,
}

/// Strategy for reconciling one language's host auto-close behavior with a
/// previewed suggestion.
///
/// Stateless aside from configuration; all dynamic state lives in the
/// [`SegmentArena`] the operations receive. Offsets follow the convention of
/// the reconciliation loop: `distance` indexes into the suggestion (and its
/// bracket table), `caret`/`event_offset` are document offsets.
pub trait TypeaheadPolicy: Send + Sync {
	/// Which bracket classes the host auto-closes under this policy.
	fn auto_close(&self) -> AutoCloseConfig;

	/// Whether the host defers brace auto-close until a line break is typed.
	fn braces_delayed(&self) -> bool;

	/// Detects a host-auto-inserted pair (or expanded brace template) in the
	/// inserted buffer and requests the rewrite that collapses it back to
	/// what the suggestion expects.
	fn preprocess_inserted_text(
		&self,
		distance: usize,
		event_offset: usize,
		input: &str,
		caret: usize,
		arena: &mut SegmentArena,
	) -> TypeaheadInstruction;

	/// After a normal insertion was verified, decides whether the caret owes
	/// a compensating nudge past a host-auto-inserted closing character.
	fn postprocess_inserted_text(
		&self,
		distance: usize,
		current_offset: usize,
		input: &str,
		arena: &SegmentArena,
	) -> TypeaheadInstruction;

	/// For a single keystroke about to be accepted by the host, decides
	/// whether the engine must synthesize the document edit itself because
	/// the caret sits mid-suggestion, where native auto-close will not fire.
	fn process_verified_keystroke(
		&self,
		distance: usize,
		input: char,
		caret: usize,
		expanded_caret: usize,
		arena: &SegmentArena,
	) -> TypeaheadInstruction;

	/// Recomputes the distance traversed after a deletion. Auto-inserted
	/// closes consume raw buffer slots that never counted as suggestion
	/// characters, so per-class padding is given back. May go negative; the
	/// caller treats that as backspacing past the invocation point.
	fn recompute_distance_on_delete(
		&self,
		deleted_len: usize,
		distance: usize,
		arena: &mut SegmentArena,
	) -> isize;

	/// Number of unresolved open brackets whose canonical close text would
	/// have to be synthesized if the session ended now.
	fn outstanding_padding(&self, arena: &SegmentArena) -> usize;
}

/// Policy for a language id, table-dispatched.
///
/// Languages whose hosts defer brace auto-close until a newline get
/// [`DelayedBracePolicy`]; everything else gets the immediate-brace variant.
pub fn policy_for_language(language_id: &str, config: AutoCloseConfig) -> Box<dyn TypeaheadPolicy> {
	match language_id {
		"java" | "c" | "cpp" | "csharp" => Box::new(DelayedBracePolicy::new(config)),
		_ => Box::new(ImmediateBracePolicy::new(config)),
	}
}
