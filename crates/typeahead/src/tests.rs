use ghostline_overlay::{AutoCloseConfig, segment_suggestion};
use pretty_assertions::assert_eq;

use crate::{DelayedBracePolicy, DocEdit, ImmediateBracePolicy, TypeaheadPolicy, policy_for_language};

fn delayed() -> DelayedBracePolicy {
	DelayedBracePolicy::new(AutoCloseConfig::default())
}

fn immediate() -> ImmediateBracePolicy {
	ImmediateBracePolicy::new(AutoCloseConfig::default())
}

#[test]
fn auto_inserted_pair_collapses_to_open_character() {
	// Typing `(` at distance 3 of "if (x) {...}" lands as "()" in the buffer.
	let mut arena = segment_suggestion("if (x) {\n  y();\n}", 0, "", true);
	let instr = delayed().preprocess_inserted_text(3, 103, "()", 104, &mut arena);
	assert_eq!(
		instr.edit,
		Some(DocEdit {
			offset: 103,
			length: 2,
			content: "(".to_string(),
		})
	);
	assert!(instr.caret.is_none());
	assert!(arena.open_at(3).unwrap().auto_close_seen);
	// Collapsing alone does not count as typing over the open.
	assert!(arena.open_at(3).unwrap().resolved);
}

#[test]
fn auto_inserted_quote_pair_collapses() {
	let mut arena = segment_suggestion("s = \"hi\"", 0, "", true);
	let instr = delayed().preprocess_inserted_text(4, 4, "\"\"", 5, &mut arena);
	assert_eq!(instr.edit.unwrap().content, "\"");
	assert!(arena.open_at(4).unwrap().auto_close_seen);
}

#[test]
fn quote_close_collapses_without_marking() {
	let mut arena = segment_suggestion("s = \"hi\"", 0, "", true);
	// Close-quote slot holds the close half; the pair buffer still collapses.
	let instr = delayed().preprocess_inserted_text(7, 7, "\"\"", 8, &mut arena);
	assert_eq!(instr.edit.unwrap().content, "\"");
}

#[test]
fn expanded_brace_template_truncates_to_suggestion_body() {
	let mut arena = segment_suggestion("while (x) {\n  f();\n}", 0, "", true);
	let nl = "while (x) {".len();
	// Host expanded the newline after `{` into "\n    \n}".
	let instr = delayed().preprocess_inserted_text(nl, nl, "\n    \n}", nl, &mut arena);
	let edit = instr.edit.expect("template rewrite");
	assert_eq!(edit.length, "\n    \n}".len());
	assert_eq!(edit.content, "\n    ");
	assert!(arena.open_at(nl).unwrap().auto_close_seen);
}

#[test]
fn unrelated_input_is_left_alone() {
	let mut arena = segment_suggestion("foo(bar)", 0, "", true);
	assert!(
		delayed()
			.preprocess_inserted_text(0, 0, "f", 1, &mut arena)
			.is_noop()
	);
	assert!(
		delayed()
			.preprocess_inserted_text(0, 0, "fo", 2, &mut arena)
			.is_noop()
	);
}

#[test]
fn postprocess_nudges_caret_past_auto_inserted_close() {
	let mut arena = segment_suggestion("f(x)", 10, "", true);
	// `(` typed with auto-close: seen + typed over, close still ghost.
	arena.set_auto_close_seen(1);
	arena.mark_typed_over(1);

	let instr = delayed().postprocess_inserted_text(3, 14, ")", &arena);
	assert_eq!(instr.caret, Some(15));
	assert!(instr.edit.is_none());
}

#[test]
fn postprocess_ignores_settled_or_native_brackets() {
	let mut arena = segment_suggestion("f(x)", 10, "", true);
	// Auto-close never fired for this open.
	arena.mark_typed_over(1);
	assert!(delayed().postprocess_inserted_text(3, 14, ")", &arena).is_noop());

	// Settled pair.
	let mut arena = segment_suggestion("f(x)", 10, "", true);
	arena.set_auto_close_seen(1);
	assert!(delayed().postprocess_inserted_text(3, 14, ")", &arena).is_noop());
}

#[test]
fn verified_keystroke_synthesizes_mid_suggestion_close() {
	let mut arena = segment_suggestion("f(x)", 0, "", true);
	arena.set_auto_close_seen(1);
	arena.mark_typed_over(1);

	let instr = delayed().process_verified_keystroke(3, ')', 20, 40, &arena);
	assert_eq!(
		instr.edit,
		Some(DocEdit {
			offset: 40,
			length: 0,
			content: ")".to_string(),
		})
	);
	assert_eq!(instr.caret, Some(21));

	// Wrong symbol synthesizes nothing.
	assert!(
		delayed()
			.process_verified_keystroke(3, ']', 20, 40, &arena)
			.is_noop()
	);
}

#[test]
fn delete_gives_back_padding_for_unresolved_opens() {
	let mut arena = segment_suggestion("f(x)", 0, "", true);
	arena.mark_typed_over(1);
	assert!(!arena.open_at(1).unwrap().resolved);

	// Deleting "f(" walks over the unresolved open: two raw slots removed,
	// one of them auto-close padding.
	let distance = delayed().recompute_distance_on_delete(2, 2, &mut arena);
	assert_eq!(distance, 1);
	// The walk also reverts the open's typing state.
	assert!(arena.open_at(1).unwrap().resolved);
}

#[test]
fn delete_past_invocation_point_goes_negative() {
	let mut arena = segment_suggestion("ab", 0, "", true);
	assert_eq!(delayed().recompute_distance_on_delete(3, 1, &mut arena), -2);
	let mut arena = segment_suggestion("ab", 0, "", false);
	assert_eq!(immediate().recompute_distance_on_delete(3, 1, &mut arena), -2);
}

#[test]
fn immediate_policy_subtracts_deletions_one_for_one() {
	let mut arena = segment_suggestion("f(x)", 0, "", false);
	arena.mark_typed_over(1);
	let distance = immediate().recompute_distance_on_delete(2, 2, &mut arena);
	assert_eq!(distance, 0);
	assert!(arena.open_at(1).unwrap().resolved);
}

#[test]
fn immediate_policy_collapses_brace_pairs_too() {
	let mut arena = segment_suggestion("f({})", 0, "", false);
	let instr = immediate().preprocess_inserted_text(2, 2, "{}", 3, &mut arena);
	assert_eq!(instr.edit.unwrap().content, "{");

	let mut arena = segment_suggestion("f({})", 0, "", true);
	assert!(
		delayed()
			.preprocess_inserted_text(2, 2, "{}", 3, &mut arena)
			.is_noop()
	);
}

#[test]
fn outstanding_padding_counts_unresolved_non_brace_opens() {
	let text = "g(a, \"b\") {\n}";
	let mut arena = segment_suggestion(text, 0, "", true);
	assert_eq!(delayed().outstanding_padding(&arena), 0);

	arena.mark_typed_over(1);
	arena.mark_typed_over(5);
	arena.mark_typed_over(text.find('\n').unwrap());
	// Paren and quote count; the brace never does.
	assert_eq!(delayed().outstanding_padding(&arena), 2);
	assert_eq!(immediate().outstanding_padding(&arena), 0);

	arena.mark_typed_over(7);
	assert_eq!(delayed().outstanding_padding(&arena), 1);
}

#[test]
fn disabled_classes_suppress_compensation() {
	let policy = DelayedBracePolicy::new(AutoCloseConfig::disabled());
	let mut arena = segment_suggestion("f(x)", 0, "", true);
	arena.set_auto_close_seen(1);
	arena.mark_typed_over(1);
	assert!(policy.postprocess_inserted_text(3, 14, ")", &arena).is_noop());
	assert!(
		policy
			.process_verified_keystroke(3, ')', 20, 40, &arena)
			.is_noop()
	);
}

#[test]
fn angle_class_follows_bracket_class() {
	let policy = DelayedBracePolicy::new(AutoCloseConfig {
		angle_brackets: false,
		..AutoCloseConfig::default()
	});
	assert!(policy.auto_close().angle_brackets);

	let policy = DelayedBracePolicy::new(AutoCloseConfig {
		brackets: false,
		..AutoCloseConfig::default()
	});
	assert!(!policy.auto_close().angle_brackets);
}

#[test]
fn language_table_dispatches_brace_delay() {
	let config = AutoCloseConfig::default();
	assert!(policy_for_language("java", config).braces_delayed());
	assert!(!policy_for_language("javascript", config).braces_delayed());
	assert!(!policy_for_language("python", config).braces_delayed());
}
