use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::segment::Segment;
use crate::{AutoCloseConfig, SegmentArena, segment_suggestion};

fn normals(arena: &SegmentArena) -> Vec<(usize, usize, String)> {
	arena
		.segments()
		.filter_map(|segment| match segment {
			Segment::Normal {
				start_offset,
				end_offset,
				text,
				..
			} => Some((*start_offset, *end_offset, text.clone())),
			_ => None,
		})
		.collect()
}

#[test]
fn plain_text_is_one_normal_segment() {
	let arena = segment_suggestion("let x = 1;", 100, "", false);
	assert_eq!(normals(&arena), vec![(100, 110, "let x = 1;".to_string())]);
	assert!((0..arena.len()).all(|i| arena.bracket_at(i).is_none()));
}

#[test]
fn matched_pair_is_blanked_and_linked() {
	let arena = segment_suggestion("foo()", 0, "", false);
	assert_eq!(normals(&arena), vec![(0, 5, "foo( ".to_string())]);

	let open_id = arena.bracket_at(3).expect("open registered");
	let close_id = arena.bracket_at(4).expect("close registered");
	let open = arena.open(open_id).expect("open variant");
	assert_eq!(open.symbol, '(');
	assert_eq!(open.paired_close, Some(close_id));
	let close = arena.close_at(4).expect("close variant");
	assert_eq!(close.symbol, ')');
	assert_eq!(close.paired_open, open_id);
	assert_eq!(close.line_prefix, "foo(");
}

#[test]
fn delayed_brace_registers_at_following_newline() {
	let text = "if (x) {\n  y();\n}";
	let brace_offset = text.find('{').unwrap();
	let newline_offset = text.find('\n').unwrap();

	let delayed = segment_suggestion(text, 0, "", true);
	assert!(delayed.open_at(newline_offset).is_some());
	assert!(delayed.open_at(brace_offset).is_none());

	let immediate = segment_suggestion(text, 0, "", false);
	assert!(immediate.open_at(brace_offset).is_some());
	assert!(immediate.open_at(newline_offset).is_none());
}

#[test]
fn delayed_brace_without_newline_falls_back_to_own_offset() {
	let arena = segment_suggestion("f({})", 0, "", true);
	let open = arena.open_at(2).expect("brace at own offset");
	assert_eq!(open.symbol, '{');
}

#[test]
fn whitespace_preceded_angles_are_comparison_operators() {
	let arena = segment_suggestion("a < b > c", 0, "", false);
	assert!((0..arena.len()).all(|i| arena.bracket_at(i).is_none()));
	assert_eq!(normals(&arena)[0].2, "a < b > c");
}

#[test]
fn generic_angles_pair_up() {
	let arena = segment_suggestion("Vec<String>", 0, "", false);
	assert_eq!(arena.open_at(3).map(|o| o.symbol), Some('<'));
	assert_eq!(arena.close_at(10).map(|c| c.symbol), Some('>'));
}

#[test]
fn quotes_pair_only_against_matching_open() {
	let arena = segment_suggestion("\"hi\"", 0, "", false);
	assert_eq!(arena.open_at(0).map(|o| o.symbol), Some('"'));
	assert_eq!(arena.close_at(3).map(|c| c.symbol), Some('"'));

	// A single quote inside a double-quoted string opens a new pair rather
	// than closing the double quote.
	let arena = segment_suggestion("\"a'b\"", 0, "", false);
	assert!(arena.bracket_at(0).is_none());
	assert!(arena.bracket_at(4).is_none());
}

#[test]
fn mismatched_punctuation_degrades_to_literal_text() {
	let arena = segment_suggestion("(]", 0, "", false);
	assert!((0..arena.len()).all(|i| arena.bracket_at(i).is_none()));
	assert_eq!(normals(&arena), vec![(0, 2, "(]".to_string())]);
}

#[test]
fn unmatched_open_never_enters_the_table() {
	let arena = segment_suggestion("foo(bar", 0, "", false);
	assert!((0..arena.len()).all(|i| arena.bracket_at(i).is_none()));
}

#[test]
fn type_over_and_delete_flip_resolution_state() {
	let mut arena = segment_suggestion("f()", 0, "", false);

	arena.mark_typed_over(1);
	assert!(!arena.open_at(1).unwrap().resolved);

	arena.mark_typed_over(2);
	assert!(arena.open_at(1).unwrap().resolved);

	arena.mark_typed_over(1);
	arena.mark_deleted(1);
	assert!(arena.open_at(1).unwrap().resolved);
}

#[test]
fn auto_close_content_respects_class_flags() {
	let mut arena = segment_suggestion("f(\"s\")", 0, "", false);
	arena.mark_typed_over(1);
	arena.mark_typed_over(2);

	let enabled = AutoCloseConfig::default();
	let paren = arena.open_at(1).unwrap();
	let quote = arena.open_at(2).unwrap();
	assert_eq!(paren.auto_close_content(enabled), Some(")".to_string()));
	assert_eq!(quote.auto_close_content(enabled), Some("\"".to_string()));

	let disabled = AutoCloseConfig::disabled();
	assert_eq!(paren.auto_close_content(disabled), None);

	// Resolved opens owe nothing.
	arena.mark_deleted(1);
	assert_eq!(arena.open_at(1).unwrap().auto_close_content(enabled), None);
}

#[test]
fn delayed_brace_synthesizes_indented_closing_line() {
	let mut arena = segment_suggestion("if (x) {\n  y();\n}", 0, "    ", true);
	let slot = "if (x) {\n  y();\n}".find('\n').unwrap();
	arena.mark_typed_over(slot);
	let brace = arena.open_at(slot).unwrap();
	assert_eq!(
		brace.auto_close_content(AutoCloseConfig::default()),
		Some("\n    }".to_string())
	);
}

#[test]
fn opens_reverse_walks_innermost_first() {
	let arena = segment_suggestion("([x])", 0, "", false);
	let symbols: Vec<char> = arena.opens_reverse().map(|open| open.symbol).collect();
	assert_eq!(symbols, vec!['[', '(']);
}

#[test]
fn right_context_shows_up_in_render_segments_only() {
	let mut arena = segment_suggestion("a\nb", 0, "", false);
	arena.set_right_context("; rest".to_string(), "a".to_string());
	assert_eq!(arena.right_context(), Some("; rest"));
	assert!(
		arena
			.render_segments()
			.any(|segment| matches!(segment, Segment::RightContext { .. }))
	);
}

#[test]
fn open_halves_are_not_rendered_standalone() {
	let arena = segment_suggestion("f(x)", 0, "", false);
	assert!(
		arena
			.render_segments()
			.all(|segment| !matches!(segment, Segment::Open(_)))
	);
}

#[test]
fn auto_close_config_deserializes_with_defaults() {
	let config: AutoCloseConfig = toml::from_str("braces = false").unwrap();
	assert!(!config.braces);
	assert!(config.brackets && config.angle_brackets && config.quotes);
}

#[test]
#[should_panic(expected = "out of range")]
fn bracket_table_access_past_suggestion_asserts() {
	let arena = segment_suggestion("ab", 0, "", false);
	let _ = arena.bracket_at(2);
}

fn line_separator_bytes(text: &str) -> Vec<bool> {
	let bytes = text.as_bytes();
	let mut sep = vec![false; bytes.len()];
	for (i, &b) in bytes.iter().enumerate() {
		if b == b'\n' {
			sep[i] = true;
			if i > 0 && bytes[i - 1] == b'\r' {
				sep[i - 1] = true;
			}
		}
	}
	sep
}

proptest! {
	#[test]
	fn normal_segments_cover_every_offset_exactly_once(text in "[ -~]{0,24}(\n[ -~]{0,24}){0,4}") {
		let arena = segment_suggestion(&text, 0, "", false);
		let sep = line_separator_bytes(&text);
		let mut covered = vec![0usize; text.len()];
		for segment in arena.segments() {
			if let Segment::Normal { start_offset, end_offset, .. } = segment {
				for slot in covered.iter_mut().take(*end_offset).skip(*start_offset) {
					*slot += 1;
				}
			}
		}
		for (i, count) in covered.iter().enumerate() {
			let expected = if sep[i] { 0 } else { 1 };
			prop_assert_eq!(*count, expected, "offset {}", i);
		}
	}

	#[test]
	fn bracket_pairing_is_symmetric(text in "[ -~]{0,24}(\n[ -~]{0,24}){0,4}") {
		let arena = segment_suggestion(&text, 0, "", false);
		for segment in arena.segments() {
			match segment {
				Segment::Open(open) => {
					let close_id = open.paired_close.expect("arena opens are always paired");
					match arena.get(close_id) {
						Segment::Close(close) => {
							let back = arena.open(close.paired_open).expect("back-link is an open");
							prop_assert_eq!(back.offset, open.offset);
						}
						other => prop_assert!(false, "paired_close not a close: {:?}", other),
					}
				}
				Segment::Close(close) => {
					let open = arena.open(close.paired_open).expect("paired open");
					prop_assert_eq!(open.paired_close, Some(arena.bracket_at(close.offset).unwrap()));
				}
				_ => {}
			}
		}
	}
}
