//! Suggestion bookkeeping for a single invocation session.
//!
//! A session holds every candidate returned by the completion provider and
//! tracks which one is displayed, which have been seen, and which have been
//! ruled out by the user's typing. The per-candidate states feed the session
//! outcome reported to the host when the session ends.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One inline completion candidate as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
	/// Provider-assigned identifier, stable within a session.
	pub id: String,
	/// Full text the candidate would insert at the invocation offset.
	pub insert_text: String,
	/// License attributions attached to the candidate, if any.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub references: Vec<CodeReference>,
}

/// Attribution metadata for a suggestion derived from licensed code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeReference {
	pub license_name: String,
	pub repository: String,
	pub url: String,
}

/// Display state of a candidate within the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionState {
	/// Never displayed, still eligible.
	#[default]
	Unseen,
	/// Currently or previously displayed.
	Seen,
	/// Ruled out; must not be displayed again this session.
	Discard,
}

#[derive(Debug)]
struct Candidate {
	suggestion: Suggestion,
	state: SuggestionState,
}

/// The candidate list of one session plus the index of the displayed one.
///
/// The displayed candidate is never in the [`SuggestionState::Discard`]
/// state; cycling operations skip discarded entries.
#[derive(Debug, Default)]
pub struct SuggestionContext {
	candidates: Vec<Candidate>,
	active: Option<usize>,
}

impl SuggestionContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the candidate list, making `active` the displayed entry.
	pub fn set_candidates(&mut self, suggestions: Vec<Suggestion>, active: usize) {
		assert!(active < suggestions.len() || suggestions.is_empty());
		self.candidates = suggestions
			.into_iter()
			.map(|suggestion| Candidate { suggestion, state: SuggestionState::Unseen })
			.collect();
		self.active = if self.candidates.is_empty() { None } else { Some(active) };
	}

	pub fn clear(&mut self) {
		self.candidates.clear();
		self.active = None;
	}

	pub fn len(&self) -> usize {
		self.candidates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.candidates.is_empty()
	}

	pub fn active_index(&self) -> Option<usize> {
		self.active
	}

	/// The suggestion currently on display, if any.
	pub fn active_suggestion(&self) -> Option<&Suggestion> {
		let idx = self.active?;
		let candidate = &self.candidates[idx];
		debug_assert!(candidate.state != SuggestionState::Discard);
		Some(&candidate.suggestion)
	}

	pub fn state_of(&self, idx: usize) -> Option<SuggestionState> {
		self.candidates.get(idx).map(|c| c.state)
	}

	/// Marks the displayed candidate as seen.
	pub fn mark_active_seen(&mut self) {
		if let Some(idx) = self.active {
			self.candidates[idx].state = SuggestionState::Seen;
		}
	}

	/// Advances to the next non-discarded candidate, wrapping around.
	/// Returns true when the active index changed.
	pub fn next(&mut self) -> bool {
		self.cycle(1)
	}

	/// Moves to the previous non-discarded candidate, wrapping around.
	pub fn previous(&mut self) -> bool {
		self.cycle(self.candidates.len().saturating_sub(1))
	}

	fn cycle(&mut self, step: usize) -> bool {
		let Some(start) = self.active else { return false };
		let len = self.candidates.len();
		if len < 2 {
			return false;
		}
		let mut idx = start;
		for _ in 1..len {
			idx = (idx + step) % len;
			if self.candidates[idx].state != SuggestionState::Discard {
				self.active = Some(idx);
				return idx != start;
			}
		}
		false
	}

	/// Discards every candidate except the displayed one. Used once the
	/// user's typeahead has committed to the active suggestion.
	pub fn narrow_to_active(&mut self) {
		let Some(active) = self.active else { return };
		for (idx, candidate) in self.candidates.iter_mut().enumerate() {
			if idx != active {
				candidate.state = SuggestionState::Discard;
			}
		}
	}

	/// Discards every candidate, including the displayed one.
	pub fn discard_all(&mut self) {
		for candidate in &mut self.candidates {
			candidate.state = SuggestionState::Discard;
		}
	}

	/// Re-arms all candidates after the caret returned to the invocation
	/// offset: everything becomes eligible again and the displayed one is
	/// re-marked seen.
	pub fn reset_states(&mut self) {
		for candidate in &mut self.candidates {
			candidate.state = SuggestionState::Unseen;
		}
		self.mark_active_seen();
	}

	pub(crate) fn outcomes(&self, accepted: Option<&str>) -> Vec<(String, CompletionOutcome)> {
		self.candidates
			.iter()
			.map(|c| {
				let accepted = accepted.is_some_and(|id| id == c.suggestion.id);
				(
					c.suggestion.id.clone(),
					CompletionOutcome {
						seen: c.state == SuggestionState::Seen || accepted,
						discarded: c.state == SuggestionState::Discard,
						accepted,
					},
				)
			})
			.collect()
	}
}

/// Final disposition of one candidate, reported when the session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionOutcome {
	pub seen: bool,
	pub discarded: bool,
	pub accepted: bool,
}

/// Summary of a finished session, handed to the host's `on_outcome` hook.
#[derive(Debug, Clone, Default)]
pub struct SessionOutcome {
	/// Provider session identifier, when a fetch resolved successfully.
	pub session_id: Option<String>,
	/// Per-candidate dispositions, in provider order.
	pub completions: Vec<(String, CompletionOutcome)>,
	/// Time from the resolved query's dispatch to the first render.
	pub first_display_latency: Option<Duration>,
	/// Total time a suggestion was on display.
	pub display_duration: Option<Duration>,
	/// Characters of the suggestion the user had already typed when the
	/// fetch resolved.
	pub initial_typeahead: usize,
}
