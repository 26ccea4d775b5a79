//! Reconciliation of host editor events against the previewed suggestion.
//!
//! The host forwards raw document changes, verified keystrokes, caret moves
//! and mouse clicks here. Each event either consumes suggestion text
//! (advancing the traversal distance), rewrites a host auto-edit back into
//! suggestion shape, or ends the session because the user diverged.

use ghostline_typeahead::TypeaheadInstruction;
use tracing::{debug, info, warn};

use crate::session::{CaretMovementReason, InvocationSession, SessionState};
use crate::surface::EditorSurface;

/// One raw document mutation reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
	/// Byte offset of the mutation.
	pub offset: usize,
	/// Bytes removed at `offset`.
	pub deleted: usize,
	/// Text inserted at `offset`.
	pub text: String,
}

/// What the reconciliation loop did with a document change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
	/// No preview on display; the change was not examined.
	Inactive,
	/// The change consumed suggestion text; the preview continues.
	Continue,
	/// A host auto-edit was rewritten into suggestion shape.
	Rewritten,
	/// Deletions brought the caret back to the invocation offset; every
	/// candidate is eligible again.
	Reset,
	/// The change contradicted the suggestion; the session ended.
	Diverged,
	/// The last suggestion byte was consumed.
	FullyConsumed,
}

/// A keystroke the host is about to apply, reported before its effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifiedKey {
	/// Arrow or other caret-movement key.
	Movement,
	Backspace,
	Enter,
	Char(char),
}

impl<S: EditorSurface> InvocationSession<S> {
	/// Reconciles a document change against the active suggestion.
	pub fn on_document_change(&mut self, change: &DocumentChange) -> ReconcileOutcome {
		if !self.is_previewing() {
			return ReconcileOutcome::Inactive;
		}
		let Some(arena) = self.arena.as_mut() else {
			warn!("previewing without a segment table; ending session");
			self.end_immediately();
			return ReconcileOutcome::Diverged;
		};

		if change.text.is_empty() && change.deleted > 0 {
			let next = self.policy.recompute_distance_on_delete(
				change.deleted,
				self.distance,
				arena,
			);
			if next < 0 {
				// Deleted past the invocation offset.
				info!(deleted = change.deleted, "deletion crossed the invocation offset");
				self.context.discard_all();
				let line = self.surface.line_at_offset(self.surface.caret_offset());
				self.transition_to_decision_made(line + 1);
				self.end();
				return ReconcileOutcome::Diverged;
			}
			self.distance = next as usize;
			if self.distance == 0 {
				debug!("caret returned to the invocation offset; re-arming candidates");
				self.context.reset_states();
				self.mark_active_seen();
				return ReconcileOutcome::Reset;
			}
			return ReconcileOutcome::Continue;
		}
		if change.text.is_empty() {
			return ReconcileOutcome::Continue;
		}

		let caret = self.surface.caret_offset();
		let rewrite = self.policy.preprocess_inserted_text(
			self.distance,
			change.offset,
			&change.text,
			caret,
			arena,
		);
		if let Some(edit) = rewrite.edit {
			debug!(offset = edit.offset, length = edit.length, "collapsing host auto-edit");
			if let Err(err) = self.surface.apply_edit(edit.offset, edit.length, &edit.content) {
				warn!(%err, "failed to rewrite host auto-edit");
			}
			if let Some(offset) = rewrite.caret {
				self.surface.set_caret_offset(offset);
			}
			return ReconcileOutcome::Rewritten;
		}

		let Some(suggestion) =
			self.context.active_suggestion().map(|s| s.insert_text.clone())
		else {
			self.end_immediately();
			return ReconcileOutcome::Diverged;
		};
		let input = change.text.as_bytes();
		let matches = self.distance + input.len() <= suggestion.len()
			&& &suggestion.as_bytes()[self.distance..self.distance + input.len()] == input;
		if !matches {
			info!(distance = self.distance, "input diverged from the suggestion");
			self.context.discard_all();
			let newlines = change.text.matches('\n').count();
			let line = self.surface.line_at_offset(caret) + newlines;
			self.transition_to_decision_made(line + 1);
			self.end_immediately();
			return ReconcileOutcome::Diverged;
		}

		// Matched input commits the session to this candidate.
		self.context.narrow_to_active();
		self.mark_active_seen();
		let mut nudge = TypeaheadInstruction::none();
		if let Some(arena) = self.arena.as_mut() {
			for idx in self.distance..self.distance + input.len() {
				arena.mark_typed_over(idx);
			}
			nudge =
				self.policy.postprocess_inserted_text(self.distance, caret, &change.text, arena);
		}
		if let Some(edit) = nudge.edit
			&& let Err(err) = self.surface.apply_edit(edit.offset, edit.length, &edit.content)
		{
			warn!(%err, "failed to apply post-insert adjustment");
		}
		if let Some(offset) = nudge.caret {
			self.surface.set_caret_offset(offset);
		}
		self.distance += input.len();
		self.last_known_line = self.surface.line_at_offset(self.surface.caret_offset());

		if self.distance == suggestion.len() {
			info!("suggestion fully consumed by typeahead");
			return ReconcileOutcome::FullyConsumed;
		}
		ReconcileOutcome::Continue
	}

	/// Examines a keystroke before the host applies it. Returns true when
	/// the engine synthesized the edit itself and the host must suppress
	/// the native keystroke.
	pub fn on_verified_key(&mut self, key: VerifiedKey) -> bool {
		if !self.is_previewing() {
			return false;
		}
		match key {
			VerifiedKey::Movement => {
				self.caret_reason = CaretMovementReason::MovementKey;
				false
			}
			VerifiedKey::Enter => {
				self.caret_reason = CaretMovementReason::TextInput;
				false
			}
			VerifiedKey::Backspace => {
				self.caret_reason = CaretMovementReason::TextInput;
				if self.distance == 0 {
					// Nothing typed ahead; backspace leaves the preview.
					let line = self.surface.line_at_offset(self.surface.caret_offset());
					self.transition_to_decision_made(line + 1);
					self.end();
				}
				false
			}
			VerifiedKey::Char(input) => {
				self.caret_reason = CaretMovementReason::TextInput;
				let Some(arena) = self.arena.as_ref() else { return false };
				if self.distance >= arena.len() {
					return false;
				}
				let caret = self.surface.caret_offset();
				let expanded = self.surface.offset_in_expanded_document(caret);
				let synthesis = self.policy.process_verified_keystroke(
					self.distance,
					input,
					caret,
					expanded,
					arena,
				);
				let Some(edit) = synthesis.edit else { return false };
				debug!(offset = edit.offset, "synthesizing displaced close bracket");
				if let Err(err) = self.surface.apply_edit(edit.offset, edit.length, &edit.content)
				{
					warn!(%err, "failed to synthesize keystroke");
					return false;
				}
				if let Some(offset) = synthesis.caret {
					self.surface.set_caret_offset(offset);
				}
				true
			}
		}
	}

	/// Reacts to a caret position report from the host.
	pub fn on_caret_moved(&mut self, _event_offset: usize) {
		if self.caret_reason == CaretMovementReason::TextInput {
			// Movement caused by reconciled typing; the preview survives.
			self.caret_reason = CaretMovementReason::Unexamined;
			self.last_known_line = self.surface.line_at_offset(self.surface.caret_offset());
			return;
		}
		if self.is_previewing() {
			debug!(reason = ?self.caret_reason, "caret navigation dismissed the preview");
			self.transition_to_decision_made(self.last_known_line + 1);
			self.end();
		}
		self.caret_reason = CaretMovementReason::Unexamined;
	}

	/// A mouse press anywhere in the editor dismisses the preview.
	pub fn on_mouse_down(&mut self) {
		self.caret_reason = CaretMovementReason::Mouse;
		if self.is_previewing() {
			self.transition_to_decision_made(self.last_known_line + 1);
			self.end();
		}
	}

	/// Focus leaving the editor dismisses the preview.
	pub fn on_focus_lost(&mut self) {
		if self.is_previewing() {
			self.transition_to_decision_made(self.last_known_line + 1);
			self.end();
		}
		if self.state == SessionState::Invoking {
			self.end();
		}
	}
}
