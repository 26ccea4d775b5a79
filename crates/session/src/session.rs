//! The invocation session state machine.
//!
//! One [`InvocationSession`] lives per editor surface. It moves through
//! `Inactive -> Invoking -> Previewing -> DecisionMade -> Inactive` and owns
//! the async fetch plumbing: every dispatched query gets its own
//! cancellation token and reports back over an in-process channel, so stale
//! results from an earlier caret position can never clobber a newer preview.

use std::sync::Arc;
use std::time::Instant;

use ghostline_overlay::{Segment, SegmentArena, segment_suggestion};
use ghostline_typeahead::TypeaheadPolicy;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::context::{SessionOutcome, Suggestion, SuggestionContext};
use crate::provider::{
	AuthGate, CompletionProvider, DocumentPosition, FetchResult, ProviderError, QueryId,
	TriggerKind,
};
use crate::surface::EditorSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
	#[default]
	Inactive,
	Invoking,
	Previewing,
	DecisionMade,
}

/// Why the caret last moved, set by the key/mouse entry points before the
/// host delivers the resulting caret event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CaretMovementReason {
	#[default]
	Unexamined,
	TextInput,
	MovementKey,
	Mouse,
}

/// Host callbacks fired on state transitions.
#[derive(Default)]
pub struct SessionHooks {
	pub on_querying: Option<Box<dyn Fn() + Send>>,
	pub on_previewing: Option<Box<dyn Fn() + Send>>,
	pub on_idle: Option<Box<dyn Fn() + Send>>,
	pub on_outcome: Option<Box<dyn Fn(SessionOutcome) + Send>>,
}

/// Message sent back from a fetch task to the owning session.
#[derive(Debug)]
pub enum SessionMsg {
	FetchResolved {
		query: QueryId,
		invocation_offset: usize,
		result: Result<FetchResult, ProviderError>,
	},
}

struct PendingQuery {
	cancel: CancellationToken,
	requested_at: Instant,
}

pub struct InvocationSession<S: EditorSurface> {
	pub(crate) surface: S,
	provider: Arc<dyn CompletionProvider>,
	auth: Arc<dyn AuthGate>,
	pub(crate) policy: Box<dyn TypeaheadPolicy>,
	pub(crate) state: SessionState,
	pub(crate) context: SuggestionContext,
	pub(crate) arena: Option<SegmentArena>,
	pub(crate) invocation_offset: usize,
	/// Suggestion bytes already consumed by verified user input.
	pub(crate) distance: usize,
	num_suggestion_lines: usize,
	pub(crate) right_context: Option<String>,
	pub(crate) last_known_line: usize,
	pub(crate) caret_reason: CaretMovementReason,
	accepted: Option<String>,
	session_id: Option<String>,
	initial_typeahead: usize,
	first_display_latency: Option<std::time::Duration>,
	display_started: Option<Instant>,
	resolved_requested_at: Option<Instant>,
	vertical_indent_line: Option<usize>,
	pending: FxHashMap<QueryId, PendingQuery>,
	end_requested: bool,
	tx: mpsc::UnboundedSender<SessionMsg>,
	rx: mpsc::UnboundedReceiver<SessionMsg>,
	hooks: SessionHooks,
}

impl<S: EditorSurface> InvocationSession<S> {
	pub fn new(
		surface: S,
		provider: Arc<dyn CompletionProvider>,
		auth: Arc<dyn AuthGate>,
		policy: Box<dyn TypeaheadPolicy>,
	) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			surface,
			provider,
			auth,
			policy,
			state: SessionState::Inactive,
			context: SuggestionContext::new(),
			arena: None,
			invocation_offset: 0,
			distance: 0,
			num_suggestion_lines: 0,
			right_context: None,
			last_known_line: 0,
			caret_reason: CaretMovementReason::Unexamined,
			accepted: None,
			session_id: None,
			initial_typeahead: 0,
			first_display_latency: None,
			display_started: None,
			resolved_requested_at: None,
			vertical_indent_line: None,
			pending: FxHashMap::default(),
			end_requested: false,
			tx,
			rx,
			hooks: SessionHooks::default(),
		}
	}

	pub fn hooks_mut(&mut self) -> &mut SessionHooks {
		&mut self.hooks
	}

	pub fn surface(&self) -> &S {
		&self.surface
	}

	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	pub fn is_active(&self) -> bool {
		self.state != SessionState::Inactive
	}

	pub fn is_previewing(&self) -> bool {
		self.state == SessionState::Previewing
	}

	pub fn is_decision_made(&self) -> bool {
		self.state == SessionState::DecisionMade
	}

	pub fn invocation_offset(&self) -> usize {
		self.invocation_offset
	}

	pub fn distance_traversed(&self) -> usize {
		self.distance
	}

	pub fn has_been_typed_ahead(&self) -> bool {
		self.distance > 0
	}

	pub fn num_suggestion_lines(&self) -> usize {
		self.num_suggestion_lines
	}

	pub fn arena(&self) -> Option<&SegmentArena> {
		self.arena.as_ref()
	}

	/// Renderable segments of the active suggestion, empty outside a preview.
	pub fn segments(&self) -> Vec<&Segment> {
		self.arena.as_ref().map_or_else(Vec::new, |arena| arena.render_segments().collect())
	}

	pub fn context(&self) -> &SuggestionContext {
		&self.context
	}

	/// Characters of auto-close padding the host must skip past when
	/// accepting the active suggestion.
	pub fn outstanding_padding(&self) -> usize {
		self.arena.as_ref().map_or(0, |arena| self.policy.outstanding_padding(arena))
	}

	/// Moves the session out of `Inactive`. Returns false when a session is
	/// already running or the host has no credentials.
	pub fn start(&mut self) -> bool {
		if self.is_active() {
			return false;
		}
		if !self.auth.has_credentials() {
			warn!("inline completion unavailable without credentials");
			return false;
		}
		self.state = SessionState::Invoking;
		if let Some(hook) = &self.hooks.on_querying {
			hook();
		}
		info!("inline session started");
		true
	}

	/// Issues a query as part of the typing flow. `typed_length` is the text
	/// the user has typed since `offset` was sampled; the query lands after
	/// it.
	pub fn invoke(&mut self, offset: usize, typed_length: usize) {
		self.dispatch_query(offset + typed_length, TriggerKind::Automatic);
	}

	/// Issues a query at the current caret on explicit user request.
	pub fn invoke_explicit(&mut self) {
		self.dispatch_query(self.surface.caret_offset(), TriggerKind::Invoke);
	}

	fn dispatch_query(&mut self, offset: usize, trigger: TriggerKind) {
		if self.state != SessionState::Invoking {
			debug!(state = ?self.state, "ignoring invoke outside the querying state");
			return;
		}
		let line = self.surface.line_at_offset(offset);
		let position = DocumentPosition { line, character: offset - self.surface.offset_at_line(line) };

		let query = QueryId::new();
		let cancel = CancellationToken::new();
		self.pending.insert(query, PendingQuery { cancel: cancel.clone(), requested_at: Instant::now() });

		let provider = Arc::clone(&self.provider);
		let tx = self.tx.clone();
		info!(%query, offset, ?trigger, "dispatching completion query");
		tokio::spawn(async move {
			let result = tokio::select! {
				_ = cancel.cancelled() => return,
				result = provider.fetch(position, trigger) => result,
			};
			let _ = tx.send(SessionMsg::FetchResolved { query, invocation_offset: offset, result });
		});
	}

	pub fn pending_queries(&self) -> usize {
		self.pending.len()
	}

	/// Drains every message currently queued without waiting.
	pub fn process_messages(&mut self) {
		while let Ok(msg) = self.rx.try_recv() {
			self.handle_message(msg);
		}
	}

	/// Waits until every in-flight query has resolved, handling each result
	/// as it lands.
	pub async fn drain_pending(&mut self) {
		while !self.pending.is_empty() {
			match self.rx.recv().await {
				Some(msg) => self.handle_message(msg),
				None => break,
			}
		}
	}

	pub fn handle_message(&mut self, msg: SessionMsg) {
		match msg {
			SessionMsg::FetchResolved { query, invocation_offset, result } => {
				self.handle_fetch_resolved(query, invocation_offset, result);
			}
		}
		if self.end_requested && self.pending.is_empty() {
			self.end_requested = false;
			self.end();
		}
	}

	fn handle_fetch_resolved(
		&mut self,
		query: QueryId,
		invocation_offset: usize,
		result: Result<FetchResult, ProviderError>,
	) {
		let Some(pending) = self.pending.remove(&query) else {
			debug!(%query, "dropping result of a cancelled query");
			return;
		};
		let items = match result {
			Ok(resolved) => {
				self.session_id = Some(resolved.session_id);
				resolved.items
			}
			Err(err) => {
				error!(%query, %err, "completion query failed");
				Vec::new()
			}
		};
		if items.is_empty() {
			info!(%query, "query returned no suggestions");
			if !self.is_previewing() {
				self.end();
			}
			return;
		}
		if self.state != SessionState::Invoking {
			// A preview from an earlier query is already on screen.
			debug!(%query, state = ?self.state, "ignoring late fetch result");
			return;
		}

		let caret = self.surface.caret_offset();
		if caret < invocation_offset {
			info!("caret moved behind the invocation offset; discarding results");
			self.context.set_candidates(items, 0);
			self.context.discard_all();
			self.end();
			return;
		}

		let mut active = 0;
		let mut prefix_len = 0;
		if caret > invocation_offset {
			let prefix = match self.surface.text_range(invocation_offset, caret - invocation_offset) {
				Ok(text) => text,
				Err(err) => {
					warn!(%err, "failed to read typed-ahead prefix");
					self.end();
					return;
				}
			};
			match items.iter().position(|s| s.insert_text.starts_with(&prefix)) {
				Some(idx) => {
					active = idx;
					prefix_len = prefix.len();
				}
				None => {
					info!("typed-ahead text matches no candidate; discarding results");
					self.context.set_candidates(items, 0);
					self.context.discard_all();
					self.end();
					return;
				}
			}
		}

		self.invocation_offset = invocation_offset;
		self.distance = prefix_len;
		self.initial_typeahead = prefix_len;
		self.resolved_requested_at = Some(pending.requested_at);
		self.context.set_candidates(items, active);
		if prefix_len > 0 {
			// Typing during the fetch already committed to this candidate.
			self.context.narrow_to_active();
		}
		self.state = SessionState::Previewing;
		if let Some(hook) = &self.hooks.on_previewing {
			hook();
		}
		info!(%query, candidates = self.context.len(), "entering preview");
		self.prime_active_candidate();
	}

	/// Segments the active suggestion and captures the right context on
	/// first display of a multi-line candidate.
	pub(crate) fn prime_active_candidate(&mut self) {
		let Some(text) = self.context.active_suggestion().map(|s| s.insert_text.clone()) else {
			return;
		};
		let line = self.surface.line_at_offset(self.invocation_offset);
		let line_text = self.surface.line_text(line);
		let indent_end =
			line_text.find(|c: char| c != ' ' && c != '\t').unwrap_or(line_text.len());
		let indent = line_text[..indent_end].to_string();
		self.num_suggestion_lines = text.split('\n').count();

		if self.right_context.is_none() && self.num_suggestion_lines > 1 {
			let caret = self.surface.caret_offset();
			let caret_line = self.surface.line_at_offset(caret);
			let col = caret - self.surface.offset_at_line(caret_line);
			let caret_line_text = self.surface.line_text(caret_line);
			let trailing = caret_line_text[col.min(caret_line_text.len())..].to_string();
			if !trailing.trim().is_empty() {
				match self.surface.apply_edit(caret, trailing.len(), "") {
					Ok(()) => {
						debug!(len = trailing.len(), "struck right context from the caret line");
						self.right_context = Some(trailing);
					}
					Err(err) => warn!(%err, "failed to strike right context"),
				}
			}
		}

		let mut arena =
			segment_suggestion(&text, self.invocation_offset, &indent, self.policy.braces_delayed());
		if let Some(trailing) = &self.right_context {
			let first_line = text.lines().next().unwrap_or_default().to_string();
			arena.set_right_context(trailing.clone(), first_line);
		}
		self.arena = Some(arena);
		self.last_known_line = line;
		self.mark_active_seen();
	}

	pub(crate) fn mark_active_seen(&mut self) {
		self.context.mark_active_seen();
		if self.first_display_latency.is_none() {
			self.first_display_latency = self.resolved_requested_at.map(|at| at.elapsed());
		}
		if self.display_started.is_none() {
			self.display_started = Some(Instant::now());
		}
	}

	/// Cycles the preview to the next eligible candidate.
	pub fn next_candidate(&mut self) {
		if self.is_previewing() && self.context.next() {
			self.prime_active_candidate();
		}
	}

	pub fn previous_candidate(&mut self) {
		if self.is_previewing() && self.context.previous() {
			self.prime_active_candidate();
		}
	}

	/// Marks the active suggestion as accepted ahead of [`end`](Self::end).
	pub fn mark_accepted(&mut self) {
		if let Some(suggestion) = self.context.active_suggestion() {
			self.accepted = Some(suggestion.id.clone());
		}
	}

	pub fn accepted_suggestion(&self) -> Option<&Suggestion> {
		let id = self.accepted.as_deref()?;
		self.context.active_suggestion().filter(|s| s.id == id)
	}

	/// Reserves overlay space under `line` for a multi-line preview.
	pub fn reserve_overlay_space(&mut self, line: usize, height: u32) {
		self.surface.set_line_vertical_indent(line, height);
		self.vertical_indent_line = Some(line);
	}

	pub(crate) fn release_overlay_space(&mut self, line: usize) {
		if self.vertical_indent_line.take().is_some() {
			self.surface.set_line_vertical_indent(line, 0);
		}
	}

	/// Leaves `Previewing` once the user has committed either way, releasing
	/// the overlay reservation under `line`.
	pub fn transition_to_decision_made(&mut self, line: usize) {
		if self.state != SessionState::Previewing {
			return;
		}
		self.state = SessionState::DecisionMade;
		self.release_overlay_space(line);
	}

	/// Ends the session. Deferred until every in-flight query resolves so a
	/// racing fetch never lands on a torn-down session.
	pub fn end(&mut self) {
		if !self.is_active() {
			return;
		}
		if !self.pending.is_empty() {
			debug!(pending = self.pending.len(), "end deferred until queries drain");
			self.end_requested = true;
			return;
		}
		if self.state == SessionState::Previewing {
			self.transition_to_decision_made(self.last_known_line + 1);
		}
		self.teardown();
		info!("session ended");
	}

	/// Ends the session now, cancelling any in-flight queries.
	pub fn end_immediately(&mut self) {
		if !self.is_active() {
			return;
		}
		if self.state == SessionState::Previewing {
			self.transition_to_decision_made(self.last_known_line + 1);
		}
		self.teardown();
		info!("session ended forcefully");
	}

	fn teardown(&mut self) {
		self.repair_document();
		self.emit_outcome();
		for (query, pending) in self.pending.drain() {
			pending.cancel.cancel();
			debug!(%query, "cancelled in-flight query");
		}
		self.state = SessionState::Inactive;
		self.context.clear();
		self.arena = None;
		self.distance = 0;
		self.num_suggestion_lines = 0;
		self.right_context = None;
		self.accepted = None;
		self.session_id = None;
		self.initial_typeahead = 0;
		self.first_display_latency = None;
		self.display_started = None;
		self.resolved_requested_at = None;
		self.vertical_indent_line = None;
		self.end_requested = false;
		self.caret_reason = CaretMovementReason::Unexamined;
		if let Some(hook) = &self.hooks.on_idle {
			hook();
		}
	}

	/// Restores what the preview suppressed: on rejection, the auto-close
	/// characters the user typed over (innermost first) and the struck right
	/// context; on acceptance, the right context after the inserted text.
	fn repair_document(&mut self) {
		let Some(arena) = &self.arena else { return };
		if self.accepted.is_none() {
			let config = self.policy.auto_close();
			let mut synthesized = String::new();
			for open in arena.opens_reverse() {
				if let Some(close) = open.auto_close_content(config) {
					synthesized.push_str(&close);
				}
			}
			if let Some(trailing) = &self.right_context {
				synthesized.push_str(trailing);
			}
			if !synthesized.is_empty() {
				let at = self.surface.offset_in_expanded_document(self.invocation_offset)
					+ self.distance;
				if let Err(err) = self.surface.apply_edit(at, 0, &synthesized) {
					error!(%err, "failed to repair the document on teardown");
				}
			}
		} else if let Some(trailing) = self.right_context.take() {
			let len = self
				.context
				.active_suggestion()
				.map_or(self.distance, |s| s.insert_text.len());
			let at = self.invocation_offset + len;
			if let Err(err) = self.surface.apply_edit(at, 0, &trailing) {
				error!(%err, "failed to restore right context after acceptance");
			}
		}
	}

	fn emit_outcome(&mut self) {
		if self.context.is_empty() && self.session_id.is_none() {
			return;
		}
		let outcome = SessionOutcome {
			session_id: self.session_id.clone(),
			completions: self.context.outcomes(self.accepted.as_deref()),
			first_display_latency: self.first_display_latency,
			display_duration: self.display_started.map(|at| at.elapsed()),
			initial_typeahead: self.initial_typeahead,
		};
		if let Some(hook) = &self.hooks.on_outcome {
			hook(outcome);
		}
	}
}
