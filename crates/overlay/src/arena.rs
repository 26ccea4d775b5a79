use crate::segment::{CloseBracket, OpenBracket, Segment, SegmentId};

/// Arena of suggestion segments plus the offset-indexed bracket table.
///
/// The table has one slot per byte of the suggestion's `insert_text`; a slot
/// holds the id of the bracket half relevant at that offset. Delayed-brace
/// policies register an open `{` at the first newline after it rather than at
/// its own offset, because such hosts only insert the matching `}` once a
/// line break is typed.
#[derive(Debug, Clone, Default)]
pub struct SegmentArena {
	segments: Vec<Segment>,
	by_offset: Vec<Option<SegmentId>>,
}

impl SegmentArena {
	pub(crate) fn new(suggestion_len: usize) -> Self {
		Self {
			segments: Vec::new(),
			by_offset: vec![None; suggestion_len],
		}
	}

	/// Size of the bracket table, equal to the suggestion's byte length.
	pub fn len(&self) -> usize {
		self.by_offset.len()
	}

	/// Whether the suggestion was empty.
	pub fn is_empty(&self) -> bool {
		self.by_offset.is_empty()
	}

	pub(crate) fn push(&mut self, segment: Segment) -> SegmentId {
		let id = SegmentId(self.segments.len());
		self.segments.push(segment);
		id
	}

	pub(crate) fn register(&mut self, offset_idx: usize, id: SegmentId) {
		assert!(
			offset_idx < self.by_offset.len(),
			"bracket table offset {offset_idx} out of range for suggestion of length {}",
			self.by_offset.len()
		);
		self.by_offset[offset_idx] = Some(id);
	}

	/// The segment stored under `id`.
	pub fn get(&self, id: SegmentId) -> &Segment {
		&self.segments[id.0]
	}

	pub(crate) fn get_mut(&mut self, id: SegmentId) -> &mut Segment {
		&mut self.segments[id.0]
	}

	/// Bracket half registered at a suggestion offset, if any.
	///
	/// Offsets past the suggestion length are an offset-bookkeeping bug in
	/// the caller; this asserts rather than clamps, since clamping would
	/// silently corrupt reconciliation state.
	pub fn bracket_at(&self, offset_idx: usize) -> Option<SegmentId> {
		assert!(
			offset_idx < self.by_offset.len(),
			"bracket table offset {offset_idx} out of range for suggestion of length {}",
			self.by_offset.len()
		);
		self.by_offset[offset_idx]
	}

	/// Symbol of the bracket registered at `offset_idx`, if any.
	pub fn bracket_symbol(&self, offset_idx: usize) -> Option<char> {
		self.bracket_at(offset_idx).map(|id| match self.get(id) {
			Segment::Open(open) => open.symbol,
			Segment::Close(close) => close.symbol,
			_ => unreachable!("bracket table entries are bracket halves"),
		})
	}

	/// The open bracket registered at `offset_idx`, if that slot holds one.
	pub fn open_at(&self, offset_idx: usize) -> Option<&OpenBracket> {
		match self.bracket_at(offset_idx).map(|id| self.get(id)) {
			Some(Segment::Open(open)) => Some(open),
			_ => None,
		}
	}

	/// The close bracket registered at `offset_idx`, if that slot holds one.
	pub fn close_at(&self, offset_idx: usize) -> Option<&CloseBracket> {
		match self.bracket_at(offset_idx).map(|id| self.get(id)) {
			Some(Segment::Close(close)) => Some(close),
			_ => None,
		}
	}

	/// The open bracket stored under `id`, if that segment is one.
	pub fn open(&self, id: SegmentId) -> Option<&OpenBracket> {
		match self.get(id) {
			Segment::Open(open) => Some(open),
			_ => None,
		}
	}

	/// Marks the bracket at `offset_idx` as typed over by verified input.
	///
	/// Typing the open half leaves its ghost close owed (`resolved = false`);
	/// typing the close half settles the pair.
	pub fn mark_typed_over(&mut self, offset_idx: usize) {
		let Some(id) = self.bracket_at(offset_idx) else {
			return;
		};
		let open_to_settle = match self.get(id) {
			Segment::Open(_) => None,
			Segment::Close(close) => Some(close.paired_open),
			_ => return,
		};
		match open_to_settle {
			None => {
				if let Segment::Open(open) = self.get_mut(id) {
					open.resolved = false;
				}
			}
			Some(open_id) => {
				if let Segment::Open(open) = self.get_mut(open_id) {
					open.resolved = true;
				}
			}
		}
	}

	/// Reverts the typing state of the bracket at `offset_idx` after a
	/// deletion walked back over it.
	pub fn mark_deleted(&mut self, offset_idx: usize) {
		let Some(id) = self.bracket_at(offset_idx) else {
			return;
		};
		let open_id = match self.get(id) {
			Segment::Open(_) => id,
			Segment::Close(close) => close.paired_open,
			_ => return,
		};
		if let Segment::Open(open) = self.get_mut(open_id) {
			open.resolved = true;
		}
	}

	/// Records that the host's auto-close fired for the open bracket at
	/// `offset_idx`. No-op for other slots.
	pub fn set_auto_close_seen(&mut self, offset_idx: usize) {
		let Some(id) = self.bracket_at(offset_idx) else {
			return;
		};
		if let Segment::Open(open) = self.get_mut(id) {
			open.auto_close_seen = true;
		}
	}

	/// All segments in discovery order.
	pub fn segments(&self) -> impl Iterator<Item = &Segment> {
		self.segments.iter()
	}

	/// Segments the renderer draws standalone: normal lines, close-bracket
	/// halves, and right context. Open halves render inline with their line
	/// and are skipped.
	pub fn render_segments(&self) -> impl Iterator<Item = &Segment> {
		self.segments
			.iter()
			.filter(|segment| !matches!(segment, Segment::Open(_)))
	}

	/// Attaches the displaced right-context segment for multi-line previews.
	pub fn set_right_context(&mut self, strike_text: String, first_line: String) {
		self.push(Segment::RightContext { strike_text, first_line });
	}

	/// The captured right-context text, if any.
	pub fn right_context(&self) -> Option<&str> {
		self.segments.iter().find_map(|segment| match segment {
			Segment::RightContext { strike_text, .. } => Some(strike_text.as_str()),
			_ => None,
		})
	}

	/// Open brackets in reverse table order (innermost first), as walked by
	/// teardown synthesis and padding accounting.
	pub fn opens_reverse(&self) -> impl Iterator<Item = &OpenBracket> {
		self.by_offset
			.iter()
			.rev()
			.flatten()
			.filter_map(|id| self.open(*id))
	}
}
