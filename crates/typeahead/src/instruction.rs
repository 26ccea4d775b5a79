/// A document rewrite requested by a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocEdit {
	/// Document offset the rewrite starts at.
	pub offset: usize,
	/// Number of bytes replaced.
	pub length: usize,
	/// Replacement text.
	pub content: String,
}

/// What the reconciliation loop should do in response to one event.
///
/// Produced per event and immediately consumed; `edit` splices the document
/// (triggering a recursive change event), `caret` moves the caret after any
/// edit has been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeaheadInstruction {
	/// Document rewrite to apply, if any.
	pub edit: Option<DocEdit>,
	/// Caret position to move to, if any.
	pub caret: Option<usize>,
}

impl TypeaheadInstruction {
	/// Instruction requesting no action.
	pub fn none() -> Self {
		Self::default()
	}

	/// Whether this instruction requests any action at all.
	pub fn is_noop(&self) -> bool {
		self.edit.is_none() && self.caret.is_none()
	}
}
