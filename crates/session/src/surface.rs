//! The editor surface seam.
//!
//! The session engine never talks to a widget toolkit directly; everything
//! it needs from the host editor goes through [`EditorSurface`]. Hosts are
//! expected to forward their document-change, verified-key, caret and mouse
//! events into the session's `on_*` entry points themselves.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
	#[error("offset {offset} out of bounds (document length {len})")]
	OffsetOutOfBounds { offset: usize, len: usize },
	#[error("edit rejected by host: {0}")]
	EditRejected(String),
}

/// Host editor operations the session engine depends on.
///
/// Offsets and lengths are byte-based; lines are zero-based.
pub trait EditorSurface {
	fn caret_offset(&self) -> usize;
	fn set_caret_offset(&mut self, offset: usize);

	fn line_at_offset(&self, offset: usize) -> usize;
	/// Byte offset of the first character of `line`.
	fn offset_at_line(&self, line: usize) -> usize;
	/// Text of `line` without its separator.
	fn line_text(&self, line: usize) -> String;

	fn text_range(&self, offset: usize, length: usize) -> Result<String, SurfaceError>;

	/// Replaces `length` bytes at `offset` with `content`.
	fn apply_edit(&mut self, offset: usize, length: usize, content: &str)
	-> Result<(), SurfaceError>;

	/// Maps a model offset into the host's expanded coordinate space when
	/// the host renders with code folding or similar transforms. Hosts
	/// without such a transform keep the identity.
	fn offset_in_expanded_document(&self, offset: usize) -> usize {
		offset
	}

	/// Reserves `height` pixels of vertical space under `line` for the
	/// ghost-text overlay, or releases it when `height` is zero.
	fn set_line_vertical_indent(&mut self, line: usize, height: u32);
}
