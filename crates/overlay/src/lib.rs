//! Segmentation of inline suggestions into renderable overlay segments.
//!
//! A suggestion is an immutable string shown as ghost text over the live
//! document. Before it can be rendered or typed through, it is scanned once
//! into a [`SegmentArena`]: per-line normal segments, paired bracket halves,
//! and an optional struck-through right-context segment. Paired brackets are
//! addressed by [`SegmentId`] instead of direct references so the pairing
//! back-links stay cycle-free.

mod arena;
mod config;
mod segment;
mod segmentation;

#[cfg(test)]
mod tests;

pub use arena::SegmentArena;
pub use config::AutoCloseConfig;
pub use segment::{CloseBracket, OpenBracket, Segment, SegmentId};
pub use segmentation::segment_suggestion;
