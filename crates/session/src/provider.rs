//! External seams: the completion backend and the credential gate.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::context::Suggestion;

/// What caused a completion query to be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
	/// Issued by the engine as the user types.
	Automatic,
	/// Explicitly requested by the user.
	Invoke,
}

/// Caret position handed to the provider, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPosition {
	pub line: usize,
	pub character: usize,
}

/// One resolved completion query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
	/// Provider-side session identifier, echoed back in the outcome.
	pub session_id: String,
	pub items: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("completion provider failed: {0}")]
pub struct ProviderError(pub String);

/// Identifier of one in-flight query, unique per dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId(Uuid);

impl QueryId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for QueryId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for QueryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Source of inline completion candidates.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
	async fn fetch(
		&self,
		position: DocumentPosition,
		trigger: TriggerKind,
	) -> Result<FetchResult, ProviderError>;
}

/// Gate consulted before a session starts. A session never begins while the
/// host has no usable credentials.
pub trait AuthGate: Send + Sync {
	fn has_credentials(&self) -> bool;
}

/// Gate that always passes, for hosts without an auth concept.
pub struct AlwaysAuthorized;

impl AuthGate for AlwaysAuthorized {
	fn has_credentials(&self) -> bool {
		true
	}
}
