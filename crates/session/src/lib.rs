//! Inline-suggestion invocation sessions.
//!
//! Ties the segment overlay and typeahead policies to a host editor: one
//! [`InvocationSession`] per surface runs the
//! `Inactive -> Invoking -> Previewing -> DecisionMade` state machine,
//! fetches candidates asynchronously, reconciles the user's typing against
//! the previewed suggestion, and repairs the document when the preview is
//! dismissed.

mod context;
mod provider;
mod reconcile;
mod session;
mod surface;

pub use context::{
	CodeReference, CompletionOutcome, SessionOutcome, Suggestion, SuggestionContext,
	SuggestionState,
};
pub use provider::{
	AlwaysAuthorized, AuthGate, CompletionProvider, DocumentPosition, FetchResult, ProviderError,
	QueryId, TriggerKind,
};
pub use reconcile::{DocumentChange, ReconcileOutcome, VerifiedKey};
pub use session::{InvocationSession, SessionHooks, SessionMsg, SessionState};
pub use surface::{EditorSurface, SurfaceError};
