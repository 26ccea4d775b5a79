//! Per-language typeahead policies.
//!
//! While a suggestion is previewed, the host editor's own auto-close behavior
//! keeps firing: typing `(` may land as `()` in the buffer, a line break
//! after `{` may expand into a whole brace template. The engine cannot
//! disable that behavior, so each language provides a [`TypeaheadPolicy`]
//! that recognizes the interference and emits normalizing
//! [`TypeaheadInstruction`]s. New languages add a policy instance; the
//! reconciliation loop never changes.

mod delayed_brace;
mod immediate_brace;
mod instruction;
mod policy;

#[cfg(test)]
mod tests;

pub use delayed_brace::DelayedBracePolicy;
pub use ghostline_overlay::AutoCloseConfig;
pub use immediate_brace::ImmediateBracePolicy;
pub use instruction::{DocEdit, TypeaheadInstruction};
pub use policy::{TypeaheadPolicy, policy_for_language};
