// Trigger evaluation - the hit engine, membership, calltip synthesis, and
// the scope enumerations behind completion replies.

pub mod evaluator;
pub mod reply;
pub mod trigger;

mod calltips;
mod completions;
mod members;

// Re-export main types for easy access
pub use evaluator::Evaluator;
pub use reply::{Completion, CompletionKind, Definition, Reply};
pub use trigger::{Trigger, TriggerKind};
