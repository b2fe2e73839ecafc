//! Command handlers for the `gi` binary.

mod repl;
mod translate;

pub use repl::{run_repl, ReplOptions, CONTINUATION_PROMPT, PROMPT};
pub use translate::translate_source;
