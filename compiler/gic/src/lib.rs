//! Incremental Go-to-Lua translation for an interactive shell.
//!
//! # Architecture
//!
//! ```text
//! line ──▶ IncrementalSession::submit
//!              │
//!              ├─ SourceAccumulator   (text since the last finished construct)
//!              ├─ gi_parse::Classifier (Empty / Complete / NeedMoreInput / SyntaxError)
//!              ├─ gi_types::check_unit (DeclarationTable, replace semantics)
//!              └─ gi_emit::LuaEmitter
//!              ▼
//!          SessionResult::{Waiting, Translated} | SessionError
//! ```
//!
//! The `gi` binary wraps a session in a read-eval-print loop
//! ([`commands::run_repl`]) or translates a whole file at once
//! ([`commands::translate_source`]).

pub mod commands;
mod config;
mod diagnostic;
mod session;

pub use config::{parse_cli_options, CliOptions, DeclarationMode, SessionConfig};
pub use diagnostic::{render, Position};
pub use session::{IncrementalSession, SessionError, SessionResult, SourceAccumulator};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// The filter comes from `GI_LOG`, then `RUST_LOG`, then `verbosity`
/// (0: warn, 1: debug, 2+: trace). Setting `GI_LOG_TREE` switches to
/// indented span trees. Safe to call more than once.
pub fn init_tracing(verbosity: u8) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        let filter = EnvFilter::try_from_env("GI_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

        let tree = std::env::var_os("GI_LOG_TREE").map(|_| {
            HierarchicalLayer::new(2)
                .with_targets(true)
                .with_indent_lines(true)
        });
        let flat = tree.is_none().then(|| {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr)
        });

        if let Err(e) = tracing_subscriber::registry()
            .with(flat)
            .with(tree)
            .with(filter)
            .try_init()
        {
            eprintln!("warning: could not install log subscriber: {e}");
        }
    });
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}
