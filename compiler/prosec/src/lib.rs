//! Prose driver.
//!
//! The `prose` binary runs a script, checks it statically, or starts a
//! REPL. Everything it does goes through [`run_source`]: lex, parse into a
//! symbol table, optionally check, then interpret.

pub mod commands;
mod pipeline;

use std::sync::Once;

pub use pipeline::{compile, run_source, Failure};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber when `PROSE_LOG` is set.
///
/// `PROSE_LOG` takes an `EnvFilter` directive, e.g. `PROSE_LOG=prose_eval=debug`.
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var_os("PROSE_LOG").is_some() {
            let filter = EnvFilter::from_env("PROSE_LOG");
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
