//! Full-screen TUI for the bunsik order register.

pub mod common;
pub mod effects;
pub mod events;
pub mod mutations;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
use bunsik_core::config::Config;
pub use runtime::TuiRuntime;

/// Runs the interactive register loop.
pub fn run_register(config: Config) -> Result<()> {
    // The register is a full-screen TUI and needs a real terminal
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The register requires a terminal.\n\
             Use `bunsik orders list` to inspect saved orders instead."
        );
    }

    let mut runtime = TuiRuntime::new(config)?;
    let result = runtime.run();
    drop(runtime); // restores the terminal
    result?;

    // Print goodbye after the TUI exits (terminal restored)
    eprintln!("Goodbye!");

    Ok(())
}
