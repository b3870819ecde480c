//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//! Submission is the one real side effect: persist the order, print the
//! ticket, report the outcome in the status line.

use std::io::Stdout;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, error, info, warn};

use bunsik_core::config::{Config, paths};
use bunsik_core::persistence::{self, OrderRecord, OrderStatus};
use bunsik_core::print::{compose, flatten_register};
use bunsik_core::spool::{ReceiptDevice, SpoolPrinter};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, TuiState};
use crate::{render, terminal, update};

/// Poll timeout for terminal events. Nothing animates, so a relaxed cadence
/// keeps CPU use negligible while staying responsive to input.
const POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Runs the event loop and executes effects.
/// Terminal state is guaranteed to be restored on drop, panic, or Ctrl+C.
pub struct TuiRuntime {
    /// Terminal instance.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state (split: tui + overlay).
    pub state: AppState,
    /// Ticket sink submitted orders print to.
    device: Box<dyn ReceiptDevice>,
    /// Append-only order log.
    orders_path: PathBuf,
}

impl TuiRuntime {
    /// Creates a new TUI runtime.
    ///
    /// # Errors
    /// Returns an error if terminal setup fails.
    pub fn new(config: Config) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let device = SpoolPrinter::new(config.effective_spool_path(), config.receipt_width);
        let state = AppState::new(config);

        Ok(Self {
            terminal,
            state,
            device: Box::new(device),
            orders_path: paths::orders_path(),
        })
    }

    /// Runs the main event loop.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true; // Start dirty to ensure initial render

        while !self.state.tui.should_quit {
            for event in self.collect_events()? {
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
                dirty = true;
            }

            // Only render if something changed
            if dirty {
                // Render - state is a separate field, no borrow conflict
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    /// Polls the terminal for input, draining any buffered backlog in one
    /// pass. Key releases and repeats are filtered out here so the reducer
    /// only ever sees presses.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();
        if event::poll(POLL_DURATION)? {
            push_terminal_event(&mut events, event::read()?);
            while event::poll(Duration::ZERO)? {
                push_terminal_event(&mut events, event::read()?);
            }
        }
        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    /// Executes effects returned by the reducer.
    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            match effect {
                UiEffect::Quit => self.state.tui.should_quit = true,
                UiEffect::Submit {
                    order_number,
                    unpaid,
                } => {
                    execute_submit(
                        &mut self.state.tui,
                        self.device.as_mut(),
                        &self.orders_path,
                        order_number,
                        unpaid,
                    );
                }
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}

fn push_terminal_event(events: &mut Vec<UiEvent>, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            debug!(code = ?key.code, modifiers = ?key.modifiers, "key press");
            events.push(UiEvent::Key(key));
        }
        Event::Resize(_, _) => events.push(UiEvent::Resize),
        _ => {}
    }
}

/// Runs the submit pipeline: snapshot the register, persist the order, then
/// print the ticket.
///
/// Persist-then-print, compensating on failure: a print failure never rolls
/// back the saved record, it re-marks the record `print_failed` and keeps
/// the register so the operator decides what to do next. Only a fully
/// successful submit clears the register.
fn execute_submit(
    tui: &mut TuiState,
    device: &mut dyn ReceiptDevice,
    orders_path: &Path,
    order_number: u16,
    unpaid: bool,
) {
    let entries = flatten_register(&tui.register);
    if entries.is_empty() {
        tui.status = "Nothing to submit".to_string();
        return;
    }

    let record = OrderRecord::new(&entries, order_number, unpaid);
    let short = record.short_id().to_string();
    if let Err(e) = persistence::append_record(orders_path, &record) {
        error!("order save failed: {e:#}");
        tui.status = format!("Save failed: {e:#}");
        return;
    }

    let instructions = compose(&entries, order_number, unpaid);
    match device.print(&instructions) {
        Ok(()) => {
            if let Err(e) = persistence::update_status(orders_path, &record.id, OrderStatus::Printed)
            {
                warn!("status update failed: {e:#}");
            }
            info!(order = %short, items = entries.len(), "order saved and printed");
            tui.register.clear();
            tui.status = format!("Saved + printed: {short}");
        }
        Err(e) => {
            if let Err(update_err) =
                persistence::update_status(orders_path, &record.id, OrderStatus::PrintFailed)
            {
                warn!("status update failed: {update_err:#}");
            }
            error!(order = %short, "ticket print failed: {e:#}");
            tui.status = format!("Saved {short} but print failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use bunsik_core::catalog;
    use bunsik_core::print::PrintInstruction;
    use bunsik_core::register::OrderEntry;

    use super::*;

    /// Captures printed instruction sequences; can be armed to fail.
    #[derive(Default)]
    struct MockDevice {
        printed: Vec<Vec<PrintInstruction>>,
        fail: bool,
    }

    impl ReceiptDevice for MockDevice {
        fn print(&mut self, instructions: &[PrintInstruction]) -> Result<()> {
            if self.fail {
                return Err(anyhow!("paper jam"));
            }
            self.printed.push(instructions.to_vec());
            Ok(())
        }
    }

    fn state_with(ids: &[&str]) -> TuiState {
        let mut tui = TuiState::new(Config::default());
        for id in ids {
            let dish = catalog::dish_by_id(id).unwrap();
            tui.register.push_entry(OrderEntry::for_dish(dish));
        }
        tui
    }

    #[test]
    fn submit_persists_prints_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let orders = dir.path().join("orders.jsonl");
        let mut tui = state_with(&["beef_gimbap", "pork_ramyun"]);
        let mut device = MockDevice::default();

        execute_submit(&mut tui, &mut device, &orders, 7, false);

        assert!(tui.register.is_empty());
        assert!(tui.status.starts_with("Saved + printed: "));
        assert_eq!(device.printed.len(), 1);
        assert!(matches!(
            device.printed[0][0],
            PrintInstruction::Header {
                order_number: 7,
                unpaid: false
            }
        ));

        let records = persistence::read_records(&orders).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, OrderStatus::Printed);
        assert_eq!(records[0].order_number, 7);
        assert_eq!(records[0].items.len(), 2);
    }

    #[test]
    fn print_failure_keeps_the_record_and_the_register() {
        let dir = tempfile::tempdir().unwrap();
        let orders = dir.path().join("orders.jsonl");
        let mut tui = state_with(&["tteokbokki"]);
        let mut device = MockDevice {
            fail: true,
            ..MockDevice::default()
        };

        execute_submit(&mut tui, &mut device, &orders, 3, true);

        assert!(!tui.register.is_empty());
        assert!(tui.status.contains("but print failed: paper jam"));

        let records = persistence::read_records(&orders).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, OrderStatus::PrintFailed);
        assert!(records[0].unpaid);
    }

    #[test]
    fn save_failure_skips_printing() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the log path makes the append fail.
        let orders = dir.path().join("orders.jsonl");
        std::fs::create_dir(&orders).unwrap();
        let mut tui = state_with(&["beef_gimbap"]);
        let mut device = MockDevice::default();

        execute_submit(&mut tui, &mut device, &orders, 1, false);

        assert!(!tui.register.is_empty());
        assert!(tui.status.starts_with("Save failed: "));
        assert!(device.printed.is_empty());
    }

    #[test]
    fn headerless_submit_composes_without_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let orders = dir.path().join("orders.jsonl");
        let mut tui = state_with(&["kimchi_side"]);
        let mut device = MockDevice::default();

        execute_submit(&mut tui, &mut device, &orders, 0, false);

        assert!(tui.register.is_empty());
        assert!(!matches!(
            device.printed[0][0],
            PrintInstruction::Header { .. }
        ));
    }
}
