//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O only (no direct UI mutations). This keeps the reducer
//! pure: it mutates state and returns effects, never touches disk or printer.

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Persist the current register as an order and print its ticket.
    ///
    /// An `order_number` of zero submits without a numbered header.
    Submit { order_number: u16, unpaid: bool },
}
