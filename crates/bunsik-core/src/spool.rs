//! Receipt rendering and the spool device.
//!
//! [`render_ticket`] turns a composed instruction sequence into fixed-width
//! ticket text. [`SpoolPrinter`] appends rendered tickets to a spool file,
//! standing in for the thermal-printer transport; anything implementing
//! [`ReceiptDevice`] can be swapped in without touching composition.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::print::PrintInstruction;

/// Sink for composed tickets. Consumes the instruction sequence verbatim;
/// ordering and grouping decisions all happen upstream in composition.
pub trait ReceiptDevice {
    fn print(&mut self, instructions: &[PrintInstruction]) -> Result<()>;
}

/// Renders one ticket as fixed-width text lines.
pub fn render_ticket(instructions: &[PrintInstruction], width: usize) -> String {
    let width = width.max(8);
    let mut lines: Vec<String> = Vec::new();
    for instruction in instructions {
        match instruction {
            PrintInstruction::Header { order_number, unpaid } => {
                let badge = if *unpaid { "UNPAID" } else { "" };
                if *order_number == 0 {
                    lines.push(badge.to_string());
                } else {
                    let number = order_number.to_string();
                    let pad = width.saturating_sub(badge.len() + number.len()).max(1);
                    lines.push(format!("{badge}{}{number}", " ".repeat(pad)));
                }
            }
            PrintInstruction::Label(label) => lines.push(label.clone()),
            PrintInstruction::Allocation(breakdown) => {
                let parts: Vec<String> = breakdown
                    .iter()
                    .map(|(id, count)| format!("#{id}x{count}"))
                    .collect();
                lines.push(format!("  {}", parts.join(" ")));
            }
            PrintInstruction::Notes(notes) => lines.push(format!("  {notes}")),
            PrintInstruction::Separator => lines.push("-".repeat(width)),
            PrintInstruction::Spacer => lines.push(String::new()),
            PrintInstruction::GroupTag(id) => lines.push(format!("#{id}")),
        }
    }

    // A one-row ticket gets an extra feed line so the stub is graspable.
    let label_count = instructions
        .iter()
        .filter(|instruction| matches!(instruction, PrintInstruction::Label(_)))
        .count();
    if label_count == 1 {
        lines.push(String::new());
    }

    let mut ticket = lines.join("\n");
    ticket.push('\n');
    ticket
}

/// Appends rendered tickets to a spool file, one cut line between tickets.
#[derive(Debug)]
pub struct SpoolPrinter {
    path: PathBuf,
    width: usize,
}

impl SpoolPrinter {
    pub fn new(path: PathBuf, width: usize) -> Self {
        Self { path, width }
    }
}

impl ReceiptDevice for SpoolPrinter {
    fn print(&mut self, instructions: &[PrintInstruction]) -> Result<()> {
        let ticket = render_ticket(instructions, self.width);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create spool directory {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open spool file {}", self.path.display()))?;
        write!(file, "{ticket}").context("Failed to write ticket to spool")?;
        writeln!(file, "{}", "=".repeat(self.width)).context("Failed to write cut line to spool")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_right_aligns_the_order_number() {
        let ticket = render_ticket(
            &[
                PrintInstruction::Header {
                    order_number: 7,
                    unpaid: false,
                },
                PrintInstruction::Label("G-Beef".into()),
                PrintInstruction::Label("R-Pork".into()),
            ],
            32,
        );
        let lines: Vec<&str> = ticket.lines().collect();
        assert_eq!(lines[0].len(), 32);
        assert!(lines[0].ends_with('7'));
        assert!(!lines[0].contains("UNPAID"));
    }

    #[test]
    fn unpaid_badge_prints_without_a_number() {
        let ticket = render_ticket(
            &[
                PrintInstruction::Header {
                    order_number: 0,
                    unpaid: true,
                },
                PrintInstruction::Label("G-Beef".into()),
                PrintInstruction::Label("G-Tuna".into()),
            ],
            32,
        );
        assert_eq!(ticket.lines().next(), Some("UNPAID"));
    }

    #[test]
    fn rows_render_with_indented_details() {
        let ticket = render_ticket(
            &[
                PrintInstruction::Label("G-Beef 3".into()),
                PrintInstruction::Allocation(vec![(1, 2), (2, 1)]),
                PrintInstruction::Notes("+ spicy".into()),
                PrintInstruction::Separator,
                PrintInstruction::Label("Kimchi".into()),
            ],
            16,
        );
        let lines: Vec<&str> = ticket.lines().collect();
        assert_eq!(lines[0], "G-Beef 3");
        assert_eq!(lines[1], "  #1x2 #2x1");
        assert_eq!(lines[2], "  + spicy");
        assert_eq!(lines[3], "-".repeat(16));
        assert_eq!(lines[4], "Kimchi");
    }

    #[test]
    fn bag_blocks_render_with_tag_and_spacing() {
        let ticket = render_ticket(
            &[
                PrintInstruction::Label("R-Pork".into()),
                PrintInstruction::Spacer,
                PrintInstruction::Label("G-Beef".into()),
                PrintInstruction::GroupTag(2),
            ],
            32,
        );
        let lines: Vec<&str> = ticket.lines().collect();
        assert_eq!(lines, ["R-Pork", "", "G-Beef", "#2"]);
    }

    #[test]
    fn one_row_tickets_get_an_extra_feed_line() {
        let ticket = render_ticket(&[PrintInstruction::Label("T.T.".into())], 32);
        assert_eq!(ticket, "T.T.\n\n");
    }

    #[test]
    fn spool_appends_tickets_with_cut_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("receipts.txt");
        let mut printer = SpoolPrinter::new(path.clone(), 10);

        printer.print(&[PrintInstruction::Label("G-Beef".into())]).unwrap();
        printer
            .print(&[
                PrintInstruction::Label("R-Pork".into()),
                PrintInstruction::Label("Kimchi".into()),
            ])
            .unwrap();

        let spool = std::fs::read_to_string(&path).unwrap();
        assert_eq!(spool.matches("==========").count(), 2);
        assert!(spool.contains("G-Beef\n"));
        assert!(spool.contains("R-Pork\nKimchi\n"));
    }
}
