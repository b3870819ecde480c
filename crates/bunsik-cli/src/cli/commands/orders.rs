//! Order command handlers.

use anyhow::{Context, Result};
use bunsik_core::config::paths;
use bunsik_core::persistence::{self, OrderStatus};

pub fn list(limit: usize) -> Result<()> {
    let records = persistence::read_records(&paths::orders_path()).context("read order log")?;
    if records.is_empty() {
        println!("No orders found.");
        return Ok(());
    }

    for record in records.iter().rev().take(limit) {
        let unpaid = if record.unpaid { "  UNPAID" } else { "" };
        println!(
            "{}  {:<5}  {} item(s)  {:<12}  {}{}",
            record.short_id(),
            number_label(record.order_number),
            record.items.len(),
            status_label(record.status),
            format_timestamp(&record.created_at),
            unpaid,
        );
    }
    Ok(())
}

pub fn show(id: &str) -> Result<()> {
    let record = persistence::find_record(&paths::orders_path(), id)
        .with_context(|| format!("look up order '{id}'"))?;
    let Some(record) = record else {
        println!("Order '{id}' not found.");
        return Ok(());
    };

    println!("Order {}", record.id);
    println!("Created: {}", format_timestamp(&record.created_at));
    match record.order_number {
        0 => println!("Number:  none"),
        n => println!("Number:  #{n}"),
    }
    if record.unpaid {
        println!("Unpaid:  yes");
    }
    println!("Status:  {}", status_label(record.status));
    println!();

    for item in &record.items {
        let mut line = format!("{:>3}. {}", item.line_index + 1, item.name);
        if item.takeaway {
            line.push_str(" [bag]");
        }
        if let Some(group) = item.source_group {
            line.push_str(&format!(" (group #{group})"));
        }
        println!("{line}");

        let mut notes: Vec<&str> = item.notes.iter().map(|note| note.label.as_str()).collect();
        notes.extend(item.custom_notes.iter().map(String::as_str));
        if !notes.is_empty() {
            println!("       {}", notes.join(", "));
        }
    }
    Ok(())
}

fn number_label(order_number: u16) -> String {
    match order_number {
        0 => String::from("-"),
        n => format!("#{n}"),
    }
}

fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Saved => "saved",
        OrderStatus::Printed => "printed",
        OrderStatus::PrintFailed => "print failed",
    }
}

fn format_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
