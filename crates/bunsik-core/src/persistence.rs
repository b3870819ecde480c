//! Append-only JSONL order log.
//!
//! One line per submitted ticket:
//!
//! ```jsonl
//! {"id":"9f2c…","created_at":"2026-08-23T10:15:00+00:00","order_number":7,"unpaid":false,"status":"saved","items":[{"line_index":0,"dish_id":"beef_gimbap","name":"Beef Gimbap","category":"G","notes":[{"id":"no_onions","label":"No Onions"}],"custom_notes":[],"takeaway":false,"source_group":null}]}
//! ```
//!
//! Appends go straight to the end of the file. Status updates rewrite the
//! whole log through a temp file and rename, so a crash mid-update never
//! truncates it.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::catalog::{self, Category};
use crate::print::PrintEntry;

/// Terminal states of a submitted ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Saved,
    Printed,
    PrintFailed,
}

/// A built-in note as recorded on a line item: id plus display label, so the
/// log stays readable even if the catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRef {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub line_index: usize,
    pub dish_id: String,
    pub name: String,
    pub category: Option<Category>,
    /// Built-in notes in catalog order.
    pub notes: Vec<NoteRef>,
    #[serde(default)]
    pub custom_notes: Vec<String>,
    #[serde(default)]
    pub takeaway: bool,
    #[serde(default)]
    pub source_group: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub created_at: String,
    pub order_number: u16,
    pub unpaid: bool,
    pub status: OrderStatus,
    pub items: Vec<OrderLineItem>,
}

impl OrderRecord {
    /// Builds a saved-status record from a submission snapshot.
    ///
    /// Built-in notes are recorded in catalog order with their display
    /// labels; ids missing from the catalog are dropped.
    pub fn new(entries: &[PrintEntry], order_number: u16, unpaid: bool) -> Self {
        let items = entries
            .iter()
            .enumerate()
            .map(|(line_index, item)| {
                let notes = catalog::NOTE_CATALOG
                    .iter()
                    .filter(|(id, _)| item.entry.selected_notes.contains(*id))
                    .map(|&(id, label)| NoteRef {
                        id: id.to_string(),
                        label: label.to_string(),
                    })
                    .collect();
                OrderLineItem {
                    line_index,
                    dish_id: item.entry.dish_id.clone(),
                    name: item.entry.name.clone(),
                    category: item.entry.category,
                    notes,
                    custom_notes: item.entry.custom_notes.clone(),
                    takeaway: item.entry.takeaway,
                    source_group: item.source_group,
                }
            })
            .collect();
        Self {
            id: Uuid::new_v4().simple().to_string(),
            created_at: Utc::now().to_rfc3339(),
            order_number,
            unpaid,
            status: OrderStatus::Saved,
            items,
        }
    }

    /// First eight id characters, as shown in status messages.
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }
}

/// Appends one record to the order log, creating the file (and its parent
/// directory) on first write.
pub fn append_record(path: &Path, record: &OrderRecord) -> Result<()> {
    ensure!(
        record.order_number <= 1000,
        "Order number out of range: {}",
        record.order_number
    );
    ensure!(!record.items.is_empty(), "Refusing to record an empty order");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create order log directory {}", parent.display()))?;
    }
    let line = serde_json::to_string(record).context("Failed to serialize order record")?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open order log at {}", path.display()))?;
    writeln!(file, "{line}").context("Failed to append order record")?;
    Ok(())
}

/// All records in file order. Unparseable lines are skipped with a warning
/// rather than failing the whole read.
pub fn read_records(path: &Path) -> Result<Vec<OrderRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file =
        File::open(path).with_context(|| format!("Failed to open order log at {}", path.display()))?;
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.context("Failed to read order log")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(error) => warn!(%error, "Skipping unparseable order record"),
        }
    }
    Ok(records)
}

/// Rewrites the matching record's status in place. Returns `false` when no
/// record has the given id.
pub fn update_status(path: &Path, id: &str, status: OrderStatus) -> Result<bool> {
    let mut records = read_records(path)?;
    let mut found = false;
    for record in &mut records {
        if record.id == id {
            record.status = status;
            found = true;
        }
    }
    if !found {
        return Ok(false);
    }

    let tmp = path.with_extension("jsonl.tmp");
    let mut file =
        File::create(&tmp).with_context(|| format!("Failed to create {}", tmp.display()))?;
    for record in &records {
        let line = serde_json::to_string(record).context("Failed to serialize order record")?;
        writeln!(file, "{line}").context("Failed to rewrite order log")?;
    }
    file.sync_all().context("Failed to sync order log")?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace order log at {}", path.display()))?;
    Ok(true)
}

/// Looks up a record by exact id or unique prefix (the short id shown in
/// status messages).
pub fn find_record(path: &Path, id: &str) -> Result<Option<OrderRecord>> {
    let records = read_records(path)?;
    if let Some(record) = records.iter().find(|record| record.id == id) {
        return Ok(Some(record.clone()));
    }
    let mut matches = records.into_iter().filter(|record| record.id.starts_with(id));
    let first = matches.next();
    if matches.next().is_some() {
        bail!("Order id prefix {id} is ambiguous");
    }
    Ok(first)
}
