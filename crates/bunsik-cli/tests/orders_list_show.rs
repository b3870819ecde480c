//! Integration tests for `bunsik orders list` and `bunsik orders show`.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

/// Appends a fake order record to the order log.
fn append_order(
    temp_dir: &TempDir,
    id: &str,
    order_number: u16,
    unpaid: bool,
    status: &str,
    names: &[&str],
) {
    let items: Vec<serde_json::Value> = names
        .iter()
        .enumerate()
        .map(|(line_index, name)| {
            json!({
                "line_index": line_index,
                "dish_id": name.to_lowercase().replace(' ', "_"),
                "name": name,
                "category": "G",
                "notes": [],
                "custom_notes": [],
                "takeaway": false,
                "source_group": null
            })
        })
        .collect();

    let record = json!({
        "id": id,
        "created_at": "2026-08-23T10:15:00+00:00",
        "order_number": order_number,
        "unpaid": unpaid,
        "status": status,
        "items": items
    });

    let orders_path = temp_dir.path().join("orders.jsonl");
    let mut content = fs::read_to_string(&orders_path).unwrap_or_default();
    content.push_str(&serde_json::to_string(&record).unwrap());
    content.push('\n');
    fs::write(&orders_path, content).unwrap();
}

#[test]
fn test_orders_list_empty() {
    let temp_dir = TempDir::new().unwrap();

    cargo_bin_cmd!("bunsik")
        .env("BUNSIK_HOME", temp_dir.path())
        .args(["orders", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No orders found."));
}

#[test]
fn test_orders_list_newest_first() {
    let temp_dir = TempDir::new().unwrap();

    append_order(
        &temp_dir,
        "11111111000000000000000000000000",
        7,
        false,
        "printed",
        &["Beef Gimbap"],
    );
    append_order(
        &temp_dir,
        "22222222000000000000000000000000",
        8,
        false,
        "saved",
        &["Cheese Ramyun"],
    );

    let output = cargo_bin_cmd!("bunsik")
        .env("BUNSIK_HOME", temp_dir.path())
        .args(["orders", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let output_str = String::from_utf8_lossy(&output);
    assert!(output_str.contains("11111111"));
    assert!(output_str.contains("22222222"));

    // The second append is the newer order; it should be printed first.
    let first_pos = output_str.find("11111111").unwrap();
    let second_pos = output_str.find("22222222").unwrap();
    assert!(second_pos < first_pos, "Orders should be listed newest first");
}

#[test]
fn test_orders_list_respects_limit() {
    let temp_dir = TempDir::new().unwrap();

    append_order(
        &temp_dir,
        "aaaaaaaa000000000000000000000000",
        1,
        false,
        "printed",
        &["Beef Gimbap"],
    );
    append_order(
        &temp_dir,
        "bbbbbbbb000000000000000000000000",
        2,
        false,
        "printed",
        &["Kimchi Gimbap"],
    );

    cargo_bin_cmd!("bunsik")
        .env("BUNSIK_HOME", temp_dir.path())
        .args(["orders", "list", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bbbbbbbb"))
        .stdout(predicate::str::contains("aaaaaaaa").not());
}

#[test]
fn test_orders_list_marks_unpaid() {
    let temp_dir = TempDir::new().unwrap();

    append_order(
        &temp_dir,
        "cccccccc000000000000000000000000",
        3,
        true,
        "printed",
        &["Ramyun"],
    );

    cargo_bin_cmd!("bunsik")
        .env("BUNSIK_HOME", temp_dir.path())
        .args(["orders", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UNPAID"));
}

#[test]
fn test_orders_show_prints_items() {
    let temp_dir = TempDir::new().unwrap();

    let record = json!({
        "id": "feedc0de000000000000000000000000",
        "created_at": "2026-08-23T10:15:00+00:00",
        "order_number": 42,
        "unpaid": true,
        "status": "print_failed",
        "items": [
            {
                "line_index": 0,
                "dish_id": "beef_gimbap",
                "name": "Beef Gimbap",
                "category": "G",
                "notes": [{"id": "no_cuccumber", "label": "No Cuccumber"}],
                "custom_notes": ["extra sauce"],
                "takeaway": true,
                "source_group": 1
            },
            {
                "line_index": 1,
                "dish_id": "tteokbokki",
                "name": "Tteokbokki",
                "category": null,
                "notes": [],
                "custom_notes": [],
                "takeaway": false,
                "source_group": null
            }
        ]
    });
    fs::write(
        temp_dir.path().join("orders.jsonl"),
        format!("{}\n", serde_json::to_string(&record).unwrap()),
    )
    .unwrap();

    cargo_bin_cmd!("bunsik")
        .env("BUNSIK_HOME", temp_dir.path())
        .args(["orders", "show", "feedc0de000000000000000000000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Order feedc0de000000000000000000000000",
        ))
        .stdout(predicate::str::contains("#42"))
        .stdout(predicate::str::contains("Unpaid:  yes"))
        .stdout(predicate::str::contains("print failed"))
        .stdout(predicate::str::contains("Beef Gimbap [bag] (group #1)"))
        .stdout(predicate::str::contains("No Cuccumber, extra sauce"))
        .stdout(predicate::str::contains("Tteokbokki"));
}

#[test]
fn test_orders_show_accepts_short_id_prefix() {
    let temp_dir = TempDir::new().unwrap();

    append_order(
        &temp_dir,
        "deadbeef000000000000000000000000",
        9,
        false,
        "saved",
        &["Tuna Gimbap"],
    );

    cargo_bin_cmd!("bunsik")
        .env("BUNSIK_HOME", temp_dir.path())
        .args(["orders", "show", "deadbeef"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Order deadbeef000000000000000000000000",
        ))
        .stdout(predicate::str::contains("Tuna Gimbap"));
}

#[test]
fn test_orders_show_ambiguous_prefix_fails() {
    let temp_dir = TempDir::new().unwrap();

    append_order(
        &temp_dir,
        "aaaa1111000000000000000000000000",
        1,
        false,
        "saved",
        &["Beef Gimbap"],
    );
    append_order(
        &temp_dir,
        "aaaa2222000000000000000000000000",
        2,
        false,
        "saved",
        &["Cheese Ramyun"],
    );

    cargo_bin_cmd!("bunsik")
        .env("BUNSIK_HOME", temp_dir.path())
        .args(["orders", "show", "aaaa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous"));
}

#[test]
fn test_orders_show_nonexistent() {
    let temp_dir = TempDir::new().unwrap();

    cargo_bin_cmd!("bunsik")
        .env("BUNSIK_HOME", temp_dir.path())
        .args(["orders", "show", "does-not-exist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));
}
