use anyhow::{Result, bail};
use std::process;

use fitsphere_core::foods::kcal_per_100g;
use fitsphere_core::models::{Category, Entry};

use super::Service;
use super::helpers::{
    json_error, parse_category, parse_timestamp, print_entries_table, prompt_confirm,
};

fn print_logged(entry: &Entry, category: Category) {
    println!(
        "Logged: {} {} {} at {}",
        entry.label,
        category.format_value(entry.value),
        category.info().unit,
        entry.timestamp.format("%Y-%m-%d %H:%M")
    );
}

pub(crate) fn cmd_log(
    svc: &mut Service,
    category: &str,
    value: f64,
    label: Option<&str>,
    date: Option<String>,
    time: Option<String>,
    json: bool,
) -> Result<()> {
    let category = parse_category(category)?;
    if !value.is_finite() {
        bail!("Value must be a number");
    }
    let timestamp = parse_timestamp(date, time)?;
    let entry = svc.log_entry(category, label.unwrap_or_default(), value, timestamp)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        print_logged(&entry, category);
    }
    Ok(())
}

pub(crate) fn cmd_food(
    svc: &mut Service,
    name: &str,
    grams: f64,
    date: Option<String>,
    time: Option<String>,
    json: bool,
) -> Result<()> {
    if !grams.is_finite() {
        bail!("Grams must be a number");
    }
    if kcal_per_100g(name) == 0.0 {
        eprintln!("Note: '{name}' is not in the food table, logging 0 kcal");
    }
    let timestamp = parse_timestamp(date, time)?;
    let entry = svc.log_food(name, grams, timestamp)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        print_logged(&entry, Category::Calories);
    }
    Ok(())
}

pub(crate) fn cmd_entries(svc: &Service, category: &str, json: bool) -> Result<()> {
    let category = parse_category(category)?;
    let entries = svc.entries(category);

    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else if entries.is_empty() {
        eprintln!("No {category} entries. Use `fitsphere log {category} <value>` to add one.");
    } else {
        print_entries_table(category, entries);
    }
    Ok(())
}

pub(crate) fn cmd_delete(svc: &mut Service, category: &str, id: &str, json: bool) -> Result<()> {
    let category = parse_category(category)?;
    let deleted = svc.delete_entry(category, id)?;

    if !deleted {
        if json {
            println!("{}", json_error(&format!("No {category} entry with id '{id}'")));
        } else {
            eprintln!("No {category} entry with id '{id}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id, "category": category }));
    } else {
        println!("Deleted {category} entry {id}");
    }
    Ok(())
}

pub(crate) fn cmd_clear(svc: &mut Service, category: &str, yes: bool, json: bool) -> Result<()> {
    let category = parse_category(category)?;
    let count = svc.entries(category).len();

    if !yes {
        if json {
            bail!("Refusing to clear without --yes in JSON mode");
        }
        if !prompt_confirm(&format!("Delete all {count} {category} entries?"))? {
            eprintln!("Aborted");
            return Ok(());
        }
    }

    let removed = svc.clear_entries(category)?;
    if json {
        println!("{}", serde_json::json!({ "cleared": removed, "category": category }));
    } else {
        println!("Cleared {removed} {category} entries");
    }
    Ok(())
}
