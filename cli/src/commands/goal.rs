use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitsphere_core::models::Category;

use super::Service;
use super::helpers::{json_error, parse_category};

pub(crate) fn cmd_goal_show(svc: &Service, category: Option<&str>, json: bool) -> Result<()> {
    let goals: Vec<(Category, f64)> = match category {
        Some(c) => {
            let c = parse_category(c)?;
            vec![(c, svc.goal(c))]
        }
        None => svc.goals(),
    };

    if json {
        let map: serde_json::Map<String, serde_json::Value> = goals
            .iter()
            .map(|(c, g)| (c.key().to_string(), serde_json::json!(g)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct GoalRow {
        #[tabled(rename = "Category")]
        label: &'static str,
        #[tabled(rename = "Goal")]
        goal: String,
        #[tabled(rename = "Unit")]
        unit: &'static str,
        #[tabled(rename = "Default")]
        default: String,
    }

    let rows: Vec<GoalRow> = goals
        .iter()
        .map(|(c, g)| GoalRow {
            label: c.info().label,
            goal: c.format_value(*g),
            unit: c.info().unit,
            default: c.format_value(c.default_goal()),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_goal_set(svc: &mut Service, category: &str, value: f64, json: bool) -> Result<()> {
    let category = parse_category(category)?;

    if !svc.set_goal(category, value)? {
        let msg = format!(
            "Goal must be a positive number; keeping {} {}",
            category.format_value(svc.goal(category)),
            category.info().unit
        );
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "category": category, "goal": value }));
    } else {
        println!(
            "{} goal set to {} {}",
            category.info().label,
            category.format_value(value),
            category.info().unit
        );
    }
    Ok(())
}
