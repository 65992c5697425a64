use anyhow::{Context, Result, bail};
use chrono::Local;
use std::path::Path;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitsphere_core::models::{Category, CategoryReport};

use super::Service;
use super::helpers::{no_neg_zero, parse_category};

pub(crate) fn cmd_report(
    svc: &Service,
    category: Option<&str>,
    svg: Option<&Path>,
    json: bool,
) -> Result<()> {
    let today = Local::now().date_naive();

    let Some(category) = category else {
        if svg.is_some() {
            bail!("--svg needs a category, e.g. `fitsphere report water --svg water.svg`");
        }
        let reports: Vec<CategoryReport> = Category::ALL
            .into_iter()
            .map(|c| svc.report(c, today))
            .collect();
        if json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            print_overview(&reports);
        }
        return Ok(());
    };

    let category = parse_category(category)?;
    let report = svc.report(category, today);

    if let Some(path) = svg {
        let chart = svc.chart(category, today);
        std::fs::write(path, chart.to_svg())
            .with_context(|| format!("Failed to write chart: {}", path.display()))?;
        if !json {
            eprintln!("Chart written to {}", path.display());
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_category(category, &report);
    }
    Ok(())
}

fn print_overview(reports: &[CategoryReport]) {
    #[derive(Tabled)]
    struct OverviewRow {
        #[tabled(rename = "Category")]
        label: String,
        #[tabled(rename = "Today")]
        today: String,
        #[tabled(rename = "Goal")]
        goal: String,
        #[tabled(rename = "Remaining")]
        remaining: String,
        #[tabled(rename = "Unit")]
        unit: String,
    }

    let rows: Vec<OverviewRow> = reports
        .iter()
        .map(|r| {
            let c = r.category;
            OverviewRow {
                label: r.label.to_string(),
                today: c.format_value(no_neg_zero(r.progress.completed)),
                goal: c.format_value(r.progress.goal),
                remaining: c.format_value(no_neg_zero(r.progress.remaining)),
                unit: r.unit.to_string(),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

fn print_category(category: Category, report: &CategoryReport) {
    #[derive(Tabled)]
    struct DayRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let unit = report.unit;
    let p = &report.progress;
    println!("=== {} ({unit}) ===\n", report.label);
    println!("  Completed: {} {unit}", category.format_value(no_neg_zero(p.completed)));
    println!("  Goal:      {} {unit}", category.format_value(p.goal));
    println!("  Remaining: {} {unit}\n", category.format_value(no_neg_zero(p.remaining)));

    let rows: Vec<DayRow> = report
        .series
        .iter()
        .map(|d| DayRow {
            day: d.label.clone(),
            date: d.date.format("%Y-%m-%d").to_string(),
            value: category.format_value(no_neg_zero(d.value)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}
