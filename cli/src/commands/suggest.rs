use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitsphere_core::foods::suggest;

pub(crate) fn cmd_suggest(query: &str, json: bool) -> Result<()> {
    let suggestions = suggest(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }
    if suggestions.is_empty() {
        eprintln!("No foods match '{query}'");
        return Ok(());
    }

    #[derive(Tabled)]
    struct SuggestionRow {
        #[tabled(rename = "Key")]
        key: &'static str,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "kcal/100g")]
        kcal: String,
    }

    let rows: Vec<SuggestionRow> = suggestions
        .into_iter()
        .map(|s| SuggestionRow {
            key: s.key,
            name: s.display_name,
            kcal: format!("{:.0}", s.kcal_per_100g),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}
