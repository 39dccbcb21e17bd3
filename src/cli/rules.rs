use comfy_table::{Cell, Table};

use finmon::error::Result;
use finmon::models::Rule;
use finmon::teacher::Teacher;

use super::open_store;

pub fn list() -> Result<()> {
    let (_, store) = open_store()?;
    let rules = store.load();
    if rules.is_empty() {
        println!("No learned rules yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Keyword", "Category", "Note", "Taught"]);
    for rule in &rules {
        table.add_row(vec![
            Cell::new(rule.id.chars().take(8).collect::<String>()),
            Cell::new(&rule.keyword),
            Cell::new(&rule.category),
            Cell::new(&rule.note),
            Cell::new(rule.taught_on()),
        ]);
    }
    println!("Learned rules\n{table}");
    Ok(())
}

pub fn export(output: Option<&str>) -> Result<()> {
    let (_, store) = open_store()?;
    let rules = store.load();
    let json = serde_json::to_string_pretty(&rules)?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))?;
            println!("Exported {} rules to {path}", rules.len());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn import(file: &str) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let incoming: Vec<Rule> = serde_json::from_str(&content)?;
    let (_, store) = open_store()?;
    let summary = Teacher::new(store.as_ref()).teach_all(&incoming)?;
    println!(
        "Imported {} rules ({} already known, {} skipped)",
        summary.learned, summary.already_known, summary.ignored
    );
    Ok(())
}
