use colored::Colorize;

use finmon::error::Result;
use finmon::hooks::CorrectionForm;
use finmon::models::{is_default_category, DEFAULT_CATEGORIES};
use finmon::predictor::Predictor;
use finmon::teacher::{IgnoreReason, TeachOutcome};

use super::open_store;

pub fn run(description: &str, category: &str, note: &str) -> Result<()> {
    let (settings, store) = open_store()?;
    let current = Predictor::new(store.as_ref())
        .with_policy(settings.match_policy)
        .predict(description)
        .unwrap_or_default();
    let mut form = CorrectionForm::new(store.as_ref(), description, &current);
    if form.submit(category, note).is_none() {
        println!("Nothing to teach: category is empty");
        return Ok(());
    }

    let changed = form.changes_category(category);
    match form.into_outcome() {
        Some(TeachOutcome::Learned(rule)) => {
            let was = if changed {
                format!(" (was {current})")
            } else {
                String::new()
            };
            println!(
                "{} '{}' \u{2192} {}{}",
                "Learned rule:".green(),
                rule.keyword,
                rule.category,
                was
            );
            if !is_default_category(&rule.category) {
                println!(
                    "{}",
                    format!(
                        "Note: '{}' is not a standard category ({})",
                        rule.category,
                        DEFAULT_CATEGORIES.join(", ")
                    )
                    .yellow()
                );
            }
        }
        Some(TeachOutcome::AlreadyKnown(rule)) => {
            println!("Already known: '{}' \u{2192} {}", rule.keyword, rule.category);
        }
        Some(TeachOutcome::Ignored(IgnoreReason::EmptyDescription)) => {
            println!("Nothing to teach: description is empty");
        }
        Some(TeachOutcome::Ignored(IgnoreReason::EmptyCategory)) | None => {
            println!("Nothing to teach: category is empty");
        }
        Some(TeachOutcome::Failed(e)) => return Err(e),
    }
    Ok(())
}
