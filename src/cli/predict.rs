use finmon::error::Result;
use finmon::hooks::ExpenseDraft;
use finmon::predictor::{MatchPolicy, Predictor};

use super::open_store;

pub fn run(description: &str, explain: bool, policy: Option<MatchPolicy>) -> Result<()> {
    let (settings, store) = open_store()?;
    let policy = policy.unwrap_or(settings.match_policy);
    let mut draft = ExpenseDraft::new(store.as_ref(), policy);

    match draft.set_description(description) {
        Some(category) => println!("{category}"),
        None => {
            println!("No match");
            return Ok(());
        }
    }

    if explain {
        if let Some(rule) = Predictor::new(store.as_ref()).with_policy(policy).recall(description) {
            println!("Matched:  '{}' ({policy})", rule.keyword);
            println!("Rule ID:  {}", rule.id);
            println!("Taught:   {}", rule.taught_on());
            if !rule.note.is_empty() {
                println!("Note:     {}", rule.note);
            }
        }
    }
    Ok(())
}
