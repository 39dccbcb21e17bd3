use finmon::context::{ChatKind, ContextBuilder};
use finmon::error::Result;

use super::open_store;

pub fn run(message: Option<&str>, kind: ChatKind, limit: Option<usize>) -> Result<()> {
    let (settings, store) = open_store()?;
    let builder = ContextBuilder::new(store.as_ref()).with_limit(limit.or(settings.context_limit));
    let json = match message {
        Some(message) => serde_json::to_string_pretty(&builder.chat_request(kind, message, Vec::new()))?,
        None => serde_json::to_string_pretty(&builder.build_context())?,
    };
    println!("{json}");
    Ok(())
}
