//! Category learning for FinMon.
//!
//! Users teach a category for a transaction description; later descriptions
//! containing that keyword get the taught category, and the full rule list is
//! shared with the chat assistant as context.

pub mod context;
pub mod db;
pub mod error;
pub mod hooks;
pub mod models;
pub mod predictor;
pub mod settings;
pub mod store;
pub mod teacher;

pub use context::{ChatKind, ChatRequest, ContextBuilder, LearnedRule};
pub use error::{FinmonError, Result};
pub use models::{Rule, RuleSet};
pub use predictor::{MatchPolicy, Predictor};
pub use store::{JsonFileStore, MemoryStore, RuleStore, SqliteStore};
pub use teacher::{Teacher, TeachOutcome};
