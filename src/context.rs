//! Learned-rule context for the remote chat assistant.
//!
//! The chat endpoint is told which corrections the user has taught so it can
//! acknowledge them. Only `{keyword, category}` pairs leave the device.

use serde::{Deserialize, Serialize};

use crate::store::RuleStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedRule {
    pub keyword: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ChatKind {
    /// The tutor persona.
    #[default]
    #[serde(rename = "chat_professor")]
    Professor,
    /// The creature persona.
    #[serde(rename = "chat_finmon")]
    Finmon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub parts: Vec<ChatPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPart {
    pub text: String,
}

impl ChatTurn {
    pub fn new(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![ChatPart {
                text: text.to_string(),
            }],
        }
    }
}

/// Outbound request body for the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(rename = "type")]
    pub kind: ChatKind,
    pub history: Vec<ChatTurn>,
    pub message: String,
    pub learned_rules: Vec<LearnedRule>,
}

pub struct ContextBuilder<'a> {
    store: &'a dyn RuleStore,
    limit: Option<usize>,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(store: &'a dyn RuleStore) -> Self {
        Self { store, limit: None }
    }

    /// Caps the context to the `limit` most recently taught rules.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Learned rules, oldest first.
    pub fn build_context(&self) -> Vec<LearnedRule> {
        let rules = self.store.load();
        let skip = match self.limit {
            Some(limit) => rules.len().saturating_sub(limit),
            None => 0,
        };
        if skip > 0 {
            tracing::debug!(total = rules.len(), skipped = skip, "capping learned rule context");
        }
        rules
            .into_iter()
            .skip(skip)
            .map(|r| LearnedRule {
                keyword: r.keyword,
                category: r.category,
            })
            .collect()
    }

    pub fn chat_request(&self, kind: ChatKind, message: &str, history: Vec<ChatTurn>) -> ChatRequest {
        ChatRequest {
            kind,
            history,
            message: message.to_string(),
            learned_rules: self.build_context(),
        }
    }
}
