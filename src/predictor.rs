use serde::{Deserialize, Serialize};

use crate::models::Rule;
use crate::store::RuleStore;

/// Descriptions shorter than this (after trimming) never match.
pub const MIN_DESCRIPTION_LEN: usize = 3;

/// How to pick between several rules whose keywords all match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Oldest matching rule wins.
    #[default]
    FirstTaught,
    /// Most specific keyword wins; equal lengths fall back to the oldest.
    LongestKeyword,
    /// Newest matching rule wins.
    MostRecent,
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchPolicy::FirstTaught => write!(f, "first_taught"),
            MatchPolicy::LongestKeyword => write!(f, "longest_keyword"),
            MatchPolicy::MostRecent => write!(f, "most_recent"),
        }
    }
}

fn select<'r>(rules: &'r [Rule], description: &str, policy: MatchPolicy) -> Option<&'r Rule> {
    if description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return None;
    }
    let lowered = description.to_lowercase();
    let mut candidates = rules.iter().filter(|r| r.matches(&lowered));
    match policy {
        MatchPolicy::FirstTaught => candidates.next(),
        MatchPolicy::MostRecent => candidates.last(),
        MatchPolicy::LongestKeyword => candidates.fold(None, |best: Option<&Rule>, rule| match best {
            Some(b) if b.keyword.chars().count() >= rule.keyword.chars().count() => Some(b),
            _ => Some(rule),
        }),
    }
}

/// Looks up the category a user previously taught for a description.
pub struct Predictor<'a> {
    store: &'a dyn RuleStore,
    policy: MatchPolicy,
}

impl<'a> Predictor<'a> {
    pub fn new(store: &'a dyn RuleStore) -> Self {
        Self {
            store,
            policy: MatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The rule that applies to `description`, if any.
    pub fn recall(&self, description: &str) -> Option<Rule> {
        let rules = self.store.load();
        let hit = select(rules.as_slice(), description, self.policy).cloned();
        match &hit {
            Some(rule) => tracing::debug!(keyword = %rule.keyword, category = %rule.category, "learned rule matched"),
            None => tracing::debug!("no learned rule matched"),
        }
        hit
    }

    pub fn predict(&self, description: &str) -> Option<String> {
        self.recall(description).map(|rule| rule.category)
    }
}
