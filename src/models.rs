use serde::{Deserialize, Serialize};

/// Categories offered by the correction picker. Rules may carry any other
/// non-empty category as well.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Food",
    "Housing",
    "Transport",
    "Entertainment",
    "Health",
    "Shopping",
    "Utilities",
    "Savings",
    "Investments",
    "Debt",
];

pub fn is_default_category(category: &str) -> bool {
    DEFAULT_CATEGORIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(category.trim()))
}

/// A learned `keyword -> category` mapping.
///
/// The serialized shape is the persisted record layout. `correctCategory`
/// and `userNote` are read as aliases so older exports still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: String,
    pub keyword: String,
    #[serde(alias = "correctCategory")]
    pub category: String,
    #[serde(default, alias = "userNote", deserialize_with = "null_as_empty")]
    pub note: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "timestamp", default)]
    pub created_at: i64,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Rule {
    pub fn new(keyword: String, category: String, note: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            keyword,
            category,
            note,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn matches(&self, lowered_description: &str) -> bool {
        lowered_description.contains(&self.keyword)
    }

    /// Creation date (UTC) for display.
    pub fn taught_on(&self) -> String {
        chrono::DateTime::<chrono::Utc>::from_timestamp_millis(self.created_at)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Lower-cases and trims a description into the form used for keywords.
pub fn normalize(description: &str) -> String {
    description.trim().to_lowercase()
}

/// All rules for the current user, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }

    pub fn find(&self, keyword: &str, category: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| r.keyword == keyword && r.category == category)
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl IntoIterator for RuleSet {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
