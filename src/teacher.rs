use crate::error::FinmonError;
use crate::models::{normalize, Rule, RuleSet};
use crate::store::RuleStore;

/// Why a teach request was dropped without touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyDescription,
    EmptyCategory,
}

#[derive(Debug)]
pub enum TeachOutcome {
    /// A new rule was appended and persisted.
    Learned(Rule),
    /// The same keyword/category pair was already known; nothing written.
    AlreadyKnown(Rule),
    Ignored(IgnoreReason),
    /// The rule could not be persisted and will not affect predictions.
    Failed(FinmonError),
}

impl TeachOutcome {
    /// The rule now in effect, if any.
    pub fn into_rule(self) -> Option<Rule> {
        match self {
            TeachOutcome::Learned(rule) | TeachOutcome::AlreadyKnown(rule) => Some(rule),
            TeachOutcome::Ignored(_) | TeachOutcome::Failed(_) => None,
        }
    }

    pub fn rule(&self) -> Option<&Rule> {
        match self {
            TeachOutcome::Learned(rule) | TeachOutcome::AlreadyKnown(rule) => Some(rule),
            TeachOutcome::Ignored(_) | TeachOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub learned: usize,
    pub already_known: usize,
    pub ignored: usize,
}

enum Validated {
    Rule { keyword: String, category: String },
    Ignored(IgnoreReason),
}

fn validate(description: &str, category: &str) -> Validated {
    let keyword = normalize(description);
    if keyword.is_empty() {
        return Validated::Ignored(IgnoreReason::EmptyDescription);
    }
    let category = category.trim();
    if category.is_empty() {
        return Validated::Ignored(IgnoreReason::EmptyCategory);
    }
    Validated::Rule {
        keyword,
        category: category.to_string(),
    }
}

/// Turns user corrections into persisted rules.
pub struct Teacher<'a> {
    store: &'a dyn RuleStore,
}

impl<'a> Teacher<'a> {
    pub fn new(store: &'a dyn RuleStore) -> Self {
        Self { store }
    }

    pub fn teach(&self, description: &str, category: &str, note: &str) -> TeachOutcome {
        let (keyword, category) = match validate(description, category) {
            Validated::Rule { keyword, category } => (keyword, category),
            Validated::Ignored(reason) => {
                tracing::debug!(?reason, "nothing to teach");
                return TeachOutcome::Ignored(reason);
            }
        };

        let mut outcome = None;
        let result = self.store.update(&mut |rules: &mut RuleSet| {
            if let Some(existing) = rules.find(&keyword, &category) {
                outcome = Some(TeachOutcome::AlreadyKnown(existing.clone()));
                return false;
            }
            let rule = Rule::new(keyword.clone(), category.clone(), note.trim().to_string());
            rules.push(rule.clone());
            outcome = Some(TeachOutcome::Learned(rule));
            true
        });

        match (result, outcome) {
            (Err(e), _) => {
                tracing::warn!(%keyword, %category, error = %e, "failed to persist learned rule");
                TeachOutcome::Failed(e)
            }
            (Ok(_), Some(outcome)) => {
                if let TeachOutcome::Learned(rule) = &outcome {
                    tracing::info!(keyword = %rule.keyword, category = %rule.category, "learned rule");
                }
                outcome
            }
            (Ok(_), None) => TeachOutcome::Failed(FinmonError::Other(
                "rule store did not apply the update".to_string(),
            )),
        }
    }

    /// Teaches a batch of rules (for example an export) in one store write.
    /// Incoming ids and timestamps are kept for rules that are new.
    pub fn teach_all(&self, incoming: &[Rule]) -> crate::error::Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        self.store.update(&mut |rules: &mut RuleSet| {
            summary = ImportSummary::default();
            for rule in incoming {
                match validate(&rule.keyword, &rule.category) {
                    Validated::Ignored(_) => summary.ignored += 1,
                    Validated::Rule { keyword, category } => {
                        if rules.find(&keyword, &category).is_some() {
                            summary.already_known += 1;
                            continue;
                        }
                        let mut learned = Rule::new(keyword, category, rule.note.trim().to_string());
                        if !rule.id.is_empty() && rules.iter().all(|r| r.id != rule.id) {
                            learned.id = rule.id.clone();
                        }
                        if rule.created_at > 0 {
                            learned.created_at = rule.created_at;
                        }
                        rules.push(learned);
                        summary.learned += 1;
                    }
                }
            }
            summary.learned > 0
        })?;
        tracing::info!(learned = summary.learned, already_known = summary.already_known, "imported rules");
        Ok(summary)
    }

    /// Wipes every learned rule.
    pub fn reset(&self) -> crate::error::Result<()> {
        self.store.clear()?;
        tracing::info!("learned rules wiped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::predictor::Predictor;
    use crate::store::{JsonFileStore, MemoryStore, SqliteStore};

    struct ReadOnlyStore(MemoryStore);

    impl RuleStore for ReadOnlyStore {
        fn load(&self) -> RuleSet {
            self.0.load()
        }

        fn save(&self, _rules: &RuleSet) -> Result<()> {
            Err(FinmonError::Other("quota exceeded".to_string()))
        }

        fn clear(&self) -> Result<()> {
            Err(FinmonError::Other("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_teach_is_idempotent() {
        let store = MemoryStore::new();
        let teacher = Teacher::new(&store);
        let first = teacher.teach("Starbucks", "Food", "");
        let first = match first {
            TeachOutcome::Learned(rule) => rule,
            other => panic!("expected Learned, got {other:?}"),
        };
        let second = teacher.teach("Starbucks", "Food", "different note");
        match second {
            TeachOutcome::AlreadyKnown(rule) => assert_eq!(rule, first),
            other => panic!("expected AlreadyKnown, got {other:?}"),
        }
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_redundant_teach_does_not_write() {
        let store = MemoryStore::new();
        let teacher = Teacher::new(&store);
        teacher.teach("Starbucks", "Food", "");
        let before = store.payload();
        teacher.teach("STARBUCKS", "Food", "");
        assert_eq!(store.payload(), before);
    }

    #[test]
    fn test_same_keyword_different_category_is_kept() {
        let store = MemoryStore::new();
        let teacher = Teacher::new(&store);
        teacher.teach("uber", "Transport", "");
        teacher.teach("uber", "Food", "");
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn test_keyword_is_normalized() {
        let store = MemoryStore::new();
        let rule = Teacher::new(&store)
            .teach("  AMZN Mktp  ", " Shopping ", " gifts ")
            .into_rule()
            .unwrap();
        assert_eq!(rule.keyword, "amzn mktp");
        assert_eq!(rule.category, "Shopping");
        assert_eq!(rule.note, "gifts");
    }

    #[test]
    fn test_empty_inputs_are_ignored() {
        let store = MemoryStore::new();
        let teacher = Teacher::new(&store);
        assert!(matches!(
            teacher.teach("   ", "Food", ""),
            TeachOutcome::Ignored(IgnoreReason::EmptyDescription)
        ));
        assert!(matches!(
            teacher.teach("Starbucks", "", ""),
            TeachOutcome::Ignored(IgnoreReason::EmptyCategory)
        ));
        assert!(teacher.teach("", "", "").into_rule().is_none());
        assert_eq!(store.payload(), None);
    }

    #[test]
    fn test_rules_keep_insertion_order() {
        let store = MemoryStore::new();
        let teacher = Teacher::new(&store);
        for (d, c) in [("zeta", "Food"), ("alpha", "Health"), ("mid", "Debt")] {
            teacher.teach(d, c, "");
        }
        let keywords: Vec<_> = store.load().iter().map(|r| r.keyword.clone()).collect();
        assert_eq!(keywords, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_failed_save_reports_failure_and_loses_rule() {
        let store = ReadOnlyStore(MemoryStore::new());
        let teacher = Teacher::new(&store);
        let outcome = teacher.teach("starbucks", "Food", "");
        assert!(matches!(outcome, TeachOutcome::Failed(_)));
        assert!(outcome.rule().is_none());
        assert_eq!(Predictor::new(&store).predict("starbucks reserve"), None);
    }

    #[test]
    fn test_already_known_needs_no_write_even_on_read_only_store() {
        let seeded = MemoryStore::new();
        Teacher::new(&seeded).teach("starbucks", "Food", "");
        let store = ReadOnlyStore(seeded);
        let outcome = Teacher::new(&store).teach("Starbucks", "Food", "");
        assert!(matches!(outcome, TeachOutcome::AlreadyKnown(_)));
    }

    #[test]
    fn test_clear_wipes_state() {
        let store = MemoryStore::new();
        let teacher = Teacher::new(&store);
        teacher.teach("starbucks", "Food", "");
        teacher.teach("uber trip", "Transport", "");
        teacher.reset().unwrap();
        assert!(store.load().is_empty());
        let predictor = Predictor::new(&store);
        assert_eq!(predictor.predict("starbucks"), None);
        assert_eq!(predictor.predict("UBER TRIP 123"), None);
    }

    #[test]
    fn test_roundtrip_persistence_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finmon.db");
        let store = SqliteStore::open(&path).unwrap();
        let taught = Teacher::new(&store)
            .teach("CVS Pharmacy", "Health", "prescriptions")
            .into_rule()
            .unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        let rules = reopened.load();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.as_slice()[0], taught);
    }

    #[test]
    fn test_roundtrip_persistence_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let taught = Teacher::new(&JsonFileStore::new(path.clone()))
            .teach("APL* ITUNES", "Entertainment", "")
            .into_rule()
            .unwrap();
        let rules = JsonFileStore::new(path).load();
        assert_eq!(rules.as_slice(), &[taught]);
    }

    #[test]
    fn test_teach_all_merges_and_dedupes() {
        let store = MemoryStore::new();
        let teacher = Teacher::new(&store);
        teacher.teach("starbucks", "Food", "");

        let mut incoming = vec![
            Rule::new("STARBUCKS".into(), "Food".into(), String::new()),
            Rule::new("uber trip".into(), "Transport".into(), "rides".into()),
            Rule::new("   ".into(), "Food".into(), String::new()),
        ];
        incoming[1].created_at = 42;
        let summary = teacher.teach_all(&incoming).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                learned: 1,
                already_known: 1,
                ignored: 1
            }
        );
        let rules = store.load();
        assert_eq!(rules.len(), 2);
        let imported = &rules.as_slice()[1];
        assert_eq!(imported.id, incoming[1].id);
        assert_eq!(imported.created_at, 42);
        assert_eq!(imported.note, "rides");
    }

    #[test]
    fn test_teach_all_dedupes_within_batch() {
        let store = MemoryStore::new();
        let incoming = vec![
            Rule::new("cvs".into(), "Health".into(), String::new()),
            Rule::new("CVS".into(), "Health".into(), String::new()),
        ];
        let summary = Teacher::new(&store).teach_all(&incoming).unwrap();
        assert_eq!(summary.learned, 1);
        assert_eq!(summary.already_known, 1);
    }
}
