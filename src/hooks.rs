//! Caller-side glue for the expense form, the correction dialog and the
//! confirm/skip training round.

use std::collections::VecDeque;

use crate::predictor::{MatchPolicy, Predictor};
use crate::store::RuleStore;
use crate::teacher::{TeachOutcome, Teacher};

/// Descriptions must be longer than this before the form asks for a
/// prediction.
const PREFILL_MIN_CHARS: usize = 2;

/// An expense being typed into the form.
pub struct ExpenseDraft<'a> {
    predictor: Predictor<'a>,
    pub description: String,
    pub category: Option<String>,
}

impl<'a> ExpenseDraft<'a> {
    pub fn new(store: &'a dyn RuleStore, policy: MatchPolicy) -> Self {
        Self {
            predictor: Predictor::new(store).with_policy(policy),
            description: String::new(),
            category: None,
        }
    }

    /// Handles a change to the description field. A learned category
    /// replaces the current one; without a match the category is untouched.
    pub fn set_description(&mut self, description: &str) -> Option<String> {
        self.description = description.to_string();
        if self.description.chars().count() <= PREFILL_MIN_CHARS {
            return None;
        }
        let predicted = self.predictor.predict(&self.description)?;
        self.category = Some(predicted.clone());
        Some(predicted)
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = Some(category.to_string());
    }
}

/// The "teach me the right category" dialog for one transaction.
pub struct CorrectionForm<'a> {
    teacher: Teacher<'a>,
    pub transaction_name: String,
    pub current_category: String,
    last_outcome: Option<TeachOutcome>,
}

impl<'a> CorrectionForm<'a> {
    pub fn new(store: &'a dyn RuleStore, transaction_name: &str, current_category: &str) -> Self {
        Self {
            teacher: Teacher::new(store),
            transaction_name: transaction_name.to_string(),
            current_category: current_category.to_string(),
            last_outcome: None,
        }
    }

    /// Teaches the correction and returns the category to apply to the
    /// transaction. `None` when no category was picked.
    pub fn submit(&mut self, new_category: &str, reason: &str) -> Option<String> {
        let new_category = new_category.trim();
        if new_category.is_empty() {
            return None;
        }
        let outcome = self.teacher.teach(&self.transaction_name, new_category, reason);
        self.last_outcome = Some(outcome);
        Some(new_category.to_string())
    }

    /// Whether `new_category` differs from what the transaction had before.
    /// A blank current category counts as no change.
    pub fn changes_category(&self, new_category: &str) -> bool {
        let current = self.current_category.trim();
        !current.is_empty() && current != new_category.trim()
    }

    /// What the last submit did to the rule store.
    pub fn last_outcome(&self) -> Option<&TeachOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn into_outcome(self) -> Option<TeachOutcome> {
        self.last_outcome
    }
}

/// Note attached to rules the user confirmed in a training round.
pub const TRAINING_NOTE: &str = "Confirmed by user in training";

/// A transaction whose category the app guessed and wants confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    pub name: String,
    pub probable: String,
}

impl Guess {
    pub fn new(name: &str, probable: &str) -> Self {
        Self {
            name: name.to_string(),
            probable: probable.to_string(),
        }
    }
}

/// A round of yes/no questions over guessed categories. Confirming teaches
/// the guess; skipping drops it and breaks the combo.
pub struct TrainingQueue<'a> {
    teacher: Teacher<'a>,
    pending: VecDeque<Guess>,
    combo: u32,
    level: u32,
}

impl<'a> TrainingQueue<'a> {
    pub fn new(store: &'a dyn RuleStore, guesses: impl IntoIterator<Item = Guess>) -> Self {
        Self {
            teacher: Teacher::new(store),
            pending: guesses.into_iter().collect(),
            combo: 0,
            level: 1,
        }
    }

    pub fn current(&self) -> Option<&Guess> {
        self.pending.front()
    }

    /// Teaches the current guess and moves on. `None` once the queue is empty.
    pub fn confirm(&mut self) -> Option<TeachOutcome> {
        let guess = self.pending.pop_front()?;
        let outcome = self.teacher.teach(&guess.name, &guess.probable, TRAINING_NOTE);
        if matches!(outcome, TeachOutcome::Failed(_)) {
            self.combo = 0;
        } else {
            self.combo += 1;
        }
        self.level += 1;
        Some(outcome)
    }

    /// Drops the current guess without teaching it.
    pub fn skip(&mut self) -> Option<Guess> {
        let guess = self.pending.pop_front()?;
        self.combo = 0;
        self.level += 1;
        Some(guess)
    }

    /// Confirmations in a row since the last skip.
    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Starts at 1 and goes up with every answered guess.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_prefill_from_learned_rule() {
        let store = MemoryStore::new();
        Teacher::new(&store).teach("starbucks", "Food", "");
        let mut draft = ExpenseDraft::new(&store, MatchPolicy::FirstTaught);
        draft.set_category("Shopping");
        assert_eq!(draft.set_description("SQ *STARBUCKS").as_deref(), Some("Food"));
        assert_eq!(draft.category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_no_match_keeps_current_category() {
        let store = MemoryStore::new();
        Teacher::new(&store).teach("starbucks", "Food", "");
        let mut draft = ExpenseDraft::new(&store, MatchPolicy::FirstTaught);
        draft.set_category("Shopping");
        assert_eq!(draft.set_description("Target"), None);
        assert_eq!(draft.category.as_deref(), Some("Shopping"));
        assert_eq!(draft.description, "Target");
    }

    #[test]
    fn test_short_description_skips_prediction() {
        let store = MemoryStore::new();
        Teacher::new(&store).teach("ab", "Food", "");
        let mut draft = ExpenseDraft::new(&store, MatchPolicy::FirstTaught);
        assert_eq!(draft.set_description("ab"), None);
        assert_eq!(draft.category, None);
    }

    #[test]
    fn test_keystrokes_prefill_once_keyword_is_typed() {
        let store = MemoryStore::new();
        Teacher::new(&store).teach("uber", "Transport", "");
        let mut draft = ExpenseDraft::new(&store, MatchPolicy::FirstTaught);
        let typed = "UBER TRIP";
        let mut first_hit = None;
        for end in 1..=typed.len() {
            if draft.set_description(&typed[..end]).is_some() && first_hit.is_none() {
                first_hit = Some(end);
            }
        }
        assert_eq!(first_hit, Some(4));
        assert_eq!(draft.category.as_deref(), Some("Transport"));
    }

    #[test]
    fn test_correction_teaches_rule() {
        let store = MemoryStore::new();
        let mut form = CorrectionForm::new(&store, "AMZN MKTP US", "Food");
        assert_eq!(form.submit("Shopping", "gifts").as_deref(), Some("Shopping"));
        assert!(matches!(form.last_outcome(), Some(TeachOutcome::Learned(_))));

        let predictor = Predictor::new(&store);
        assert_eq!(predictor.predict("amzn mktp us*2k3").as_deref(), Some("Shopping"));
    }

    #[test]
    fn test_correction_reports_category_change() {
        let store = MemoryStore::new();
        let form = CorrectionForm::new(&store, "UBER TRIP", "Transport");
        assert!(form.changes_category("Food"));
        assert!(!form.changes_category(" Transport "));

        let blank = CorrectionForm::new(&store, "UBER TRIP", "");
        assert!(!blank.changes_category("Food"));
    }

    fn guesses() -> Vec<Guess> {
        vec![
            Guess::new("AMZN MKTP US", "Shopping"),
            Guess::new("SQ *COFFEE ROAST", "Food"),
            Guess::new("UBER TRIP", "Transport"),
        ]
    }

    #[test]
    fn test_training_confirm_teaches_with_note() {
        let store = MemoryStore::new();
        let mut queue = TrainingQueue::new(&store, guesses());
        assert_eq!(queue.current().map(|g| g.name.as_str()), Some("AMZN MKTP US"));

        let outcome = queue.confirm().unwrap();
        let rule = outcome.into_rule().unwrap();
        assert_eq!(rule.keyword, "amzn mktp us");
        assert_eq!(rule.category, "Shopping");
        assert_eq!(rule.note, TRAINING_NOTE);
        assert_eq!(queue.combo(), 1);
        assert_eq!(queue.level(), 2);
        assert_eq!(queue.remaining(), 2);

        let predictor = Predictor::new(&store);
        assert_eq!(predictor.predict("AMZN MKTP US*1A2").as_deref(), Some("Shopping"));
    }

    #[test]
    fn test_training_skip_breaks_combo_and_teaches_nothing() {
        let store = MemoryStore::new();
        let mut queue = TrainingQueue::new(&store, guesses());
        queue.confirm();
        queue.confirm();
        assert_eq!(queue.combo(), 2);

        let skipped = queue.skip().unwrap();
        assert_eq!(skipped.name, "UBER TRIP");
        assert_eq!(queue.combo(), 0);
        assert_eq!(queue.level(), 4);
        assert!(queue.is_done());
        assert_eq!(Predictor::new(&store).predict("UBER TRIP"), None);
    }

    #[test]
    fn test_training_empty_queue_is_done() {
        let store = MemoryStore::new();
        let mut queue = TrainingQueue::new(&store, Vec::new());
        assert!(queue.is_done());
        assert!(queue.current().is_none());
        assert!(queue.confirm().is_none());
        assert!(queue.skip().is_none());
        assert_eq!(queue.level(), 1);
        assert_eq!(store.payload(), None);
    }

    #[test]
    fn test_correction_without_category_does_nothing() {
        let store = MemoryStore::new();
        let mut form = CorrectionForm::new(&store, "AMZN MKTP US", "Food");
        assert_eq!(form.submit("  ", "why"), None);
        assert!(form.last_outcome().is_none());
        assert_eq!(store.payload(), None);
    }
}
