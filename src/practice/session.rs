use chrono::{DateTime, Local};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use super::run::{repeated_mistakes, Mistake, Run};
use crate::kana::{characters_in_category, Character};

/// Scratch state for the question currently being asked
#[derive(Debug, Clone)]
pub struct Question {
    pub character: Character,
    pub started_at: Instant,
    pub attempts: u32,
    pub input: String,
}

impl Question {
    fn new(character: Character) -> Self {
        Self {
            character,
            started_at: Instant::now(),
            attempts: 0,
            input: String::new(),
        }
    }
}

/// One practice session: picks questions, checks answers and keeps score.
///
/// The driver owns the loop. A question goes through
/// `select_next_character` (or `ask`), any number of `record_mistake`
/// calls and exactly one `complete_question`. The session does not stop
/// the driver from completing more than `count` questions, nor from
/// completing the same question twice.
#[derive(Debug)]
pub struct PracticeSession {
    count: usize,
    categories: Vec<String>,
    runs: Vec<Run>,
    started_at: DateTime<Local>,
    current: Option<Question>,
    rng: StdRng,
}

impl PracticeSession {
    pub fn new(count: usize, categories: Vec<String>) -> Self {
        Self::with_rng(count, categories, StdRng::from_entropy())
    }

    /// Session with a reproducible question sequence
    pub fn with_seed(count: usize, categories: Vec<String>, seed: u64) -> Self {
        Self::with_rng(count, categories, StdRng::seed_from_u64(seed))
    }

    fn with_rng(count: usize, categories: Vec<String>, rng: StdRng) -> Self {
        debug!("new practice session: {count} questions from {categories:?}");
        Self {
            count,
            categories,
            runs: Vec::new(),
            started_at: Local::now(),
            current: None,
            rng,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn current_run(&self) -> Option<&Run> {
        self.runs.last()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    /// Questions completed in the current run
    pub fn answered(&self) -> usize {
        self.current_run().map_or(0, |run| run.total)
    }

    pub fn is_finished(&self) -> bool {
        self.answered() >= self.count
    }

    /// Draws a character from the enabled categories and asks it.
    ///
    /// Repeats are allowed. Returns `None`, leaving the session idle, when
    /// no enabled category has any characters.
    pub fn select_next_character(&mut self) -> Option<Character> {
        let pool: Vec<&Character> = self
            .categories
            .iter()
            .flat_map(|category| characters_in_category(category))
            .collect();

        if pool.is_empty() {
            debug!("no candidates for categories {:?}", self.categories);
            self.current = None;
            return None;
        }

        let character = pool[self.rng.gen_range(0..pool.len())].clone();
        self.ask(character.clone());
        Some(character)
    }

    /// Starts a question for a specific character, resetting the timer
    pub fn ask(&mut self, character: Character) {
        trace!("asking {} ({})", character.hiragana, character.romaji);
        self.current = Some(Question::new(character));
    }

    /// Exact match against the current romaji; false when no question is asked
    pub fn evaluate_answer(&self, input: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|q| q.character.romaji == input)
    }

    pub fn record_mistake(&mut self, input: &str) {
        if let Some(question) = self.current.as_mut() {
            question.attempts += 1;
            question.input = input.to_string();
        }
    }

    /// Folds the current question into the current run.
    ///
    /// The first call creates the run. The question stays in place until
    /// the next one is asked, so calling this twice counts it twice.
    pub fn complete_question(&mut self, correct: bool) {
        let Some(question) = self.current.as_ref() else {
            debug!("complete_question called with no question asked");
            return;
        };

        let mistake = Mistake {
            character: question.character.clone(),
            input: question.input.clone(),
            attempts: question.attempts,
            correct,
            time_spent: question.started_at.elapsed(),
        };

        if self.runs.is_empty() {
            self.runs.push(Run::new(self.categories.clone()));
        }
        let Some(run) = self.runs.last_mut() else {
            return;
        };

        run.total += 1;
        if correct {
            run.correct += 1;
        } else {
            run.incorrect += 1;
            run.mistakes.push(mistake);
        }
        trace!(
            "completed {} correct={correct} ({}/{})",
            question.character.romaji,
            run.total,
            self.count
        );
    }

    /// Opens a fresh run; later completions count towards it.
    /// Earlier runs still feed `weaknesses`.
    pub fn start_new_run(&mut self) {
        self.runs.push(Run::new(self.categories.clone()));
        self.current = None;
    }

    /// Accuracy of the current run as a percentage
    pub fn accuracy(&self) -> f64 {
        self.current_run().map_or(0.0, Run::accuracy)
    }

    /// Mistakes on romaji that were missed at least twice across all runs
    pub fn weaknesses(&self, limit: usize) -> Vec<Mistake> {
        repeated_mistakes(&self.runs, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kana::{lookup, Category, Representation};
    use std::thread;
    use std::time::Duration;

    fn basic_session(count: usize) -> PracticeSession {
        PracticeSession::with_seed(count, vec!["basic".to_string()], 7)
    }

    fn ka() -> Character {
        lookup(Representation::Romaji, "ka").unwrap().clone()
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = basic_session(5);

        assert_eq!(session.count(), 5);
        assert_eq!(session.categories(), ["basic".to_string()]);
        assert!(session.runs().is_empty());
        assert!(session.current_question().is_none());
        assert_eq!(session.answered(), 0);
        assert!(!session.is_finished());
        assert_eq!(session.accuracy(), 0.0);
    }

    #[test]
    fn test_zero_count_session_is_finished() {
        let session = basic_session(0);
        assert!(session.is_finished());
    }

    #[test]
    fn test_select_draws_from_enabled_categories() {
        let mut session = PracticeSession::with_seed(
            50,
            vec!["half-voiced".to_string(), "unknown".to_string()],
            1,
        );

        for _ in 0..50 {
            let c = session.select_next_character().unwrap();
            assert_eq!(c.category, Category::HalfVoiced);
            assert_eq!(session.current_question().unwrap().character, c);
        }
    }

    #[test]
    fn test_select_draws_from_union_of_categories() {
        let mut session = PracticeSession::with_seed(
            200,
            vec!["basic".to_string(), "half-voiced".to_string()],
            17,
        );

        let drawn: Vec<Category> = (0..200)
            .map(|_| session.select_next_character().unwrap().category)
            .collect();
        // 5 of the 51 candidates are half-voiced
        let half_voiced = drawn.iter().filter(|c| **c == Category::HalfVoiced).count();
        assert!(half_voiced > 0);
        assert!(drawn.contains(&Category::Basic));
        assert!(drawn
            .iter()
            .all(|c| matches!(c, Category::Basic | Category::HalfVoiced)));
        assert!(half_voiced < 60, "half-voiced drawn {half_voiced}/200");
    }

    #[test]
    fn test_select_covers_every_character_in_pool() {
        let mut session = PracticeSession::with_seed(200, vec!["half-voiced".to_string()], 3);

        let seen: std::collections::HashSet<String> = (0..200)
            .map(|_| session.select_next_character().unwrap().romaji)
            .collect();
        let expected: std::collections::HashSet<String> = ["pa", "pi", "pu", "pe", "po"]
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_select_with_no_candidates() {
        let mut session = PracticeSession::with_seed(3, vec!["dakuon".to_string()], 1);
        assert!(session.select_next_character().is_none());
        assert!(session.current_question().is_none());

        let mut empty = PracticeSession::with_seed(3, vec![], 1);
        assert!(empty.select_next_character().is_none());
    }

    #[test]
    fn test_select_clears_scratch_state() {
        let mut session = basic_session(2);
        session.select_next_character();
        session.record_mistake("zzz");

        session.select_next_character();
        let question = session.current_question().unwrap();
        assert_eq!(question.attempts, 0);
        assert_eq!(question.input, "");
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = basic_session(10);
        let mut b = basic_session(10);
        for _ in 0..10 {
            assert_eq!(a.select_next_character(), b.select_next_character());
        }
    }

    #[test]
    fn test_evaluate_answer_is_exact() {
        let mut session = basic_session(1);
        session.ask(ka());

        assert!(session.evaluate_answer("ka"));
        assert!(!session.evaluate_answer("Ka"));
        assert!(!session.evaluate_answer(" ka"));
        assert!(!session.evaluate_answer("ka "));
        assert!(!session.evaluate_answer(""));
    }

    #[test]
    fn test_evaluate_answer_does_not_mutate() {
        let mut session = basic_session(1);
        session.ask(ka());
        session.evaluate_answer("ga");

        let question = session.current_question().unwrap();
        assert_eq!(question.attempts, 0);
        assert!(session.runs().is_empty());
    }

    #[test]
    fn test_evaluate_answer_when_idle() {
        let session = basic_session(1);
        assert!(!session.evaluate_answer(""));
        assert!(!session.evaluate_answer("a"));
    }

    #[test]
    fn test_record_mistake_updates_scratch_only() {
        let mut session = basic_session(1);
        session.ask(ka());

        session.record_mistake("ga");
        session.record_mistake("kka");

        let question = session.current_question().unwrap();
        assert_eq!(question.attempts, 2);
        assert_eq!(question.input, "kka");
        assert!(session.runs().is_empty());
    }

    #[test]
    fn test_record_mistake_when_idle_is_ignored() {
        let mut session = basic_session(1);
        session.record_mistake("x");
        assert!(session.current_question().is_none());
    }

    #[test]
    fn test_complete_correct_question() {
        let mut session = basic_session(1);
        session.ask(ka());
        session.complete_question(true);

        let run = session.current_run().unwrap();
        assert_eq!(run.total, 1);
        assert_eq!(run.correct, 1);
        assert_eq!(run.incorrect, 0);
        assert!(run.mistakes.is_empty());
        assert_eq!(run.categories, vec!["basic".to_string()]);
        assert!(session.is_finished());
    }

    #[test]
    fn test_complete_incorrect_question_snapshots_scratch() {
        let mut session = basic_session(1);
        session.ask(ka());
        thread::sleep(Duration::from_millis(10));
        session.record_mistake("ga");
        session.complete_question(false);

        let run = session.current_run().unwrap();
        assert_eq!(run.total, 1);
        assert_eq!(run.incorrect, 1);
        assert_eq!(run.mistakes.len(), 1);

        let mistake = &run.mistakes[0];
        assert_eq!(mistake.character, ka());
        assert_eq!(mistake.input, "ga");
        assert_eq!(mistake.attempts, 1);
        assert!(!mistake.correct);
        assert!(mistake.time_spent >= Duration::from_millis(10));
    }

    #[test]
    fn test_complete_when_idle_is_ignored() {
        let mut session = basic_session(1);
        session.complete_question(true);
        assert!(session.runs().is_empty());
    }

    #[test]
    fn test_single_run_is_reused() {
        let mut session = basic_session(3);
        for _ in 0..3 {
            session.select_next_character();
            session.complete_question(true);
        }
        assert_eq!(session.runs().len(), 1);
        assert_eq!(session.answered(), 3);
    }

    #[test]
    fn test_completing_twice_double_counts() {
        let mut session = basic_session(1);
        session.ask(ka());
        session.complete_question(false);
        session.complete_question(false);

        let run = session.current_run().unwrap();
        assert_eq!(run.total, 2);
        assert_eq!(run.incorrect, 2);
        assert_eq!(run.mistakes.len(), 2);
    }

    #[test]
    fn test_accuracy_sixty_percent() {
        let mut session = basic_session(5);
        for correct in [true, false, true, false, true] {
            session.select_next_character();
            if !correct {
                session.record_mistake("wrong");
            }
            session.complete_question(correct);
        }
        assert_eq!(session.accuracy(), 60.0);
    }

    #[test]
    fn test_accuracy_uses_latest_run() {
        let mut session = basic_session(2);
        session.ask(ka());
        session.complete_question(false);
        assert_eq!(session.accuracy(), 0.0);

        session.start_new_run();
        assert_eq!(session.accuracy(), 0.0);

        session.ask(ka());
        session.complete_question(true);
        assert_eq!(session.accuracy(), 100.0);
        assert_eq!(session.runs().len(), 2);
    }

    #[test]
    fn test_weaknesses_need_two_misses() {
        let mut session = basic_session(3);
        let shi = lookup(Representation::Romaji, "shi").unwrap().clone();

        session.ask(shi.clone());
        session.record_mistake("si");
        session.complete_question(false);

        session.ask(ka());
        session.record_mistake("ga");
        session.complete_question(false);

        assert!(session.weaknesses(5).is_empty());

        session.ask(shi);
        session.record_mistake("chi");
        session.complete_question(false);

        let weaknesses = session.weaknesses(5);
        assert_eq!(weaknesses.len(), 2);
        assert_eq!(weaknesses[0].input, "si");
        assert_eq!(weaknesses[1].input, "chi");
    }

    #[test]
    fn test_weaknesses_match_romaji_across_runs() {
        let mut session = basic_session(2);

        session.ask(Character::new("し", "シ", "shi", Category::Basic));
        session.record_mistake("si");
        session.complete_question(false);

        session.start_new_run();
        session.ask(Character::new("シ", "シ", "shi", Category::Basic));
        session.record_mistake("tsi");
        session.complete_question(false);

        let weaknesses = session.weaknesses(5);
        assert_eq!(weaknesses.len(), 2);
        assert_eq!(weaknesses[0].character.hiragana, "し");
        assert_eq!(weaknesses[1].character.hiragana, "シ");
    }

    #[test]
    fn test_weaknesses_zero_limit() {
        let mut session = basic_session(2);
        for _ in 0..2 {
            session.ask(ka());
            session.complete_question(false);
        }
        assert_eq!(session.weaknesses(5).len(), 2);
        assert!(session.weaknesses(0).is_empty());
    }

    #[test]
    fn test_weaknesses_without_runs() {
        let session = basic_session(2);
        assert!(session.weaknesses(5).is_empty());
    }
}
