use chrono::{DateTime, Local};
use itertools::Itertools;
use std::time::Duration;

use crate::kana::Character;

/// Snapshot of one question, taken when it was completed
#[derive(Debug, Clone, PartialEq)]
pub struct Mistake {
    pub character: Character,
    /// Last wrong input submitted for the question
    pub input: String,
    pub attempts: u32,
    pub correct: bool,
    pub time_spent: Duration,
}

/// Aggregate counters for one run of a session
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub started_at: DateTime<Local>,
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub mistakes: Vec<Mistake>,
    pub categories: Vec<String>,
}

impl Run {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            started_at: Local::now(),
            total: 0,
            correct: 0,
            incorrect: 0,
            mistakes: Vec::new(),
            categories,
        }
    }

    /// Percentage of correct answers, 0 when nothing was answered
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }
}

/// Every mistake whose romaji was missed at least twice across `runs`,
/// in completion order, cut to the first `limit` entries.
pub fn repeated_mistakes(runs: &[Run], limit: usize) -> Vec<Mistake> {
    let counts = runs
        .iter()
        .flat_map(|run| run.mistakes.iter())
        .counts_by(|m| m.character.romaji.as_str());

    runs.iter()
        .flat_map(|run| run.mistakes.iter())
        .filter(|m| counts.get(m.character.romaji.as_str()).copied().unwrap_or(0) >= 2)
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kana::Category;

    fn mistake(hiragana: &str, romaji: &str, input: &str) -> Mistake {
        Mistake {
            character: Character::new(hiragana, "", romaji, Category::Basic),
            input: input.to_string(),
            attempts: 1,
            correct: false,
            time_spent: Duration::from_millis(500),
        }
    }

    fn run_with(mistakes: Vec<Mistake>) -> Run {
        let mut run = Run::new(vec!["basic".to_string()]);
        run.total = mistakes.len();
        run.incorrect = mistakes.len();
        run.mistakes = mistakes;
        run
    }

    #[test]
    fn test_run_accuracy() {
        let mut run = Run::new(vec![]);
        assert_eq!(run.accuracy(), 0.0);

        run.total = 4;
        run.correct = 3;
        run.incorrect = 1;
        assert_eq!(run.accuracy(), 75.0);
    }

    #[test]
    fn test_repeated_mistakes_keeps_every_occurrence_in_order() {
        let run = run_with(vec![
            mistake("し", "shi", "si"),
            mistake("か", "ka", "ga"),
            mistake("ち", "chi", "ti"),
            mistake("し", "shi", "shii"),
            mistake("ち", "chi", "tchi"),
        ]);

        let inputs: Vec<String> = repeated_mistakes(&[run], 10)
            .into_iter()
            .map(|m| m.input)
            .collect();
        assert_eq!(inputs, vec!["si", "ti", "shii", "tchi"]);
    }

    #[test]
    fn test_repeated_mistakes_truncates_by_position() {
        let run = run_with(vec![
            mistake("ち", "chi", "ti"),
            mistake("し", "shi", "si"),
            mistake("し", "shi", "su"),
            mistake("し", "shi", "sh"),
            mistake("ち", "chi", "chii"),
        ]);

        let kept = repeated_mistakes(&[run], 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].input, "ti");
        assert_eq!(kept[1].input, "si");
    }

    #[test]
    fn test_repeated_mistakes_counts_across_runs() {
        let first = run_with(vec![mistake("し", "shi", "si")]);
        let second = run_with(vec![mistake("シ", "shi", "xi"), mistake("か", "ka", "ga")]);

        let kept = repeated_mistakes(&[first, second], 5);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|m| m.character.romaji == "shi"));
    }

    #[test]
    fn test_repeated_mistakes_zero_limit() {
        let run = run_with(vec![mistake("し", "shi", "si"), mistake("し", "shi", "si")]);
        assert!(repeated_mistakes(&[run], 0).is_empty());
    }

    #[test]
    fn test_repeated_mistakes_no_runs() {
        assert!(repeated_mistakes(&[], 5).is_empty());
    }
}
