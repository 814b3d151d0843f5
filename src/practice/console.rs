use log::info;
use std::io::{self, BufRead, Write};

use super::PracticeSession;
use crate::kana::Representation;

const QUIT_COMMAND: &str = "quit";
const WEAKNESS_LIMIT: usize = 5;

/// Line-mode practice loop: one question per line of `input` until the
/// session's question count is reached, `quit` is typed or input ends.
///
/// `script` picks which kana form is shown in the prompt.
pub fn run_console<R: BufRead, W: Write>(
    session: &mut PracticeSession,
    script: Representation,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "Starting practice session...")?;
    writeln!(out, "Type '{QUIT_COMMAND}' to exit")?;
    info!("console practice started: {} questions", session.count());

    for i in 0..session.count() {
        let Some(character) = session.select_next_character() else {
            writeln!(out, "\nNo characters available for the selected categories")?;
            break;
        };

        writeln!(
            out,
            "\nQuestion {}/{}: What is the romaji for: {}",
            i + 1,
            session.count(),
            character.form(script)
        )?;
        write!(out, "Answer: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out, "\nPractice session ended")?;
            return Ok(());
        }
        let answer = line.trim_end_matches(['\n', '\r']);

        if answer == QUIT_COMMAND {
            writeln!(out, "\nPractice session ended")?;
            return Ok(());
        }

        if session.evaluate_answer(answer) {
            writeln!(out, "Correct!")?;
            session.complete_question(true);
        } else {
            session.record_mistake(answer);
            writeln!(out, "Incorrect! The answer is: {}", character.romaji)?;
            session.complete_question(false);
        }
    }

    write_summary(session, out)
}

fn write_summary<W: Write>(session: &PracticeSession, out: &mut W) -> io::Result<()> {
    writeln!(out, "\nPractice session completed!")?;
    writeln!(out, "Accuracy: {:.2}%", session.accuracy())?;
    info!(
        "console practice finished: {} answered, {:.2}% accuracy",
        session.answered(),
        session.accuracy()
    );

    let weaknesses = session.weaknesses(WEAKNESS_LIMIT);
    if !weaknesses.is_empty() {
        writeln!(out, "\nWeaknesses:")?;
        for weakness in weaknesses {
            writeln!(
                out,
                "- {} ({}) answered \"{}\" after {} attempt(s)",
                weakness.character.romaji,
                weakness.character.hiragana,
                weakness.input,
                weakness.attempts
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(session: &mut PracticeSession, stdin: &str) -> String {
        let mut input = Cursor::new(stdin.as_bytes().to_vec());
        let mut out = Vec::new();
        run_console(session, Representation::Hiragana, &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_quit_ends_early() {
        let mut session = PracticeSession::with_seed(3, vec!["basic".to_string()], 3);
        let output = run(&mut session, "quit\n");

        assert!(output.contains("Question 1/3"));
        assert!(output.contains("Practice session ended"));
        assert!(!output.contains("Practice session completed!"));
        assert!(session.runs().is_empty());
    }

    #[test]
    fn test_eof_ends_early() {
        let mut session = PracticeSession::with_seed(3, vec!["basic".to_string()], 3);
        let output = run(&mut session, "");
        assert!(output.contains("Practice session ended"));
    }

    #[test]
    fn test_wrong_answers_are_completed() {
        let mut session = PracticeSession::with_seed(3, vec!["basic".to_string()], 3);
        let output = run(&mut session, "x\nx\nx\n");

        assert!(output.contains("Incorrect! The answer is:"));
        assert!(output.contains("Practice session completed!"));
        assert!(output.contains("Accuracy: 0.00%"));

        let result = session.current_run().unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.incorrect, 3);
        assert!(result.mistakes.iter().all(|m| m.input == "x" && m.attempts == 1));
    }

    #[test]
    fn test_correct_answers_follow_prompt() {
        // Answer each question by reading the prompt back from the
        // same seeded sequence.
        let mut oracle = PracticeSession::with_seed(4, vec!["contracted".to_string()], 11);
        let answers: String = (0..4)
            .map(|_| format!("{}\n", oracle.select_next_character().unwrap().romaji))
            .collect();

        let mut session = PracticeSession::with_seed(4, vec!["contracted".to_string()], 11);
        let output = run(&mut session, &answers);

        assert_eq!(output.matches("Correct!").count(), 4);
        assert!(output.contains("Accuracy: 100.00%"));
        assert!(!output.contains("Weaknesses:"));
    }

    #[test]
    fn test_no_candidates() {
        let mut session = PracticeSession::with_seed(3, vec!["nope".to_string()], 3);
        let output = run(&mut session, "a\n");
        assert!(output.contains("No characters available"));
        assert!(output.contains("Accuracy: 0.00%"));
    }

    #[test]
    fn test_katakana_prompt() {
        let mut session = PracticeSession::with_seed(1, vec!["half-voiced".to_string()], 5);
        let mut input = Cursor::new(b"quit\n".to_vec());
        let mut out = Vec::new();
        run_console(&mut session, Representation::Katakana, &mut input, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let asked = session.current_question().unwrap();
        assert!(output.contains(&asked.character.katakana));
    }
}
