pub mod screen;
pub mod tables;

use gojuon::learn::{self, Difficulty};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{ui::screen::current_screen, App, AppState, Feedback, MENU_ITEMS};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &mut App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}

/// Practice question: kana prompt, typed answer and feedback
impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1), // progress
                Constraint::Length(1),
                Constraint::Length(3), // kana box
                Constraint::Length(1),
                Constraint::Length(1), // answer
                Constraint::Length(1), // feedback
                Constraint::Min(0),
                Constraint::Length(1), // legend
            ])
            .split(area);

        let progress = Paragraph::new(Span::styled(
            format!(
                "Question {}/{}   {:.0}% acc",
                (session.answered() + 1).min(session.count()),
                session.count(),
                session.accuracy()
            ),
            dim_style,
        ))
        .alignment(Alignment::Center);
        progress.render(chunks[1], buf);

        if let Some(question) = session.current_question() {
            let kana = question.character.form(self.prompt_script());
            let box_width = (kana.width() as u16 + 6).min(chunks[3].width);
            let box_area = Rect {
                x: chunks[3].x + (chunks[3].width - box_width) / 2,
                width: box_width,
                ..chunks[3]
            };
            Paragraph::new(Span::styled(kana, bold_style.fg(Color::Cyan)))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center)
                .render(box_area, buf);

            let elapsed = question.started_at.elapsed().as_secs_f64();
            Paragraph::new(Line::from(vec![
                Span::styled("> ", dim_style),
                Span::styled(self.answer.as_str(), bold_style),
                Span::styled("_", dim_style.add_modifier(Modifier::SLOW_BLINK)),
                Span::styled(format!("   {elapsed:.1}s"), dim_style),
            ]))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
        }

        let feedback = match &self.feedback {
            Some(Feedback::Correct) => Span::styled("Correct!", bold_style.fg(Color::Green)),
            Some(Feedback::Incorrect { expected }) => Span::styled(
                format!("Incorrect! The answer is: {expected}   (any key to continue)"),
                bold_style.fg(Color::Red),
            ),
            None => Span::raw(""),
        };
        Paragraph::new(feedback)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[6], buf);

        Paragraph::new(Span::styled("(enter) submit / (esc) finish", italic_style))
            .render(chunks[8], buf);
    }
}

pub fn render_menu(app: &mut App, f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new("五十音 gojuon")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let lines: Vec<Line> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let selected = idx == app.menu_index;
            let style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(if selected { "> " } else { "  " }, style),
                Span::styled(format!("({}) {:<12}", item.hotkey(), item.label()), style),
                Span::styled(
                    item.description(),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ])
        })
        .collect();

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Left),
        chunks[1].inner(ratatui::layout::Margin::new(HORIZONTAL_MARGIN, 1)),
    );

    f.render_widget(
        Paragraph::new("(↑/↓) move  (enter) select  (q) quit")
            .style(Style::default().add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center),
        chunks[2],
    );
}

pub fn render_learn(app: &mut App, f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new("Choose a difficulty")
        .block(Block::default().borders(Borders::ALL).title("Learn"))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let lines: Vec<Line> = [
        ('e', Difficulty::Easy),
        ('n', Difficulty::Normal),
        ('h', Difficulty::Hard),
    ]
    .into_iter()
    .map(|(key, difficulty)| {
        let style = if difficulty == app.difficulty {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("({key}) {:<8}", capitalize(&difficulty.to_string())), style),
            Span::raw(difficulty.title()),
        ])
    })
    .collect();
    f.render_widget(
        Paragraph::new(lines),
        chunks[1].inner(ratatui::layout::Margin::new(HORIZONTAL_MARGIN, 1)),
    );

    f.render_widget(
        Paragraph::new("(e/n/h) open  (b) back")
            .style(Style::default().add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center),
        chunks[2],
    );
}

pub fn render_learn_content(app: &mut App, f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let content = learn::learning_content(app.difficulty);
    let text = learn::format_learning_content(&content, app.script);
    let lines: Vec<Line> = text.lines().map(Line::from).collect();

    let visible = chunks[0].height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible);
    if app.scroll_offset > max_scroll {
        app.scroll_offset = max_scroll;
    }

    let table = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Learn ({})", app.script)),
        )
        .scroll((app.scroll_offset as u16, 0));
    f.render_widget(table, chunks[0]);

    f.render_widget(
        Paragraph::new("(↑/↓) scroll  (PgUp/PgDn) page  (s) script  (b) back")
            .style(Style::default().add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center),
        chunks[1],
    );
}

pub fn render_practice(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}

pub fn render_results(app: &mut App, f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // stats
            Constraint::Length(1),
            Constraint::Min(0), // weaknesses
            Constraint::Length(1), // legend
        ])
        .split(area);

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    f.render_widget(
        Paragraph::new(Span::styled(
            "Practice session completed!",
            bold_style.fg(Color::Cyan),
        ))
        .alignment(Alignment::Center),
        chunks[0],
    );

    let (answered, correct, incorrect, accuracy) = app
        .session
        .as_ref()
        .and_then(|s| s.current_run())
        .map(|run| (run.total, run.correct, run.incorrect, run.accuracy()))
        .unwrap_or((0, 0, 0, 0.0));
    f.render_widget(
        Paragraph::new(Span::styled(
            format!(
                "{answered} answered   {correct} correct   {incorrect} incorrect   {accuracy:.2}% acc"
            ),
            bold_style,
        ))
        .alignment(Alignment::Center),
        chunks[1],
    );

    if let Some(session) = app.session.as_ref() {
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("started at {}", session.started_at().format("%H:%M:%S")),
                Style::default().add_modifier(Modifier::DIM),
            ))
            .alignment(Alignment::Center),
            chunks[2],
        );
    }

    tables::render_weaknesses_table(&app.last_weaknesses, 0, f, chunks[3]);

    f.render_widget(
        Paragraph::new(Span::styled(
            "(r)etry / (w)eaknesses / (b)ack / (q)uit",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        chunks[4],
    );
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// True when the screen redraws on every tick
pub fn is_animated(state: &AppState) -> bool {
    matches!(state, AppState::Practice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gojuon::{
        config::{Config, PracticeConfig},
        kana::{lookup, Representation},
        learn::ScriptKind,
        practice::PracticeSession,
    };

    fn practice_app(script: ScriptKind) -> App {
        let config = Config {
            practice: PracticeConfig {
                default_count: 3,
                categories: vec!["basic".to_string()],
            },
            ..Config::default()
        };
        let mut app = App::new(config, None, script);
        let mut session = PracticeSession::with_seed(3, vec!["basic".to_string()], 1);
        session.ask(lookup(Representation::Romaji, "ka").unwrap().clone());
        app.session = Some(session);
        app.state = AppState::Practice;
        app
    }

    fn rendered(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_practice_widget_shows_prompt() {
        let app = practice_app(ScriptKind::Hiragana);
        let text = rendered(&app, Rect::new(0, 0, 80, 24));

        assert!(text.contains("か"));
        assert!(text.contains("Question 1/3"));
        assert!(text.contains("(enter) submit"));
    }

    #[test]
    fn test_practice_widget_katakana_prompt() {
        let app = practice_app(ScriptKind::Katakana);
        let text = rendered(&app, Rect::new(0, 0, 80, 24));
        assert!(text.contains("カ"));
        assert!(!text.contains("か"));
    }

    #[test]
    fn test_practice_widget_shows_typed_answer() {
        let mut app = practice_app(ScriptKind::Hiragana);
        app.answer = "kx".to_string();
        assert!(rendered(&app, Rect::new(0, 0, 80, 24)).contains("> kx_"));
    }

    #[test]
    fn test_practice_widget_feedback() {
        let mut app = practice_app(ScriptKind::Hiragana);

        app.feedback = Some(Feedback::Correct);
        assert!(rendered(&app, Rect::new(0, 0, 80, 24)).contains("Correct!"));

        app.feedback = Some(Feedback::Incorrect {
            expected: "ka".to_string(),
        });
        assert!(rendered(&app, Rect::new(0, 0, 100, 24)).contains("The answer is: ka"));
    }

    #[test]
    fn test_practice_widget_without_session() {
        let app = App::new(Config::default(), None, ScriptKind::Both);
        let area = Rect::new(0, 0, 80, 24);
        assert!(rendered(&app, area).trim().is_empty());
    }

    #[test]
    fn test_practice_widget_extreme_sizes() {
        let app = practice_app(ScriptKind::Hiragana);
        for area in [
            Rect::new(0, 0, 1, 1),
            Rect::new(0, 0, 12, 5),
            Rect::new(0, 0, 200, 5),
            Rect::new(0, 0, 20, 50),
            Rect::new(0, 0, 500, 500),
        ] {
            let mut buffer = Buffer::empty(area);
            (&app).render(area, &mut buffer);
            assert!(*buffer.area() == area);
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("easy"), "Easy");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_only_practice_is_animated() {
        assert!(is_animated(&AppState::Practice));
        assert!(!is_animated(&AppState::Menu));
        assert!(!is_animated(&AppState::Results));
    }

    #[test]
    fn test_ui_constants() {
        const _: () = assert!(HORIZONTAL_MARGIN * 2 < 80);
        const _: () = assert!(VERTICAL_MARGIN * 2 < 24);
    }
}
