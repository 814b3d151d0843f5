use gojuon::{history::RunSummary, practice::Mistake};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::App;

fn accuracy_color(accuracy: f64) -> Color {
    if accuracy >= 90.0 {
        Color::Green
    } else if accuracy >= 60.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Pure presenter for a single missed answer
pub fn present_mistake_row(mistake: &Mistake) -> Row<'static> {
    let input = if mistake.input.is_empty() {
        "(blank)".to_string()
    } else {
        mistake.input.clone()
    };

    Row::new(vec![
        Cell::from(format!(
            "{} {}",
            mistake.character.hiragana, mistake.character.katakana
        ))
        .style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(mistake.character.romaji.clone()).style(Style::default().fg(Color::Green)),
        Cell::from(input).style(Style::default().fg(Color::Red)),
        Cell::from(mistake.attempts.to_string()),
        Cell::from(format!("{:.1}s", mistake.time_spent.as_secs_f64())),
    ])
}

/// Pure presenter for a stored practice run
pub fn present_run_row(run: &RunSummary) -> Row<'static> {
    let accuracy = run.accuracy();
    Row::new(vec![
        Cell::from(run.started_at.format("%Y-%m-%d %H:%M").to_string()),
        Cell::from(run.total.to_string()),
        Cell::from(run.correct.to_string()),
        Cell::from(format!("{accuracy:.1}%")).style(Style::default().fg(accuracy_color(accuracy))),
        Cell::from(run.categories.join(", ")),
    ])
}

fn header(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|t| Cell::from(*t)).collect::<Vec<_>>()).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn clamp_scroll(scroll: &mut usize, total_rows: usize, area: Rect) -> usize {
    // borders + header
    let table_height = area.height.saturating_sub(3) as usize;
    let max_scroll = total_rows.saturating_sub(table_height);
    if *scroll > max_scroll {
        *scroll = max_scroll;
    }
    table_height
}

/// Draws `mistakes` as a table, or a placeholder when there are none
pub fn render_weaknesses_table(mistakes: &[Mistake], scroll: usize, f: &mut Frame, area: Rect) {
    if mistakes.is_empty() {
        let no_data = Paragraph::new("No repeated mistakes yet. Practice to collect data.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, area);
        return;
    }

    let table_height = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = mistakes
        .iter()
        .skip(scroll)
        .take(table_height)
        .map(present_mistake_row)
        .collect();

    let widths = [
        Constraint::Length(8),  // kana
        Constraint::Length(8),  // romaji
        Constraint::Length(12), // typed
        Constraint::Length(9),  // attempts
        Constraint::Min(6),     // time
    ];

    let table = Table::new(rows, widths)
        .header(header(&["Kana", "Romaji", "Typed", "Attempts", "Time"]))
        .block(Block::default().borders(Borders::ALL).title("Weaknesses"))
        .column_spacing(2);
    f.render_widget(table, area);
}

fn layout(f: &Frame) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Totals
            Constraint::Length(1), // Instructions
        ])
        .split(f.area())
}

/// One line summary of the most missed romaji, e.g. `shi (3), ka (2)`
pub fn format_mistake_totals(totals: &[(String, i64)], limit: usize) -> String {
    totals
        .iter()
        .take(limit)
        .map(|(romaji, count)| format!("{romaji} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn title(text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
}

fn instructions(extra: &str) -> Paragraph<'static> {
    Paragraph::new(format!(
        "(↑/↓) scroll  (PgUp/PgDn) page  (Home) top  {extra}(b/esc) back"
    ))
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true })
}

/// Render the practice history screen
pub fn render_history(app: &mut App, f: &mut Frame) {
    let chunks = layout(f);
    f.render_widget(
        title(format!("Practice History ({} runs)", app.recent_runs.len())),
        chunks[0],
    );

    if app.history.is_none() {
        let disabled = Paragraph::new("History is disabled in the configuration.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(disabled, chunks[1]);
    } else if app.recent_runs.is_empty() {
        let no_data = Paragraph::new("No practice runs recorded yet.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        let table_height =
            clamp_scroll(&mut app.scroll_offset, app.recent_runs.len(), chunks[1]);
        let rows: Vec<Row> = app
            .recent_runs
            .iter()
            .skip(app.scroll_offset)
            .take(table_height)
            .map(present_run_row)
            .collect();

        let widths = [
            Constraint::Length(17), // date
            Constraint::Length(6),  // total
            Constraint::Length(8),  // correct
            Constraint::Length(9),  // accuracy
            Constraint::Min(10),    // categories
        ];

        let table = Table::new(rows, widths)
            .header(header(&["Date", "Total", "Correct", "Accuracy", "Categories"]))
            .block(Block::default().borders(Borders::ALL).title("Runs"))
            .column_spacing(2);
        f.render_widget(table, chunks[1]);
    }

    if !app.mistake_totals.is_empty() {
        let totals = Paragraph::new(format!(
            "Most missed: {}",
            format_mistake_totals(&app.mistake_totals, 5)
        ))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red));
        f.render_widget(totals, chunks[2]);
    }
    f.render_widget(instructions("(c) clear  "), chunks[3]);
}

/// Render the weaknesses of the last practice session
pub fn render_weaknesses(app: &mut App, f: &mut Frame) {
    let chunks = layout(f);
    f.render_widget(
        title("Characters missed more than once".to_string()),
        chunks[0],
    );

    clamp_scroll(
        &mut app.scroll_offset,
        app.last_weaknesses.len(),
        chunks[1],
    );
    render_weaknesses_table(&app.last_weaknesses, app.scroll_offset, f, chunks[1]);

    f.render_widget(instructions(""), chunks[3]);
}
