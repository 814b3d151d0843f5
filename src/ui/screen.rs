use ratatui::Frame;

use crate::{
    ui::{
        render_learn, render_learn_content, render_menu, render_practice, render_results,
        tables::{render_history, render_weaknesses},
    },
    App, AppState,
};

/// A UI Screen boundary, one per app state
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_menu(app, f);
    }
}

/// Difficulty picker
pub struct LearnScreen;

impl Screen for LearnScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_learn(app, f);
    }
}

/// Scrollable syllabary table for the chosen difficulty
pub struct LearnContentScreen;

impl Screen for LearnContentScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_learn_content(app, f);
    }
}

/// Practice screen - renders the question using the App widget
pub struct PracticeScreen;

impl Screen for PracticeScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_practice(app, f);
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_results(app, f);
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_history(app, f);
    }
}

pub struct WeaknessesScreen;

impl Screen for WeaknessesScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_weaknesses(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu => Box::new(MenuScreen),
        AppState::Learn => Box::new(LearnScreen),
        AppState::LearnContent => Box::new(LearnContentScreen),
        AppState::Practice => Box::new(PracticeScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::History => Box::new(HistoryScreen),
        AppState::Weaknesses => Box::new(WeaknessesScreen),
    }
}
