use itertools::Itertools;

use crate::kana::{self, Category, Character};

/// How much of the syllabary a learning table covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    /// Basic sounds only
    Easy,
    /// Basic and voiced sounds
    Normal,
    /// Every category
    Hard,
}

impl Difficulty {
    pub fn categories(&self) -> &'static [Category] {
        match self {
            Difficulty::Easy => &[Category::Basic],
            Difficulty::Normal => &[Category::Basic, Category::Voiced],
            Difficulty::Hard => &Category::ALL,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Basic Sounds (清音)",
            Difficulty::Normal => "Basic and Voiced Sounds (清音・濁音)",
            Difficulty::Hard => "All Sounds (五十音)",
        }
    }
}

/// Which kana column(s) a learning table shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ScriptKind {
    Hiragana,
    Katakana,
    Both,
}

#[derive(Debug, Clone)]
pub struct LearningContent {
    pub title: String,
    pub categories: Vec<Category>,
    pub characters: Vec<&'static Character>,
}

pub fn learning_content(difficulty: Difficulty) -> LearningContent {
    let categories = difficulty.categories().to_vec();
    let characters = categories
        .iter()
        .flat_map(|c| kana::characters_in_category(c.key()))
        .collect();

    LearningContent {
        title: difficulty.title().to_string(),
        categories,
        characters,
    }
}

pub fn format_character(character: &Character, script: ScriptKind) -> String {
    let display = match script {
        ScriptKind::Hiragana => character.hiragana.clone(),
        ScriptKind::Katakana => character.katakana.clone(),
        ScriptKind::Both => format!("{} ({})", character.hiragana, character.katakana),
    };
    format!("{} - {}", display, character.romaji)
}

pub fn format_category(category: Category) -> &'static str {
    match category {
        Category::Basic => "清音 (Basic Sounds)",
        Category::Voiced => "濁音 (Voiced Sounds)",
        Category::HalfVoiced => "半濁音 (Half-Voiced Sounds)",
        Category::Contracted => "拗音 (Contracted Sounds)",
    }
}

pub fn format_learning_content(content: &LearningContent, script: ScriptKind) -> String {
    let by_category = content
        .characters
        .iter()
        .into_group_map_by(|c| c.category);

    let mut out = format!("{}\n\n", content.title);
    for category in &content.categories {
        out.push_str(&format!("{}:\n", format_category(*category)));
        for character in by_category.get(category).into_iter().flatten() {
            out.push_str(&format!("  {}\n", format_character(character, script)));
        }
        out.push('\n');
    }
    out
}
