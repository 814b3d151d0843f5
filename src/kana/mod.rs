use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::error::Error;
use std::sync::LazyLock;

static KANA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/kana/data");

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    read_catalog_from_file("gojuon.json").expect("embedded kana table must deserialize")
});

/// Group a character belongs to in the syllabary table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    Basic,
    Voiced,
    HalfVoiced,
    Contracted,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Basic,
        Category::Voiced,
        Category::HalfVoiced,
        Category::Contracted,
    ];

    /// Key used in config files and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Category::Basic => "basic",
            Category::Voiced => "voiced",
            Category::HalfVoiced => "half-voiced",
            Category::Contracted => "contracted",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }
}

/// Which written form of a character a value is given in
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Representation {
    Hiragana,
    Katakana,
    Romaji,
}

/// One syllable: its two kana forms, its romanization and its group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Character {
    pub hiragana: String,
    pub katakana: String,
    pub romaji: String,
    pub category: Category,
}

impl Character {
    pub fn new(hiragana: &str, katakana: &str, romaji: &str, category: Category) -> Self {
        Self {
            hiragana: hiragana.to_string(),
            katakana: katakana.to_string(),
            romaji: romaji.to_string(),
            category,
        }
    }

    pub fn form(&self, kind: Representation) -> &str {
        match kind {
            Representation::Hiragana => &self.hiragana,
            Representation::Katakana => &self.katakana,
            Representation::Romaji => &self.romaji,
        }
    }
}

#[derive(Deserialize)]
struct RawCharacter {
    hiragana: String,
    katakana: String,
    romaji: String,
}

#[derive(Deserialize)]
struct RawGroup {
    key: Category,
    characters: Vec<RawCharacter>,
}

#[derive(Deserialize)]
struct RawCatalog {
    #[allow(dead_code)]
    name: String,
    categories: Vec<RawGroup>,
}

#[derive(Debug)]
struct CategoryGroup {
    category: Category,
    characters: Vec<Character>,
}

/// Read-only syllabary table, grouped by category in table order
#[derive(Debug)]
pub struct Catalog {
    groups: Vec<CategoryGroup>,
}

impl Catalog {
    fn from_raw(raw: RawCatalog) -> Self {
        let groups = raw
            .categories
            .into_iter()
            .map(|group| CategoryGroup {
                category: group.key,
                characters: group
                    .characters
                    .into_iter()
                    .map(|c| Character {
                        hiragana: c.hiragana,
                        katakana: c.katakana,
                        romaji: c.romaji,
                        category: group.key,
                    })
                    .collect(),
            })
            .collect();
        Self { groups }
    }

    pub fn characters_in(&self, category: Category) -> &[Character] {
        self.groups
            .iter()
            .find(|g| g.category == category)
            .map(|g| g.characters.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.groups.iter().flat_map(|g| g.characters.iter())
    }

    /// First character, in table order, whose `kind` form equals `value`
    pub fn find(&self, kind: Representation, value: &str) -> Option<&Character> {
        self.iter().find(|c| c.form(kind) == value)
    }
}

fn read_catalog_from_file(file_name: &str) -> Result<Catalog, Box<dyn Error>> {
    let file = KANA_DIR
        .get_file(file_name)
        .ok_or_else(|| format!("kana table {file_name} not found"))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or("unable to interpret kana table as a string")?;

    let raw: RawCatalog = from_str(file_as_str)?;
    Ok(Catalog::from_raw(raw))
}

/// The process-wide syllabary table
pub fn catalog() -> &'static Catalog {
    &CATALOG
}

pub fn lookup(kind: Representation, value: &str) -> Option<&'static Character> {
    catalog().find(kind, value)
}

/// Characters for a category key; unknown keys yield an empty slice
pub fn characters_in_category(key: &str) -> &'static [Character] {
    match Category::from_key(key) {
        Some(category) => catalog().characters_in(category),
        None => &[],
    }
}

pub fn all_characters() -> impl Iterator<Item = &'static Character> {
    catalog().iter()
}
