use crate::kana::{self, Character, Representation};

/// Outcome of looking up one value
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub query: String,
    pub character: Option<&'static Character>,
}

impl LookupResult {
    pub fn found(&self) -> bool {
        self.character.is_some()
    }
}

pub fn lookup(kind: Representation, value: &str) -> LookupResult {
    LookupResult {
        query: value.to_string(),
        character: kana::lookup(kind, value),
    }
}

pub fn batch_lookup<S: AsRef<str>>(kind: Representation, values: &[S]) -> Vec<LookupResult> {
    values.iter().map(|v| lookup(kind, v.as_ref())).collect()
}

pub fn format_lookup_result(result: &LookupResult) -> String {
    match result.character {
        Some(c) => format!(
            "Hiragana: {}\nKatakana: {}\nRomaji: {}\nCategory: {}",
            c.hiragana, c.katakana, c.romaji, c.category
        ),
        None => format!("Character not found: {}", result.query),
    }
}

pub fn format_batch_lookup(results: &[LookupResult]) -> String {
    results
        .iter()
        .map(format_lookup_result)
        .collect::<Vec<_>>()
        .join("\n\n")
}
