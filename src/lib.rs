// Library surface for the binary, headless/integration tests and reuse.
// Terminal UI types stay in the binary.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod history;
pub mod kana;
pub mod learn;
pub mod lookup;
pub mod practice;
pub mod runtime;

pub use error::{Error, Result};
