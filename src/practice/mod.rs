pub mod console;
pub mod run;
pub mod session;

pub use console::run_console;
pub use run::{Mistake, Run};
pub use session::{PracticeSession, Question};
