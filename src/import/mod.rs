pub mod committer;
pub mod importer;
pub mod parser;
pub mod progress;
pub mod spec;
pub mod validator;

#[cfg(test)]
mod unit_tests;

pub use importer::{ImportResult, Importer, Rejection};
pub use progress::Progress;
pub use spec::ImportSpec;
