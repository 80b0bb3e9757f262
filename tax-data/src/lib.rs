mod loader;
pub mod new_york;

pub use loader::{BracketCsvLoader, BracketLoaderError, BracketRecord};
