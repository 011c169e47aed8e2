pub mod bank_loader;
pub mod toml_loader;

pub use bank_loader::{parse_bank_document, BankSource};
pub use toml_loader::{load_catalog, parse_catalog};
