pub mod bank;
pub mod cheat_sheet;
pub mod loaders;
pub mod question;

pub use bank::{BankDocument, BankQuestion, Metadata, RawBank, RawQuestion};
pub use cheat_sheet::{category_label, Category, CategoryCatalog, CategoryInfo, CheatSheet};
pub use loaders::{load_catalog, parse_bank_document, BankSource};
pub use question::{Question, Quiz};
