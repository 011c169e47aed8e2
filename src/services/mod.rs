pub mod distractor_pool;
pub mod grader;
pub mod llm_service;
pub mod mcq_builder;
pub mod question_bank;
pub mod quiz_assembler;
pub mod stem_enhancer;

pub use distractor_pool::DistractorPool;
pub use grader::{grade, pass_threshold, CategoryScore, Grade};
pub use llm_service::LlmService;
pub use mcq_builder::{default_stem, McqBuilder, McqBundle, McqInput};
pub use question_bank::{convert_raw, BankStatus, QuestionBank};
pub use quiz_assembler::{assemble_quiz, assemble_quiz_with_id, MAX_QUIZ_QUESTIONS};
pub use stem_enhancer::{LlmStemEnhancer, NoopStemEnhancer, StemEnhancer};
