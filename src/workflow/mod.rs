pub mod quiz_flow;
pub mod quiz_request;

pub use quiz_flow::{QuizFlow, QuizOrigin, QuizOutcome};
pub use quiz_request::QuizRequest;
