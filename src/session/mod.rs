pub mod responses;

pub use responses::{AnswerError, OptionMark, Response, ResponseState, Score, Verdict};
