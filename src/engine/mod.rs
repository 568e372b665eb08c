pub mod filter;
pub mod generation;
pub mod sets;
pub mod tag;
pub mod units;
pub mod upload;

pub use tag::{CancelToken, RequestTag, TagIssuer};
