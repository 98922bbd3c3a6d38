//! モデルモジュール

mod request;
mod response;

pub use request::SearchRequest;
pub use response::{SearchResponse, UsageExampleDto};
