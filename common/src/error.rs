//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Monster name is empty")]
    EmptyName,

    #[error("Monster name too long: {len} chars (max {max})")]
    NameTooLong { len: usize, max: usize },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
