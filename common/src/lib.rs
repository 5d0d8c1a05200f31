//! Trashmon Common Library
//!
//! CLIとワークフローで共有される型とユーティリティ（I/Oなし）

pub mod types;
pub mod error;
pub mod guide;
pub mod rank;
pub mod parser;

pub use types::{Category, ClassificationResult, CollectionItem, NewCollectionItem, Rank};
pub use error::{Error, Result};
pub use guide::{guide_for, guide_for_label, tips_for, Guide};
pub use rank::generate_rank;
pub use parser::{
    clamp_monster_name, decode_image, default_monster_name, parse_classify_response,
    validate_monster_name, ClassifyResponse, MAX_MONSTER_NAME_CHARS,
};
