//! 分類結果と図鑑（コレクション）の型定義
//!
//! CLIとワークフローで共有される型:
//! - Category: 分別カテゴリ（固定の列挙）
//! - Rank: レア度 S/A/B/C
//! - ClassificationResult: 分類APIの検証済み結果
//! - CollectionItem: 図鑑に保存されるレコード

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 分別カテゴリ
///
/// 保存・通信上の正規ラベルは韓国語名。英語スラッグも別名として受け付ける。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "종이", alias = "paper")]
    Paper,
    #[serde(rename = "유리", alias = "glass")]
    Glass,
    #[serde(rename = "플라스틱", alias = "plastic")]
    Plastic,
    #[serde(rename = "캔", alias = "can")]
    Can,
    #[serde(rename = "일반쓰레기", alias = "general-waste")]
    GeneralWaste,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Paper,
        Category::Glass,
        Category::Plastic,
        Category::Can,
        Category::GeneralWaste,
    ];

    /// 正規ラベル（韓国語）
    pub fn label(&self) -> &'static str {
        match self {
            Category::Paper => "종이",
            Category::Glass => "유리",
            Category::Plastic => "플라스틱",
            Category::Can => "캔",
            Category::GeneralWaste => "일반쓰레기",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Category::Paper => "paper",
            Category::Glass => "glass",
            Category::Plastic => "plastic",
            Category::Can => "can",
            Category::GeneralWaste => "general-waste",
        }
    }

    /// モンスターの表示色（#RRGGBB）
    pub fn monster_color(&self) -> &'static str {
        match self {
            Category::Paper => "#4A90D9",
            Category::Glass => "#7CB342",
            Category::Plastic => "#FFD54F",
            Category::Can => "#EF5350",
            Category::GeneralWaste => "#78909C",
        }
    }

    /// ラベルまたはスラッグからカテゴリを解決
    ///
    /// 列挙外の値は黙って受け入れず `InvalidCategory` を返す。
    pub fn from_label(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label() == trimmed || c.slug().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::InvalidCategory(label.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

/// レア度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    S,
    A,
    B,
    C,
}

impl Rank {
    pub const ALL: [Rank; 4] = [Rank::S, Rank::A, Rank::B, Rank::C];

    pub fn letter(&self) -> &'static str {
        match self {
            Rank::S => "S",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// 分類APIの検証済み結果
///
/// `category` は列挙内、`monster_image` は空でないことが保証される。
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub category: Category,
    pub monster_image: Vec<u8>,
    /// 拡張レスポンスのみ
    pub confidence: Option<f32>,
    /// 拡張レスポンスのみ
    pub monster_name: Option<String>,
}

/// 図鑑に保存されたレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    pub id: u64,
    pub category: Category,
    pub monster_name: String,
    #[serde(with = "base64_bytes")]
    pub monster_image: Vec<u8>,
    pub rank: Rank,
    pub captured_at: DateTime<Utc>,
}

/// 追加前のレコード（IDはストアが採番する）
#[derive(Debug, Clone, PartialEq)]
pub struct NewCollectionItem {
    pub category: Category,
    pub monster_name: String,
    pub monster_image: Vec<u8>,
    pub rank: Rank,
    pub captured_at: DateTime<Utc>,
}

impl NewCollectionItem {
    pub fn with_id(self, id: u64) -> CollectionItem {
        CollectionItem {
            id,
            category: self.category,
            monster_name: self.monster_name,
            monster_image: self.monster_image,
            rank: self.rank,
            captured_at: self.captured_at,
        }
    }
}

/// 画像バイト列をBase64文字列としてシリアライズ
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}
