//! オフライン/デモモード
//!
//! 明示的に有効化したときだけ使う分類器。ランダムなカテゴリを選び、
//! カテゴリ色で塗った仮のモンスター画像（PNG）を返す。
//! 通信失敗時の代替としては使わない。

use super::{Classifier, ClassifyError};
use crate::capture::CapturedImage;
use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgba};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;
use std::sync::Mutex;
use trashmon_common::{Category, ClassificationResult};

const PLACEHOLDER_SIZE: u32 = 64;

pub struct DemoClassifier {
    rng: Mutex<StdRng>,
}

impl DemoClassifier {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick_category(&self) -> Category {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Category::ALL[rng.gen_range(0..Category::ALL.len())]
    }
}

impl Default for DemoClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// "#RRGGBB" を RGB に変換
fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// カテゴリ色の丸いプレースホルダー画像
pub(crate) fn placeholder_monster(category: Category) -> Result<Vec<u8>, ClassifyError> {
    let [r, g, b] = parse_hex_color(category.monster_color()).unwrap_or([0x78, 0x90, 0x9C]);
    let radius = PLACEHOLDER_SIZE as f32 / 2.0;

    let img = ImageBuffer::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        if dx * dx + dy * dy <= radius * radius {
            Rgba([r, g, b, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ClassifyError::Failed(format!("데모 이미지 생성 실패: {}", e)))?;
    Ok(buffer.into_inner())
}

#[async_trait]
impl Classifier for DemoClassifier {
    async fn classify(&self, _image: &CapturedImage) -> Result<ClassificationResult, ClassifyError> {
        let category = self.pick_category();
        Ok(ClassificationResult {
            category,
            monster_image: placeholder_monster(category)?,
            confidence: None,
            monster_name: None,
        })
    }

    fn name(&self) -> &str {
        "demo"
    }
}
