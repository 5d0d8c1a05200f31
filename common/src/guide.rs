//! 分別ガイドテーブル
//!
//! カテゴリごとの分別方法（捨てる箱の色・メッセージ・ティップ列）。
//! 状態を持たない純粋なルックアップ。

use crate::error::Result;
use crate::types::Category;

/// 分別ガイド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guide {
    pub category: Category,
    /// 分別ボックスの色
    pub bin_color: &'static str,
    pub message: &'static str,
    /// 1件ずつ順番に表示するティップ（空にはならない）
    pub tips: &'static [&'static str],
}

static GUIDES: [Guide; 5] = [
    Guide {
        category: Category::Paper,
        bin_color: "파란색",
        message: "종이는 파란색 통에 쏙!",
        tips: &[
            "물에 젖지 않게 해요.",
            "테이프와 스테이플러 심은 떼고 버려요.",
            "상자는 납작하게 펴서 묶어요.",
        ],
    },
    Guide {
        category: Category::Glass,
        bin_color: "초록색",
        message: "유리병은 초록색 통에 쏙!",
        tips: &[
            "뚜껑을 떼요.",
            "안을 한번 헹궈서 버려요.",
            "깨진 유리는 신문지에 싸서 일반쓰레기로 버려요.",
        ],
    },
    Guide {
        category: Category::Plastic,
        bin_color: "노란색",
        message: "플라스틱은 노란색 통에 쏙!",
        tips: &[
            "라벨을 떼요.",
            "깨끗이 씻어서 버려요.",
            "페트병은 찌그러뜨려서 뚜껑을 닫아요.",
        ],
    },
    Guide {
        category: Category::Can,
        bin_color: "빨간색",
        message: "캔은 빨간색 통에 쏙!",
        tips: &[
            "안에 남은 음료를 비워요.",
            "납작하게 밟아서, 조심해서 버려요.",
        ],
    },
    Guide {
        category: Category::GeneralWaste,
        bin_color: "검은색",
        message: "일반쓰레기는 아무 통에나!",
        tips: &[
            "재활용이 어려운 친구들이에요.",
            "종량제 봉투에 담아서 버려요.",
        ],
    },
];

/// カテゴリのガイドを取得（全カテゴリで定義済み）
pub fn guide_for(category: Category) -> &'static Guide {
    GUIDES
        .iter()
        .find(|g| g.category == category)
        .unwrap_or(&GUIDES[GUIDES.len() - 1])
}

pub fn tips_for(category: Category) -> &'static [&'static str] {
    guide_for(category).tips
}

/// ラベルからガイドを取得
///
/// 未知のラベルはデフォルトのティップにフォールバックせず `InvalidCategory` とする。
pub fn guide_for_label(label: &str) -> Result<&'static Guide> {
    let category = Category::from_label(label)?;
    Ok(guide_for(category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_every_category_has_a_guide() {
        for category in Category::ALL {
            let guide = guide_for(category);
            assert_eq!(guide.category, category);
            assert!(!guide.tips.is_empty(), "{} のティップが空", category);
        }
    }

    #[test]
    fn test_guide_for_can() {
        let guide = guide_for(Category::Can);
        assert_eq!(guide.bin_color, "빨간색");
        assert_eq!(tips_for(Category::Can).len(), 2);
    }

    #[test]
    fn test_guide_for_label_unknown_is_error() {
        let err = guide_for_label("unknown-thing").unwrap_err();
        assert!(matches!(err, Error::InvalidCategory(_)));
    }

    #[test]
    fn test_guide_for_label_slug() {
        let guide = guide_for_label("glass").unwrap();
        assert_eq!(guide.category, Category::Glass);
    }
}
