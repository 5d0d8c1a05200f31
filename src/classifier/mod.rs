//! 分類クライアント
//!
//! 撮影画像を分類サーバーへ送り、カテゴリとモンスター画像を受け取る。
//! 自動リトライはしない（再試行はユーザーの再撮影）。

mod demo;
mod http;

pub use demo::DemoClassifier;
pub use http::{interpret_response, HttpClassifier};

use crate::capture::CapturedImage;
use async_trait::async_trait;
use thiserror::Error;
use trashmon_common::ClassificationResult;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// 通信失敗・非2xx・JSONとして読めないボディ
    #[error("분류 요청 실패: {0}")]
    Failed(String),

    /// category が無いか列挙外
    #[error("알 수 없는 분류예요: {0}")]
    InvalidCategory(String),

    /// 必須フィールドの欠落・画像の破損
    #[error("분류 응답이 올바르지 않아요: {0}")]
    InvalidResponse(String),
}

impl From<trashmon_common::Error> for ClassifyError {
    fn from(err: trashmon_common::Error) -> Self {
        use trashmon_common::Error as E;
        match err {
            E::InvalidCategory(label) => ClassifyError::InvalidCategory(label),
            E::MissingField("category") => ClassifyError::InvalidCategory("<missing>".into()),
            E::MissingField(_) | E::InvalidField(_) | E::InvalidImage(_) => {
                ClassifyError::InvalidResponse(err.to_string())
            }
            other => ClassifyError::Failed(other.to_string()),
        }
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &CapturedImage) -> Result<ClassificationResult, ClassifyError>;

    /// ログ用の名前
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use trashmon_common::parse_classify_response;

    #[test]
    fn test_error_mapping_from_parser() {
        let err: ClassifyError = parse_classify_response("not json").unwrap_err().into();
        assert!(matches!(err, ClassifyError::Failed(_)));

        let err: ClassifyError =
            parse_classify_response(r#"{"category": "unknown-thing", "monster_image": "aGk="}"#)
                .unwrap_err()
                .into();
        assert_eq!(err, ClassifyError::InvalidCategory("unknown-thing".into()));

        let err: ClassifyError = parse_classify_response(r#"{"monster_image": "aGk="}"#)
            .unwrap_err()
            .into();
        assert!(matches!(err, ClassifyError::InvalidCategory(_)));

        let err: ClassifyError = parse_classify_response(r#"{"category": 5, "monster_image": "aGk="}"#)
            .unwrap_err()
            .into();
        assert!(matches!(err, ClassifyError::InvalidResponse(_)));

        let err: ClassifyError = parse_classify_response(r#"{"category": "캔"}"#)
            .unwrap_err()
            .into();
        assert!(matches!(err, ClassifyError::InvalidResponse(_)));
    }
}
