//! 分類サーバー（HTTP）連携
//!
//! `POST {base}/classify` に multipart の `file` フィールドで画像を送る。

use super::{Classifier, ClassifyError};
use crate::capture::CapturedImage;
use crate::error::{Result, TrashmonError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, warn};
use trashmon_common::{parse_classify_response, ClassificationResult};

const UPLOAD_FILE_NAME: &str = "capture.jpg";

pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    /// タイムアウト未指定ならトランスポートの既定値を使う
    pub fn new(base_url: &str, timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TrashmonError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            endpoint: classify_endpoint(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub(crate) fn classify_endpoint(base_url: &str) -> String {
    format!("{}/classify", base_url.trim().trim_end_matches('/'))
}

/// ステータスコードとボディから分類結果を判定
///
/// 非2xxは本文に関係なく `Failed`。2xxでも必須項目の欠落やカテゴリ不一致はエラー。
pub fn interpret_response(status: u16, body: &str) -> std::result::Result<ClassificationResult, ClassifyError> {
    if !(200..300).contains(&status) {
        warn!(status, "classify request failed");
        return Err(ClassifyError::Failed(format!("서버 오류: {}", status)));
    }
    Ok(parse_classify_response(body)?)
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: &CapturedImage) -> std::result::Result<ClassificationResult, ClassifyError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(image.mime_type)
            .map_err(|e| ClassifyError::Failed(e.to_string()))?;
        let form = Form::new().part("file", part);

        debug!(endpoint = %self.endpoint, bytes = image.bytes.len(), "sending classify request");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClassifyError::Failed(format!("네트워크 오류: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassifyError::Failed(format!("응답 읽기 실패: {}", e)))?;

        debug!(%status, len = body.len(), "classify response received");
        interpret_response(status.as_u16(), &body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_endpoint_joins_path() {
        assert_eq!(classify_endpoint("http://localhost:8000"), "http://localhost:8000/classify");
        assert_eq!(classify_endpoint("https://api.example.com/v1/"), "https://api.example.com/v1/classify");
    }

    #[test]
    fn test_new_builds_client() {
        let classifier = HttpClassifier::new("http://localhost:8000/", Some(30)).unwrap();
        assert_eq!(classifier.endpoint(), "http://localhost:8000/classify");
        assert_eq!(classifier.name(), "http");
    }

    #[test]
    fn test_interpret_non_success_status() {
        let body = r#"{"category": "캔", "monster_image": "aGk="}"#;
        assert_eq!(
            interpret_response(500, body).unwrap_err(),
            ClassifyError::Failed("서버 오류: 500".into())
        );
        assert!(matches!(interpret_response(404, ""), Err(ClassifyError::Failed(_))));
    }

    #[test]
    fn test_interpret_success() {
        let result = interpret_response(200, r#"{"category": "캔", "monster_image": "aGk="}"#).unwrap();
        assert_eq!(result.monster_image, b"hi");
    }

    #[test]
    fn test_interpret_malformed_body() {
        assert!(matches!(interpret_response(200, "oops"), Err(ClassifyError::Failed(_))));
        assert!(matches!(
            interpret_response(200, r#"<html> {"category": "캔", "monster_image": "aGk="} </html>"#),
            Err(ClassifyError::Failed(_))
        ));
        assert!(matches!(
            interpret_response(200, r#"{"category": 5, "monster_image": "aGk="}"#),
            Err(ClassifyError::InvalidResponse(_))
        ));
        assert!(matches!(
            interpret_response(200, r#"{"category": "unknown-thing", "monster_image": "aGk="}"#),
            Err(ClassifyError::InvalidCategory(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_failed() {
        // ポート0への接続は必ず失敗する
        let classifier = HttpClassifier::new("http://127.0.0.1:0", Some(5)).unwrap();
        let image = CapturedImage::jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9]);
        let err = classifier.classify(&image).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Failed(_)));
    }
}
