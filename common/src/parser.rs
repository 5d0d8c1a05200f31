//! 分類APIレスポンスパーサー
//!
//! `POST /classify` のJSONボディを検証し、ClassificationResultへ変換する。
//! 最小形（category, monster_image）と拡張形（confidence, monster_name, guide）
//! のどちらも受け付ける。

use crate::error::{Error, Result};
use crate::types::{Category, ClassificationResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

/// 名前の最大文字数
pub const MAX_MONSTER_NAME_CHARS: usize = 10;

/// 分類APIの生レスポンス
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifyResponse {
    pub success: Option<bool>,
    pub category: Option<String>,
    pub confidence: Option<f32>,
    pub monster_name: Option<String>,
    pub monster_image: Option<String>,
    /// 拡張形のガイド。表示はローカルのガイドテーブルを使うため中身は検証しない
    pub guide: Option<serde_json::Value>,
}

/// 分類レスポンスをパースして検証
///
/// ボディ全体が1つのJSONオブジェクトでなければならない（前後の文字列や
/// コードブロックからの抜き出しはしない）。
///
/// # Returns
/// * `Ok(ClassificationResult)` - category が列挙内かつ画像が空でない
/// * `Err(Json)` - JSONとして読めない
/// * `Err(Parse)` - JSONだがオブジェクトでない、または success=false
/// * `Err(InvalidField)` - 項目の型が違う
/// * `Err(MissingField)` - category / monster_image が無いか空
/// * `Err(InvalidCategory)` - category が列挙外
/// * `Err(InvalidImage)` - 画像がBase64として読めない
pub fn parse_classify_response(body: &str) -> Result<ClassificationResult> {
    let value: serde_json::Value = serde_json::from_str(body.trim())?;
    if !value.is_object() {
        return Err(Error::Parse("分類レスポンスがJSONオブジェクトではありません".into()));
    }
    let raw: ClassifyResponse =
        serde_json::from_value(value).map_err(|e| Error::InvalidField(e.to_string()))?;
    validate_response(raw)
}

/// 生レスポンスを検証済み結果へ変換
pub fn validate_response(raw: ClassifyResponse) -> Result<ClassificationResult> {
    if raw.success == Some(false) {
        return Err(Error::Parse("success=false".into()));
    }

    let label = raw
        .category
        .filter(|c| !c.trim().is_empty())
        .ok_or(Error::MissingField("category"))?;
    let category = Category::from_label(&label)?;

    let encoded = raw
        .monster_image
        .filter(|s| !s.trim().is_empty())
        .ok_or(Error::MissingField("monster_image"))?;
    let monster_image = decode_image(&encoded)?;

    let monster_name = raw
        .monster_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Ok(ClassificationResult {
        category,
        monster_image,
        confidence: raw.confidence,
        monster_name,
    })
}

/// Base64文字列またはData URLから画像バイト列を取り出す
pub fn decode_image(encoded: &str) -> Result<Vec<u8>> {
    // data:image/png;base64, 接頭辞を除去
    let data = match encoded.split_once(',') {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };

    let bytes = STANDARD
        .decode(data.trim().as_bytes())
        .map_err(|e| Error::InvalidImage(e.to_string()))?;

    if bytes.is_empty() {
        return Err(Error::InvalidImage("empty image payload".into()));
    }
    Ok(bytes)
}

/// デフォルトの名前（例: "캔몬"）
pub fn default_monster_name(category: Category) -> String {
    format!("{}몬", category.label())
}

/// 名前入力の途中値を上限文字数で切り詰める（入力欄の maxLength 相当）
pub fn clamp_monster_name(name: &str) -> String {
    name.chars().take(MAX_MONSTER_NAME_CHARS).collect()
}

/// 確定する名前を検証
///
/// 前後の空白を除き、空または上限超過はエラー。
pub fn validate_monster_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyName);
    }

    let len = trimmed.chars().count();
    if len > MAX_MONSTER_NAME_CHARS {
        return Err(Error::NameTooLong {
            len,
            max: MAX_MONSTER_NAME_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // "hello" のBase64
    const IMAGE_B64: &str = "aGVsbG8=";

    #[test]
    fn test_parse_minimal_response() {
        let body = format!(r#"{{"category": "캔", "monster_image": "{}"}}"#, IMAGE_B64);
        let result = parse_classify_response(&body).unwrap();
        assert_eq!(result.category, Category::Can);
        assert_eq!(result.monster_image, b"hello");
        assert!(result.confidence.is_none());
        assert!(result.monster_name.is_none());
    }

    #[test]
    fn test_parse_enriched_response() {
        let body = format!(
            r#"{{
                "success": true,
                "category": "플라스틱",
                "confidence": 0.87,
                "monster_name": "  페트몬 ",
                "monster_image": "data:image/png;base64,{}",
                "guide": {{"bin_color": "노란색", "message": "...", "tips": ["a"]}}
            }}"#,
            IMAGE_B64
        );
        let result = parse_classify_response(&body).unwrap();
        assert_eq!(result.category, Category::Plastic);
        assert_eq!(result.monster_image, b"hello");
        assert!(result.confidence.map_or(false, |c| (c - 0.87).abs() < 1e-6));
        assert_eq!(result.monster_name.as_deref(), Some("페트몬"));
    }

    #[test]
    fn test_parse_unknown_category() {
        let body = format!(r#"{{"category": "unknown-thing", "monster_image": "{}"}}"#, IMAGE_B64);
        let err = parse_classify_response(&body).unwrap_err();
        assert!(matches!(err, Error::InvalidCategory(ref c) if c == "unknown-thing"));
    }

    #[test]
    fn test_parse_missing_category() {
        let body = format!(r#"{{"monster_image": "{}"}}"#, IMAGE_B64);
        let err = parse_classify_response(&body).unwrap_err();
        assert!(matches!(err, Error::MissingField("category")));
    }

    #[test]
    fn test_parse_empty_image() {
        let err = parse_classify_response(r#"{"category": "종이", "monster_image": ""}"#).unwrap_err();
        assert!(matches!(err, Error::MissingField("monster_image")));
    }

    #[test]
    fn test_parse_bad_base64() {
        let err = parse_classify_response(r#"{"category": "종이", "monster_image": "!!!"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse_classify_response("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));

        let err = parse_classify_response(r#"{"category": "#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));

        let err = parse_classify_response(r#"["캔"]"#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_wrapped_object() {
        let body = format!(
            r#"<html><body>{{"category": "캔", "monster_image": "{}"}}</body></html>"#,
            IMAGE_B64
        );
        assert!(matches!(parse_classify_response(&body), Err(Error::Json(_))));

        let fenced = format!(
            "```json\n{{\"category\": \"캔\", \"monster_image\": \"{}\"}}\n```\ntrailing",
            IMAGE_B64
        );
        assert!(matches!(parse_classify_response(&fenced), Err(Error::Json(_))));
    }

    #[test]
    fn test_parse_surrounding_whitespace() {
        let body = format!("\n  {{\"category\": \"유리\", \"monster_image\": \"{}\"}}\n", IMAGE_B64);
        assert_eq!(parse_classify_response(&body).unwrap().category, Category::Glass);
    }

    #[test]
    fn test_parse_wrong_field_type() {
        let err = parse_classify_response(r#"{"category": 5, "monster_image": "aGk="}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidField(_)));

        let err = parse_classify_response(r#"{"category": "캔", "monster_image": 42}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidField(_)));
    }

    #[test]
    fn test_parse_success_false() {
        let body = format!(r#"{{"success": false, "category": "캔", "monster_image": "{}"}}"#, IMAGE_B64);
        assert!(matches!(parse_classify_response(&body), Err(Error::Parse(_))));
    }

    #[test]
    fn test_default_monster_name() {
        assert_eq!(default_monster_name(Category::Can), "캔몬");
        assert_eq!(default_monster_name(Category::GeneralWaste), "일반쓰레기몬");
    }

    #[test]
    fn test_validate_monster_name() {
        assert_eq!(validate_monster_name("  Canny ").unwrap(), "Canny");
        assert!(matches!(validate_monster_name("   "), Err(Error::EmptyName)));
        assert!(matches!(
            validate_monster_name("열한글자짜리이름입니다"),
            Err(Error::NameTooLong { len: 11, max: 10 })
        ));
        assert!(validate_monster_name("열글자짜리이름이다").is_ok());
    }

    #[test]
    fn test_clamp_monster_name() {
        assert_eq!(clamp_monster_name("abcdefghijkl"), "abcdefghij");
        assert_eq!(clamp_monster_name("짧은"), "짧은");
    }
}
