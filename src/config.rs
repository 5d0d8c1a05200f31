use crate::error::{Result, TrashmonError};
use crate::workflow::GuideOrder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 分類APIのベースURLを上書きする環境変数
pub const API_URL_ENV: &str = "TRASHMON_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// 画面上に見えている領域のサイズ（切り抜きのアスペクト比に使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    /// 図鑑の保存先（未指定なら OS のデータディレクトリ）
    pub data_dir: Option<PathBuf>,
    /// オフライン/デモモード。ネットワーク失敗時のフォールバックではない
    pub demo_mode: bool,
    pub guide_order: GuideOrder,
    pub viewport: Option<Viewport>,
    pub max_image_size: u32,
    /// 未指定ならトランスポート既定値
    pub timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            data_dir: None,
            demo_mode: false,
            guide_order: GuideOrder::default(),
            viewport: None,
            max_image_size: 1920,
            timeout_seconds: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TrashmonError::Config("홈 디렉터리를 찾을 수 없어요".into()))?;
        Ok(home.join(".config").join("trashmon").join("config.json"))
    }

    /// 図鑑ファイルを置くディレクトリ
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join("trashmon"))
            .ok_or_else(|| TrashmonError::Config("데이터 디렉터리를 찾을 수 없어요".into()))
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        let trimmed = url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(TrashmonError::Config(format!("잘못된 주소예요: {}", url)));
        }
        self.api_url = trimmed.to_string();
        Ok(())
    }

    /// 実際に使う分類APIのベースURL（環境変数を優先）
    pub fn effective_api_url(&self) -> String {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => self.api_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert!(!config.demo_mode);
        assert_eq!(config.guide_order, GuideOrder::GuideFirst);
        assert!(config.timeout_seconds.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            demo_mode: true,
            guide_order: GuideOrder::NameFirst,
            viewport: Some(Viewport { width: 9, height: 16 }),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.demo_mode);
        assert_eq!(loaded.guide_order, GuideOrder::NameFirst);
        assert_eq!(loaded.viewport, Some(Viewport { width: 9, height: 16 }));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"demo_mode": true}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.demo_mode);
        assert_eq!(loaded.max_image_size, 1920);
    }

    #[test]
    fn test_set_api_url_validates_scheme() {
        let mut config = Config::default();
        config.set_api_url("https://api.example.com/".into()).unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert!(config.set_api_url("ftp://nope".into()).is_err());
    }

    #[test]
    fn test_effective_api_url_env_override() {
        let config = Config {
            api_url: "http://config.example.com".into(),
            ..Default::default()
        };

        std::env::set_var(API_URL_ENV, " https://env.example.com/ ");
        assert_eq!(config.effective_api_url(), "https://env.example.com");

        // 空文字は未設定と同じ
        std::env::set_var(API_URL_ENV, "  ");
        assert_eq!(config.effective_api_url(), "http://config.example.com");

        std::env::remove_var(API_URL_ENV);
        assert_eq!(config.effective_api_url(), "http://config.example.com");
    }

    #[test]
    fn test_data_dir_override() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/trashmon-test")),
            ..Default::default()
        };
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/trashmon-test"));
    }
}
