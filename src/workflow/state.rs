//! ワークフローの状態

use crate::capture::DeviceError;
use crate::classifier::ClassifyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use trashmon_common::{ClassificationResult, Rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Idle,
    Loading,
    Intro,
    Guide,
    Naming,
    Complete,
    Error,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Idle => "idle",
            Step::Loading => "loading",
            Step::Intro => "intro",
            Step::Guide => "guide",
            Step::Naming => "naming",
            Step::Complete => "complete",
            Step::Error => "error",
        };
        f.write_str(name)
    }
}

/// 名前入力とガイドの順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuideOrder {
    /// loading → intro → guide → naming → complete
    #[default]
    GuideFirst,
    /// loading → naming → guide → complete
    NameFirst,
}

/// セッション中の失敗
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Device(DeviceError),
    /// 通信失敗・非2xx
    Transport(String),
    /// 応答は届いたが必須項目の欠落やカテゴリ不一致
    InvalidResponse(String),
    /// 図鑑への保存失敗
    Persistence(String),
}

impl SessionError {
    /// 子ども向けの表示メッセージ
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::Device(_) => "카메라를 켤 수 없어요. 권한을 허용했는지 확인해주세요!",
            SessionError::Transport(_) => "몬스터를 찾는 데 실패했어요. 서버에 문제가 있나봐요!",
            SessionError::InvalidResponse(_) => "이게 뭔지 잘 모르겠어요. 다른 각도로 찍어볼까요?",
            SessionError::Persistence(_) => "도감에 저장하지 못했어요. 다시 눌러주세요!",
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Device(e) => write!(f, "device: {}", e),
            SessionError::Transport(msg) => write!(f, "transport: {}", msg),
            SessionError::InvalidResponse(msg) => write!(f, "invalid response: {}", msg),
            SessionError::Persistence(msg) => write!(f, "persistence: {}", msg),
        }
    }
}

impl From<ClassifyError> for SessionError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Failed(msg) => SessionError::Transport(msg),
            ClassifyError::InvalidCategory(_) | ClassifyError::InvalidResponse(_) => {
                SessionError::InvalidResponse(err.to_string())
            }
        }
    }
}

/// 1回の撮影セッションの一時状態
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowState {
    pub step: Step,
    /// 最後に撮影した画像のダイジェスト
    pub captured_image_handle: Option<String>,
    pub pending_result: Option<ClassificationResult>,
    pub draft_name: String,
    pub draft_rank: Option<Rank>,
    pub tip_cursor: usize,
    pub last_error: Option<SessionError>,
    /// 名前確定済み（NameFirst でガイド後に保存する場合）
    pub name_confirmed: bool,
    pub committed_id: Option<u64>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            step: Step::Idle,
            captured_image_handle: None,
            pending_result: None,
            draft_name: String::new(),
            draft_rank: None,
            tip_cursor: 0,
            last_error: None,
            name_confirmed: false,
            committed_id: None,
        }
    }
}

impl WorkflowState {
    /// セッション間で何も持ち越さないよう全項目を初期化
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
