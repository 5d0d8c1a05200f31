//! カメラ（画像キャプチャ）アダプタ
//!
//! start / capture_frame / stop の3操作だけを持つ外部デバイスの契約。
//! 失敗はすべて `DeviceError` で返し、ワークフロー側で「再試行」可能な状態として扱う。

mod folder;
mod frame;

pub use folder::FolderCamera;
pub use frame::{encode_frame, image_digest, visible_crop, CropRect};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("카메라를 찾을 수 없어요: {0}")]
    DeviceUnavailable(String),

    #[error("카메라를 켤 수 없어요. 권한을 허용했는지 확인해주세요! ({0})")]
    PermissionDenied(String),

    #[error("다른 프로그램이 카메라를 사용 중이에요: {0}")]
    DeviceBusy(String),

    #[error("카메라가 켜져 있지 않아요")]
    NotStarted,

    #[error("사진을 찍지 못했어요: {0}")]
    CaptureFailed(String),
}

/// 撮影した静止画（エンコード済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    /// 内容ハッシュの短縮形。背景表示・再撮影時のハンドルとして使う
    pub digest: String,
}

impl CapturedImage {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        let digest = image_digest(&bytes);
        Self {
            bytes,
            mime_type: "image/jpeg",
            digest,
        }
    }
}

pub trait CaptureDevice {
    /// デバイスを確保してフィードを開始
    fn start(&mut self) -> Result<(), DeviceError>;

    /// 現在のフィードを静止画として切り出す
    fn capture_frame(&mut self) -> Result<CapturedImage, DeviceError>;

    /// デバイスを解放する。何度呼んでもよい
    fn stop(&mut self) -> Result<(), DeviceError>;

    fn is_running(&self) -> bool;
}
