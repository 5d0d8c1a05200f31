//! ファイルシステムをフィードとするカメラ
//!
//! フィードは静止画ファイル1枚、またはディレクトリ（最新の画像が「現在のフレーム」）。
//! デバイスの占有はロックファイルで表現する。

use super::frame::encode_frame;
use super::{CaptureDevice, CapturedImage, DeviceError};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const LOCK_FILE_NAME: &str = ".trashmon-camera.lock";
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

#[derive(Debug)]
pub struct FolderCamera {
    source: PathBuf,
    viewport: Option<(u32, u32)>,
    max_edge: u32,
    lock_path: Option<PathBuf>,
}

impl FolderCamera {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            viewport: None,
            max_edge: 0,
            lock_path: None,
        }
    }

    /// 画面に見えている領域（幅, 高さ）を指定
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Some((width, height));
        self
    }

    pub fn with_max_edge(mut self, max_edge: u32) -> Self {
        self.max_edge = max_edge;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    fn lock_dir(&self) -> PathBuf {
        if self.source.is_dir() {
            self.source.clone()
        } else {
            self.source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        }
    }

    /// 現在のフレームとなるファイル
    fn current_frame_path(&self) -> Result<PathBuf, DeviceError> {
        if self.source.is_file() {
            return Ok(self.source.clone());
        }

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in WalkDir::new(&self.source)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_image_file(path) {
                continue;
            }
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);

            // 同時刻ならファイル名の大きい方
            let replace = match &newest {
                Some((t, p)) => modified > *t || (modified == *t && path > p.as_path()),
                None => true,
            };
            if replace {
                newest = Some((modified, path.to_path_buf()));
            }
        }

        newest
            .map(|(_, p)| p)
            .ok_or_else(|| DeviceError::CaptureFailed(format!("프레임이 없어요: {}", self.source.display())))
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext_str = ext.to_string_lossy();
            IMAGE_EXTENSIONS.iter().any(|&e| e == ext_str)
        })
        .unwrap_or(false)
}

impl CaptureDevice for FolderCamera {
    fn start(&mut self) -> Result<(), DeviceError> {
        if self.lock_path.is_some() {
            return Ok(());
        }

        let source_display = self.source.display().to_string();
        if !self.source.exists() {
            return Err(DeviceError::DeviceUnavailable(source_display));
        }

        // 読み取り権限の確認
        let readable = if self.source.is_dir() {
            std::fs::read_dir(&self.source).map(|_| ())
        } else {
            std::fs::File::open(&self.source).map(|_| ())
        };
        if let Err(e) = readable {
            return Err(match e.kind() {
                ErrorKind::PermissionDenied => DeviceError::PermissionDenied(source_display),
                _ => DeviceError::DeviceUnavailable(format!("{}: {}", source_display, e)),
            });
        }

        let lock_path = self.lock_dir().join(LOCK_FILE_NAME);
        match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(DeviceError::DeviceBusy(lock_path.display().to_string()));
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(DeviceError::PermissionDenied(lock_path.display().to_string()));
            }
            Err(e) => return Err(DeviceError::DeviceUnavailable(e.to_string())),
        }

        info!(source = %source_display, "camera started");
        self.lock_path = Some(lock_path);
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<CapturedImage, DeviceError> {
        if self.lock_path.is_none() {
            return Err(DeviceError::NotStarted);
        }

        let frame_path = self.current_frame_path()?;
        debug!(frame = %frame_path.display(), "capturing frame");

        let img = image::open(&frame_path)
            .map_err(|e| DeviceError::CaptureFailed(format!("{}: {}", frame_path.display(), e)))?;
        let bytes = encode_frame(img, self.viewport, self.max_edge)?;
        Ok(CapturedImage::jpeg(bytes))
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        let Some(lock_path) = self.lock_path.take() else {
            return Ok(());
        };

        match std::fs::remove_file(&lock_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(lock = %lock_path.display(), "camera lock already removed");
            }
            Err(e) => return Err(DeviceError::CaptureFailed(format!("잠금 해제 실패: {}", e))),
        }
        info!("camera stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.lock_path.is_some()
    }
}

impl Drop for FolderCamera {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("failed to release camera on drop: {}", e);
        }
    }
}
