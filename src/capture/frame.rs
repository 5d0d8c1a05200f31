//! フレーム加工
//!
//! センサー解像度と画面に見えている領域のアスペクト比が違う場合、
//! 画面外の部分を写さないよう中央で切り抜く（object-fit: cover 相当）。

use super::DeviceError;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use sha2::{Digest, Sha256};

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 表示領域に見えている部分の矩形を求める
///
/// 表示側の方が横長なら上下を、縦長なら左右を削る。
pub fn visible_crop(src_w: u32, src_h: u32, view_w: u32, view_h: u32) -> CropRect {
    let full = CropRect {
        x: 0,
        y: 0,
        width: src_w,
        height: src_h,
    };
    if src_w == 0 || src_h == 0 || view_w == 0 || view_h == 0 {
        return full;
    }

    // src_w/src_h と view_w/view_h を整数で比較
    let src_ratio = src_w as u64 * view_h as u64;
    let view_ratio = view_w as u64 * src_h as u64;

    if src_ratio > view_ratio {
        // 元画像の方が横長 → 左右を削る
        let width = ((src_h as u64 * view_w as u64) / view_h as u64).max(1) as u32;
        CropRect {
            x: (src_w - width) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else if src_ratio < view_ratio {
        // 元画像の方が縦長 → 上下を削る
        let height = ((src_w as u64 * view_h as u64) / view_w as u64).max(1) as u32;
        CropRect {
            x: 0,
            y: (src_h - height) / 2,
            width: src_w,
            height,
        }
    } else {
        full
    }
}

/// 切り抜き・縮小・JPEGエンコード
pub fn encode_frame(
    img: DynamicImage,
    viewport: Option<(u32, u32)>,
    max_edge: u32,
) -> Result<Vec<u8>, DeviceError> {
    let img = match viewport {
        Some((vw, vh)) => {
            let rect = visible_crop(img.width(), img.height(), vw, vh);
            img.crop_imm(rect.x, rect.y, rect.width, rect.height)
        }
        None => img,
    };

    let img = if max_edge > 0 && (img.width() > max_edge || img.height() > max_edge) {
        img.resize(max_edge, max_edge, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    // JPEGはアルファを持てない
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| DeviceError::CaptureFailed(format!("JPEG 인코딩 실패: {}", e)))?;
    Ok(buffer)
}

/// SHA-256 の先頭16桁
pub fn image_digest(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    hex::encode(&hash[..8])
}
