use std::path::Path;

/// 无法识别时使用的 MIME 类型
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// 根据扩展名或文件头识别 MIME 类型
pub struct MimeTypeDetector;

impl MimeTypeDetector {
    /// 根据文件扩展名猜测 MIME 类型
    pub fn detect_from_path(path: &Path) -> String {
        mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string()
    }

    /// 根据图片数据猜测 MIME 类型（magic number）
    pub fn detect_image_from_data(data: &[u8]) -> Option<&'static str> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some("image/jpeg")
        } else if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some("image/png")
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some("image/gif")
        } else if data.starts_with(b"RIFF") && data.len() > 12 && &data[8..12] == b"WEBP" {
            Some("image/webp")
        } else if data.starts_with(&[0x42, 0x4D]) {
            Some("image/bmp")
        } else {
            None
        }
    }
}
