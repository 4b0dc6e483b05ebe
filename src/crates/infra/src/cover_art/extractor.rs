use crate::file_type_detector::MimeTypeDetector;
use application::query::get_cover_art::{EmbeddedArtExtractor, FileNode};
use application::query::QueryError;
use async_trait::async_trait;
use domain::cover_art::EmbeddedPicture;
use id3::frame::{Picture, PictureType};
use id3::Tag;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 内嵌封面提取器实现
///
/// 先解析 ID3v2 标签中的图片帧；没有找到且文件在本地时，可选地用 ffmpeg 提取
/// （适用于 FLAC、M4A 等不带 ID3 的容器）。
pub struct EmbeddedArtExtractorImpl {
    /// ffmpeg 可执行文件路径，None 表示不使用 ffmpeg
    ffmpeg_path: Option<String>,
}

impl EmbeddedArtExtractorImpl {
    pub fn new() -> Self {
        Self { ffmpeg_path: None }
    }

    pub fn with_ffmpeg(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: Some(ffmpeg_path.into()),
        }
    }
}

impl Default for EmbeddedArtExtractorImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddedArtExtractor for EmbeddedArtExtractorImpl {
    async fn extract(&self, node: &dyn FileNode) -> Result<Option<EmbeddedPicture>, QueryError> {
        let content = node.content().await?;
        if let Some(picture) = read_id3_picture(&content) {
            return Ok(Some(picture));
        }

        match (&self.ffmpeg_path, node.local_path()) {
            (Some(ffmpeg), Some(path)) => {
                extract_embedded_cover_ffmpeg(ffmpeg.clone(), path.to_path_buf()).await
            }
            _ => Ok(None),
        }
    }
}

/// 从 ID3v2 标签读取封面，优先使用 front cover
fn read_id3_picture(data: &[u8]) -> Option<EmbeddedPicture> {
    let tag = match Tag::read_from2(Cursor::new(data)) {
        Ok(tag) => tag,
        Err(mut e) => match e.partial_tag.take() {
            Some(tag) => tag,
            None => {
                log::debug!("No usable ID3 tag: {}", e);
                return None;
            }
        },
    };

    let picture = tag
        .pictures()
        .find(|p| p.picture_type == PictureType::CoverFront)
        .or_else(|| tag.pictures().next())?;

    to_embedded_picture(picture)
}

fn to_embedded_picture(picture: &Picture) -> Option<EmbeddedPicture> {
    if picture.data.is_empty() {
        return None;
    }

    // ID3v2.2 只存储 "JPG"/"PNG" 这类格式代码，需要根据数据推断
    let image_mime = if picture.mime_type.contains('/') {
        picture.mime_type.to_lowercase()
    } else {
        MimeTypeDetector::detect_image_from_data(&picture.data)
            .unwrap_or("image/jpeg")
            .to_string()
    };

    Some(EmbeddedPicture {
        image_mime,
        data: picture.data.clone(),
    })
}

/// 使用 ffmpeg 从音频文件中提取嵌入封面
async fn extract_embedded_cover_ffmpeg(
    ffmpeg: String,
    audio_path: PathBuf,
) -> Result<Option<EmbeddedPicture>, QueryError> {
    // 使用 spawn_blocking 因为 Command 是阻塞的
    tokio::task::spawn_blocking(move || {
        // 首先尝试直接复制封面
        let copied = run_ffmpeg(
            &ffmpeg,
            &audio_path,
            &["-an", "-vcodec", "copy", "-f", "image2pipe", "-"],
        )?;
        if let Some(data) = copied {
            return Ok(Some(picture_from_bytes(data)));
        }

        // 如果失败，尝试转码为 JPEG
        let transcoded = run_ffmpeg(
            &ffmpeg,
            &audio_path,
            &["-an", "-c:v", "mjpeg", "-f", "image2pipe", "-vframes", "1", "-"],
        )?;
        Ok(transcoded.map(picture_from_bytes))
    })
    .await
    .map_err(|e| QueryError::ExecutionError(format!("Task join error: {}", e)))?
}

fn run_ffmpeg(ffmpeg: &str, audio_path: &Path, args: &[&str]) -> Result<Option<Vec<u8>>, QueryError> {
    let output = Command::new(ffmpeg)
        .arg("-i")
        .arg(audio_path)
        .args(args)
        .output()
        .map_err(|e| QueryError::ExecutionError(format!("Failed to run ffmpeg: {}", e)))?;

    if output.status.success() && !output.stdout.is_empty() {
        Ok(Some(output.stdout))
    } else {
        log::debug!(
            "ffmpeg found no cover in {}: {}",
            audio_path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
        Ok(None)
    }
}

fn picture_from_bytes(data: Vec<u8>) -> EmbeddedPicture {
    let image_mime = MimeTypeDetector::detect_image_from_data(&data)
        .unwrap_or("image/jpeg")
        .to_string();
    EmbeddedPicture { image_mime, data }
}
