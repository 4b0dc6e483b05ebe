use crate::value::AlbumId;
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use thiserror::Error;

/// 缓存值中 MIME 类型与内容之间的分隔符（base64 字母表不含该字符）
pub const COVER_VALUE_DELIMITER: char = '|';

/// 用户聚合视图的缓存键，封面缓存写入后需要失效
pub const COLLECTION_CACHE_KEY: &str = "collection";

/// 专辑封面的缓存键：`cover_{album_id}`
pub fn cover_cache_key(album_id: &AlbumId) -> String {
    format!("cover_{}", album_id)
}

// 错误类型
#[derive(Error, Debug, PartialEq)]
pub enum CoverArtError {
    #[error("Cached cover value has no delimiter")]
    MissingDelimiter,
    #[error("Cached cover value has an empty mime type")]
    EmptyMimeType,
    #[error("Cached cover value has empty content")]
    EmptyContent,
    #[error("Invalid base64 content: {message}")]
    InvalidEncoding { message: String },
}

/// 封面图片：MIME 类型和内容都非空
#[derive(Debug, Clone, PartialEq)]
pub struct CoverImage {
    mime_type: String,
    content: Bytes,
}

impl CoverImage {
    /// MIME 类型或内容为空时返回 None（视为没有封面）
    ///
    /// MIME 类型中出现分隔符时同样返回 None，否则缓存值无法按第一个分隔符还原
    pub fn new(mime_type: impl Into<String>, content: impl Into<Bytes>) -> Option<Self> {
        let mime_type = mime_type.into();
        let content = content.into();
        if mime_type.is_empty() || mime_type.contains(COVER_VALUE_DELIMITER) || content.is_empty() {
            return None;
        }
        Some(Self { mime_type, content })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn into_parts(self) -> (String, Bytes) {
        (self.mime_type, self.content)
    }

    /// 编码为缓存值：`<mime>|<base64(content)>`
    pub fn to_cache_value(&self) -> String {
        format!(
            "{}{}{}",
            self.mime_type,
            COVER_VALUE_DELIMITER,
            STANDARD.encode(&self.content)
        )
    }

    /// 从缓存值解码，按第一个分隔符切分
    pub fn from_cache_value(value: &str) -> Result<Self, CoverArtError> {
        let encoded = EncodedCover::from_cache_value(value)?;
        encoded.decode()
    }
}

/// 音频容器中提取出的内嵌封面（提取器的原始输出形态）
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedPicture {
    pub image_mime: String,
    pub data: Vec<u8>,
}

/// 写入缓存时接受的两种封面数据形态
#[derive(Debug, Clone, PartialEq)]
pub enum CoverPayload {
    /// `{mimetype, content}`
    Normalized { mimetype: String, content: Bytes },
    /// `{image_mime, data}`
    Embedded(EmbeddedPicture),
}

impl CoverPayload {
    /// 归一化为 CoverImage，字段为空时返回 None
    pub fn into_cover_image(self) -> Option<CoverImage> {
        match self {
            CoverPayload::Normalized { mimetype, content } => CoverImage::new(mimetype, content),
            CoverPayload::Embedded(picture) => CoverImage::new(picture.image_mime, picture.data),
        }
    }
}

impl From<CoverImage> for CoverPayload {
    fn from(cover: CoverImage) -> Self {
        let (mimetype, content) = cover.into_parts();
        CoverPayload::Normalized { mimetype, content }
    }
}

impl From<EmbeddedPicture> for CoverPayload {
    fn from(picture: EmbeddedPicture) -> Self {
        CoverPayload::Embedded(picture)
    }
}

/// 未解码的缓存封面，内容仍为 base64 文本，可直接透传给传输层
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedCover {
    pub mime_type: String,
    pub content: String,
}

impl EncodedCover {
    pub fn from_cache_value(value: &str) -> Result<Self, CoverArtError> {
        let (mime_type, content) = value
            .split_once(COVER_VALUE_DELIMITER)
            .ok_or(CoverArtError::MissingDelimiter)?;
        if mime_type.is_empty() {
            return Err(CoverArtError::EmptyMimeType);
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            content: content.to_string(),
        })
    }

    pub fn decode(self) -> Result<CoverImage, CoverArtError> {
        let content = STANDARD
            .decode(self.content.as_bytes())
            .map_err(|e| CoverArtError::InvalidEncoding {
                message: e.to_string(),
            })?;
        CoverImage::new(self.mime_type, content).ok_or(CoverArtError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_image_rejects_empty_fields() {
        assert!(CoverImage::new("", vec![1, 2, 3]).is_none());
        assert!(CoverImage::new("image/png", Vec::new()).is_none());
        assert!(CoverImage::new("image/png", vec![1]).is_some());
    }

    #[test]
    fn test_cover_image_rejects_delimiter_in_mime() {
        assert!(CoverImage::new("image/png|x", vec![1, 2, 3]).is_none());

        let embedded = CoverPayload::from(EmbeddedPicture {
            image_mime: "image|jpeg".to_string(),
            data: vec![0xFF, 0xD8],
        });
        assert!(embedded.into_cover_image().is_none());
    }

    #[test]
    fn test_cache_value_round_trip() {
        let payloads: [&[u8]; 3] = [b"\x89PNG\r\n\x1a\n", b"|||", &[0u8, 255, 124, 10, 13]];
        for payload in payloads {
            let cover = CoverImage::new("image/png", payload.to_vec()).unwrap();
            let value = cover.to_cache_value();
            assert_eq!(CoverImage::from_cache_value(&value).unwrap(), cover);
        }
    }

    #[test]
    fn test_cache_value_format() {
        let cover = CoverImage::new("image/png", b"abc".to_vec()).unwrap();
        assert_eq!(cover.to_cache_value(), "image/png|YWJj");
    }

    #[test]
    fn test_split_on_first_delimiter() {
        // mime 之后的所有内容都属于编码后的 content
        let encoded = EncodedCover::from_cache_value("image/jpeg|YWJj|x").unwrap();
        assert_eq!(encoded.mime_type, "image/jpeg");
        assert_eq!(encoded.content, "YWJj|x");
        assert!(matches!(
            encoded.decode(),
            Err(CoverArtError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn test_malformed_cache_values() {
        assert_eq!(
            EncodedCover::from_cache_value("image/png").unwrap_err(),
            CoverArtError::MissingDelimiter
        );
        assert_eq!(
            EncodedCover::from_cache_value("|YWJj").unwrap_err(),
            CoverArtError::EmptyMimeType
        );
        assert_eq!(
            CoverImage::from_cache_value("image/png|").unwrap_err(),
            CoverArtError::EmptyContent
        );
    }

    #[test]
    fn test_payload_normalization() {
        let embedded = CoverPayload::from(EmbeddedPicture {
            image_mime: "image/jpeg".to_string(),
            data: vec![0xFF, 0xD8, 0xFF],
        });
        let cover = embedded.into_cover_image().unwrap();
        assert_eq!(cover.mime_type(), "image/jpeg");
        assert_eq!(&cover.content()[..], &[0xFF, 0xD8, 0xFF]);

        let empty_mime = CoverPayload::Normalized {
            mimetype: String::new(),
            content: Bytes::from_static(b"data"),
        };
        assert!(empty_mime.into_cover_image().is_none());

        let empty_data = CoverPayload::Embedded(EmbeddedPicture {
            image_mime: "image/png".to_string(),
            data: Vec::new(),
        });
        assert!(empty_data.into_cover_image().is_none());
    }

    #[test]
    fn test_cover_cache_key() {
        assert_eq!(cover_cache_key(&AlbumId::from(7)), "cover_7");
    }
}
