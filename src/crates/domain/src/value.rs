use std::fmt::{self, Display};

// Helper macro to define id newtypes and common trait impls
macro_rules! define_id {
    ($name:ident $(, $extra:ident)*) => {
        #[derive(Debug, Clone, PartialEq $(, $extra)*)]
        pub struct $name(i64);

        impl $name {
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(AlbumId, Eq, Hash);
define_id!(FileId, Eq, Hash);

impl FileId {
    /// 封面来源文件 id 小于等于 0 表示专辑没有配置封面
    pub fn is_configured(&self) -> bool {
        self.0 > 0
    }
}

// 媒体文件统一资源标识符
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaPath {
    pub protocol: String, // 存储协议（如 "local", "smb"）
    pub path: String,
}

impl MediaPath {
    pub fn new(protocol: String, path: String) -> Self {
        Self { protocol, path }
    }

    pub fn local(path: impl Into<String>) -> Self {
        Self {
            protocol: "local".to_string(),
            path: path.into(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.protocol.is_empty() || self.protocol == "local" || self.protocol == "file"
    }
}

impl Display for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileType {
    Audio,
    Image,
    Other,
}

impl FileType {
    /// 根据 MIME 类型判断文件类别，`audio` 前缀视为音频容器
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("audio") {
            FileType::Audio
        } else if mime_type.starts_with("image") {
            FileType::Image
        } else {
            FileType::Other
        }
    }
}

impl From<FileType> for String {
    fn from(value: FileType) -> Self {
        match value {
            FileType::Audio => "audio".to_string(),
            FileType::Image => "image".to_string(),
            FileType::Other => "other".to_string(),
        }
    }
}
