pub mod album;
pub mod file;

pub use album::AlbumCoverDaoImpl;
pub use file::FilePathDaoImpl;
