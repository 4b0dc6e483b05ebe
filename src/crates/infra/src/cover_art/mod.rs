pub mod cache;
pub mod extractor;

pub use cache::SledKeyValueCache;
pub use extractor::EmbeddedArtExtractorImpl;
