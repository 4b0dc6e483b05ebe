pub mod local;

pub use local::{LocalFileNode, LocalFileResolver};
