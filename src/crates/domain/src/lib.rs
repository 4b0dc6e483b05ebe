pub mod cover_art;
pub mod value;
