pub mod format;
pub mod kde;
pub mod text;
pub mod time;
