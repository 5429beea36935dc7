pub mod file;
pub mod slide;
