//! Input processing module
//! Handles file detection and text reading for CV files

pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use file_detector::FileType;
pub use manager::InputManager;
