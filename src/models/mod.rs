pub mod capture;
pub mod tool;

pub use capture::{CaptureRecord, CaptureType, Category, Stats};
pub use tool::AiTool;
