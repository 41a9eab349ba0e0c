// src/detection/mod.rs

pub mod adapter;
pub mod source;

pub use adapter::{DetectionAdapter, RawBox, RawFrame};
pub use source::{find_detection_files, DetectionLog, FrameSource, InMemorySource};
