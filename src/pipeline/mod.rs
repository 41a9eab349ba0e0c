// src/pipeline/mod.rs

pub mod event_log;
pub mod frame_context;
pub mod metrics;
pub mod session;

pub use event_log::EventLog;
pub use frame_context::FrameContext;
pub use metrics::{MetricsSummary, SessionMetrics};
pub use session::GameSession;
