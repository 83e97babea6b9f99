//! Report pipeline orchestration
//!
//! This module ties the pipeline together:
//! - Deterministic report identity and conflict detection
//! - Job tracking with per-stage failure notes
//! - Event hooks fired around every stage
//! - The orchestrator driving generation and submission

pub mod events;
pub mod identity;
pub mod orchestrator;
pub mod tracker;

pub use events::{EventHook, EventRegistry, HookResult, LoggingHook, PipelineEvent};
pub use orchestrator::{GenerationSummary, ReportPipeline, SendSummary};
pub use tracker::JobTracker;
