//! # rk-protocol
//!
//! Core protocol definitions and data models for reel-kit.
//!
//! This crate defines all shared data structures used for:
//! - Workflow inputs and per-step outcome tracking
//! - Publish container lifecycle state
//! - Caption/prompt generation options
//! - Progress events emitted during workflow execution
//!
//! ## Modules
//!
//! - [`workflow_models`]: Workflow configuration, step outcomes, and results
//! - [`publish_models`]: Publish container state and creation outcomes
//! - [`caption_models`]: Caption generation options
//! - [`events`]: Progress events for Core-consumer communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, uuid, and chrono
//! - Independent compilation: No dependencies on other reel-kit crates

pub mod caption_models;
pub mod events;
pub mod publish_models;
pub mod workflow_models;

// Re-export all public types for convenience
pub use caption_models::*;
pub use events::*;
pub use publish_models::*;
pub use workflow_models::*;
