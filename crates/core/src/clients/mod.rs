//! Client abstraction and provider adapters.
//!
//! This module provides the capability traits (Adapter Pattern) for every
//! external collaborator and the [`ClientSet`] bundle used to inject them
//! into the engine.

pub mod adapters;
pub mod base;
pub mod set;

pub use base::{
    AspectRatio, CaptionGenerator, CaptionSource, ClientError, MediaTransform, Notifier,
    PromptGenerator, PublishPlatform, VideoGenerator,
};
pub use set::ClientSet;
