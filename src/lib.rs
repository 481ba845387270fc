//! Batch image generation against a local Draw Things server.
//!
//! Prompts come from a fixed list, numbered seed images or PowerPoint
//! slides (described by a local LM Studio model). Each item goes through a
//! text-to-image pass, an img2img refinement, or both, strictly one item at
//! a time.

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod services;

pub use config::{
    GenerationSettings, LanguageModelConfig, OutputNaming, PipelineConfig, PipelineMode,
};
pub use error::{BatchError, ErrorKind, Result};
pub use models::*;
pub use pipeline::{
    BatchRunner, FailureAction, InteractiveNotifier, LogNotifier, OperatorNotifier, Pipeline,
    StageFailure,
};
pub use prompts::{extract_slide_texts, PromptSource};
pub use services::{DescriptionGenerator, ImageClient, ImageGenerator, ServiceClients, TextClient};
