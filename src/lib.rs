//! Browser tool that turns an uploaded image into either a LoRA training
//! caption (prefixed with a trigger word) or a text-to-image prompt, using
//! Google Gemini.

pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod prompts;
pub mod server;
pub mod shell;

pub use config::Config;
pub use error::{AppError, GenerationError, ValidationFailure};
pub use gemini::{GeminiClient, ModelBackend, Part};
pub use generator::Generator;
pub use shell::{Mode, Shell, UploadedImage};
