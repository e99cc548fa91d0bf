//! nudge - multi-provider LLM client
//!
//! One completion interface over DeepSeek, GLM-4, Qwen and OpenAI with
//! automatic fallback, key health checks, usage accounting and a TTL content
//! cache for the reminder app's generated text.

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod core;
pub mod error;
pub mod providers;
pub mod render;
pub mod storage;
pub mod util;

pub use error::{ExitCode, NudgeError, Result};
