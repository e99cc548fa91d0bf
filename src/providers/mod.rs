//! Concrete provider clients.
//!
//! Each submodule owns its request body and response mapping; everything
//! else (settings, transport, key probing) lives in [`crate::core::client`].

pub mod chat;
pub mod deepseek;
pub mod glm4;
pub mod openai;
pub mod qwen;

pub use deepseek::DeepSeekClient;
pub use glm4::Glm4Client;
pub use openai::OpenAiClient;
pub use qwen::QwenClient;
