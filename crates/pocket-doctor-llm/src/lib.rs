//! LLM wrapper for blood-report extraction.
//!
//! This crate turns OCR'd report text into structured [`Report`]s through any
//! chat-completion backend implementing [`LlmClient`]. The HTTP client for
//! OpenAI-compatible endpoints is behind the `llm` feature.
//!
//! [`Report`]: pocket_doctor_core::Report

pub mod extraction;
pub mod prompts;

#[cfg(feature = "llm")]
pub mod client;

#[cfg(feature = "llm")]
pub use client::OpenAiClient;
pub use extraction::*;
pub use prompts::*;
