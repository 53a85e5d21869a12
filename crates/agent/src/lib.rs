//! Agent Runtime - LLM-powered intent routing for CRM activities
//!
//! This crate turns a free-form request into exactly one remote call:
//! - Asks the model for a one-line method/parameter answer (`prompt`, `llm`)
//! - Normalizes that answer into a canonical method and parameters (`intent`)
//! - Collects missing create/update fields interactively (`slots`)
//! - Binds the canonical method to the activity API and prints the result (`dispatch`)
//!
//! # Architecture
//!
//! `AgentRuntime` (see `runtime`) drives the steps in order for a single
//! utterance. Nothing is remembered between utterances.
//!
//! # Safety Principle
//!
//! The LLM is strictly a translator. Its output is accepted only when it maps
//! onto the closed set of canonical methods; anything else is rejected, never
//! guessed at.

pub mod dispatch;
pub mod intent;
pub mod llm;
pub mod prompt;
pub mod runtime;
pub mod slots;

pub use dispatch::{DispatchOutcome, Dispatcher};
pub use intent::{IntentParser, SynonymTable};
pub use llm::{HttpLlmClient, LlmClient};
pub use prompt::{LlmAdapter, INTENT_PROMPT_TEMPLATE};
pub use runtime::AgentRuntime;
