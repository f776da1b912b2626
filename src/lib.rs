//! AmbientDesk: a dashboard driven by natural language.
//!
//! A chat turn goes through the orchestrator to a completion backend. The
//! reply is parsed into workspace actions and dispatched. A second
//! "ambient" lane then restyles the atmosphere to match.

pub mod actions;
pub mod completion;
pub mod console;
pub mod dates;
pub mod dispatcher;
pub mod emoji;
pub mod error;
pub mod lane;
pub mod mood;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod proxy_server;
pub mod state;
pub mod types;
pub mod workspace;
