// Interview sessions: question generation, the session registry, and the HTTP handlers
// that drive a session through created → questions_ready → active → completed.

pub mod handlers;
pub mod prompts;
pub mod questions;
pub mod registry;

pub use registry::SessionRegistry;
