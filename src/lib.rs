/// AntarVaani - Mental Health Support Chatbot Backend
///
/// Core library wiring the therapist directory, document indexing,
/// retrieval-augmented chat, and the HTTP surface.

pub mod config;
pub mod core;
pub mod server;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
