pub mod audit;
pub mod chat;
pub mod chat_task;
pub mod profile;
pub mod rest;
pub mod router;
pub mod state;

// Re-export the router builder so the binaries and tests can mount the whole API.
pub use router::create_app;
pub use state::AppState;
