/// Explorer Mock Server Library
///
/// In-memory stand-in for the explorer backend, usable as a standalone
/// binary or embedded in tests through `spawn_test_server`.

pub mod handlers;
pub mod server;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use server::{create_router, run_server, spawn_test_server};
pub use state::ExplorerState;
pub use types::*;
