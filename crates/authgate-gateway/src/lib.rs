pub mod auth_proxy;
pub mod bootstrap;
pub mod gate;
pub mod pages;
pub mod router;
pub mod server;
pub mod state;

pub use server::GatewayServer;
pub use state::{AppState, SharedState};
