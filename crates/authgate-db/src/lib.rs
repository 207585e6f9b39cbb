pub mod embedded;
pub mod handle;
pub mod network;
pub mod schema;
pub mod session;

pub use embedded::EmbeddedStore;
pub use handle::{Backend, DatabaseHandle, resolve, resolve_with};
pub use network::NetworkStore;
pub use session::{Session, SessionProvider, SessionUser};
