pub mod loader;
pub mod model;
pub mod paths;
pub mod resolver;
pub mod switcher;

pub use loader::ConfigLoader;
pub use model::{AppConfig, AuthConfig, GatewayConfig};
pub use paths::ProjectPaths;
pub use resolver::{DatabaseConfig, detect_provider, resolve, resolve_from};
pub use switcher::{SwitchReport, switch_by_name, switch_to, switch_to_with};
