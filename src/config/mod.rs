//! Service configuration: listener, token signing, user store and logging.

mod logging;
mod store;
mod types;

pub use logging::LoggingConfig;
pub use store::StoreConfig;
pub use types::{
    config_figment, extract_config, load_config, print_schema, Config, ConfigV1, JWTConfig,
    CONFIG_PATH_ENV,
};
