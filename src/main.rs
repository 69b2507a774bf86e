use std::sync::Arc;

use bookshelf::config::{load_config, print_schema};
use bookshelf::startup;
use bookshelf::utils::logger::init_logging;
use tracing::error;

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = Arc::new(load_config());
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(config).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
