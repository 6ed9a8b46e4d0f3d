use anyhow::Result;

use static_http_server::config::parse_args;
use static_http_server::Server;

fn main() -> Result<()> {
    // Initialize logging with env_logger
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let server_config = parse_args()?;
    log::info!("Server configuration: {:?}", server_config);

    let server = Server::from_config(&server_config)?;
    server.wait()
}
