//! Terminal client for Le Pale Blue Dot backend.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin lpbd-client -- --username app --password secret
//! LPBD_BASE_URL=https://bar.example.com cargo run --bin lpbd-client
//! ```

use std::path::PathBuf;

use clap::Parser;

use lpbd_client::{
    config::{ClientConfig, Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS},
    ui::run_client,
};
use lpbd_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "lpbd-client")]
#[command(about = "Knock on the door of Le Pale Blue Dot", long_about = None)]
struct Args {
    /// Backend base URL
    #[arg(short = 'u', long, env = "LPBD_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Application username for Basic auth
    #[arg(long, env = "LPBD_USERNAME")]
    username: String,

    /// Application password for Basic auth
    #[arg(long, env = "LPBD_PASSWORD", hide_env_values = true)]
    password: String,

    /// Where the anonymous identity is kept
    #[arg(long, env = "LPBD_IDENTITY_FILE")]
    identity_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Forget the stored identity before starting
    #[arg(long)]
    reset_identity: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let credentials = Credentials {
        username: args.username,
        password: args.password,
    };
    let config = match ClientConfig::new(
        &args.base_url,
        credentials,
        args.identity_file,
        args.timeout_secs,
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_client(config, args.reset_identity).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
