use clap::Parser;
use docchat::core::config::{self, CliOverrides, DocChatConfig};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "docchat", about = "Chat with your PDF documents from the terminal")]
struct Args {
    /// Base URL of the auth server (overrides config and DOCCHAT_AUTH_URL)
    #[arg(long)]
    auth_url: Option<String>,

    /// Base URL of the document server (overrides config and DOCCHAT_API_URL)
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let (file_config, load_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (DocChatConfig::default(), Some(e)),
    };
    let config = config::resolve(
        &file_config,
        &CliOverrides {
            auth_url: args.auth_url,
            api_url: args.api_url,
        },
    );

    // Initialize file logger - writes to docchat.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("docchat.log") {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }

    if let Some(e) = load_error {
        log::error!("Failed to load config, using defaults: {}", e);
    }
    log::info!(
        "DocChat starting up (auth: {}, api: {})",
        config.auth_base_url,
        config.api_base_url
    );

    docchat::tui::run(config)
}
