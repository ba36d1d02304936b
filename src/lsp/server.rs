use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::lsp::backend::Backend;
use crate::Config;

/// Start the LSP server
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;
    init_logging(&config.log_level);

    log::info!(
        "starting ucs-language-server {} (workspace settings: {})",
        env!("CARGO_PKG_VERSION"),
        config
            .config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<workspace>/.ucs.toml".to_string())
    );

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config.clone())).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}

/// Log to stderr; stdout carries the protocol. `RUST_LOG` wins over `--log-level`.
pub fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if let Err(e) = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .try_init()
    {
        eprintln!("logger already initialized: {}", e);
    }
}
