use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lotto_draws::{config, source};
use lotto_mcp::connection::conn;
use lotto_mcp::{DrawUseCase, IngestUseCase, MCPHandler, StatsUseCase, stdio};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!(
        database = %config.database_path.display(),
        source = %config.source,
        "Let's draw some numbers."
    );

    let db_conn = Arc::new(conn(&config.database_path)?);
    let draw_source = source::from_config(&config, config.source)?;

    let draw_use_case = DrawUseCase::new(Arc::clone(&db_conn));
    let stats_use_case = StatsUseCase::new(Arc::clone(&db_conn));
    let ingest_use_case = IngestUseCase::new(Arc::clone(&db_conn), draw_source);

    let handler = MCPHandler::new(
        Arc::new(draw_use_case),
        Arc::new(stats_use_case),
        Arc::new(ingest_use_case),
    );

    let (reader, writer) = stdio();

    handler.serve(reader, writer).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    Ok(())
}
