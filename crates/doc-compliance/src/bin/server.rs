//! Document compliance server binary
//!
//! Run with: cargo run -p doc-compliance --bin doc-compliance-server

use doc_compliance::{config::AppConfig, server::DocServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_compliance=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                 Document Compliance API                   ║
║        Grammar Reports, Fixes and Agent Rewrites          ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = AppConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Upload dir: {}", config.storage.upload_dir.display());
    tracing::info!("  - Jobs dir: {}", config.storage.jobs_dir().display());
    tracing::info!("  - Max upload: {} bytes", config.storage.max_file_size);
    tracing::info!("  - Model: {} at {}", config.llm.default_model, config.llm.base_url);
    tracing::info!("  - Language: {}", config.compliance.language);
    if config.auth.api_key.is_some() {
        tracing::info!("  - API key required for document routes");
    }

    let server = DocServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /upload                - Upload a PDF or DOCX");
    println!("  GET  /report/:doc_id        - Grammar and style report");
    println!("  POST /fix/:doc_id           - Rewrite and save a fixed copy");
    println!("  GET  /download/fixed/:doc_id - Download the fixed copy");
    println!("  POST /agent/jobs            - Start a background agent job");
    println!("  GET  /agent/jobs/:job_id    - Poll a job");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
