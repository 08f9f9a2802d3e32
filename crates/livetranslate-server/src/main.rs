use anyhow::{Context, Result};
use livetranslate_server::state::Config;
use livetranslate_server::translate::{GeminiTranslator, Translator};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "livetranslate_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LiveTranslate server...");

    let config = Config::load()?;

    let api_key = config
        .google_api_key
        .clone()
        .context("GOOGLE_API_KEY must be set")?;
    let translator: Arc<dyn Translator> =
        Arc::new(GeminiTranslator::new(api_key, config.gemini_model.clone()));

    let app = livetranslate_server::create_app(config.clone(), translator).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!("Listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
