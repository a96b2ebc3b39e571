use proforma_eps::orchestration::FundamentalsService;
use proforma_eps::{api, config::Config, FundamentalsSource, YahooDataSource};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let provider = match YahooDataSource::new(
        config.fundamentals_api_url.clone(),
        config.fundamentals_cookie_url.clone(),
        config.provider_timeout,
        config.provider_retry_budget,
        &config.provider_user_agent,
    ) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize fundamentals provider: {}", e);
            std::process::exit(1);
        }
    };

    let source: Arc<dyn FundamentalsSource> = Arc::new(provider);
    let fundamentals = Arc::new(FundamentalsService::new(source, config.provider_timeout));

    let addr = SocketAddr::new(config.bind_addr, config.port);
    tracing::info!(
        "Fundamentals provider {} (timeout {:?}, retry budget {:?})",
        config.fundamentals_api_url,
        config.provider_timeout,
        config.provider_retry_budget
    );

    let app = api::create_router(api::AppState::new(config, fundamentals));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
