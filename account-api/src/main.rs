//! Account service binary

use account_api::routes;
use account_core::{Bank, Config};
use actix_web::{middleware, web, App, HttpServer};
use event_bus::{NatsPublisher, NoopPublisher, Publisher, PublisherConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting Corebank account service");

    // Load configuration
    let config = match std::env::var("COREBANK_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
        Err(_) => Config::from_env()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    };

    // Connect the event bus; notifications are best-effort, so a missing
    // broker degrades to no-op publication rather than refusing to start
    let publisher: Arc<dyn Publisher> = if config.events.enabled {
        let publisher_config = PublisherConfig {
            url: config.events.nats_url.clone(),
            publish_timeout: Duration::from_millis(config.events.publish_timeout_ms),
        };
        match NatsPublisher::connect(publisher_config).await {
            Ok(publisher) => {
                info!("Connected to event bus at {}", config.events.nats_url);
                Arc::new(publisher)
            }
            Err(e) => {
                warn!("Event bus unavailable, notifications disabled: {}", e);
                Arc::new(NoopPublisher)
            }
        }
    } else {
        info!("Event publication disabled by configuration");
        Arc::new(NoopPublisher)
    };

    // Open the bank
    let bank = Arc::new(
        Bank::open(config.clone(), publisher)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );
    info!("Ledger opened at {:?}", config.data_dir);

    let listen_addr = config.http_listen_addr.clone();
    info!("Listening on {}", listen_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(bank.clone()))
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(&listen_addr)?
    .run()
    .await
}
