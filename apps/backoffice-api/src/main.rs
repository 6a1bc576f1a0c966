use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_products::seed_default_products;
use domain_users::LoginThrottle;
use eyre::WrapErr;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use api::Services;
use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None)
            .await
            .wrap_err("Failed to connect to MongoDB")?;
    let db = mongo_client.database(config.mongodb.database());

    // Accessors create their indexes on construction
    let products = domain_products::mongodb::product_accessor(&db)
        .await
        .wrap_err("Failed to prepare the products collection")?;
    let sales = domain_sales::mongodb::sale_accessor(&db)
        .await
        .wrap_err("Failed to prepare the sales collection")?;
    let users = domain_users::mongodb::user_accessor(&db)
        .await
        .wrap_err("Failed to prepare the users collection")?;

    if config.seed.enabled {
        let inserted = seed_default_products(products.as_ref())
            .await
            .wrap_err("Failed to seed default products")?;
        info!(inserted, "Default products seeded");
    }

    let throttle = LoginThrottle::in_memory(config.throttle.clone());
    let jwt = axum_helpers::JwtAuth::new(&config.jwt);
    let services = Services::new(products, sales, users, throttle, jwt);

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(services)).await?;

    let state = AppState { mongo_client };
    let app = router
        .merge(health_router(config.app.clone()))
        .merge(api::health::router(state.clone()));

    info!(
        environment = ?config.environment,
        "Starting {} v{}", config.app.name, config.app.version
    );

    create_production_app(app, &config.server, async move {
        info!("Shutting down: closing MongoDB connections");
        state.mongo_client.shutdown().await;
        info!("MongoDB connection closed successfully");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Back-office API shutdown complete");
    Ok(())
}
