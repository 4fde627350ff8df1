use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use std::sync::Arc;
use std::time::Duration;

mod auth;
mod catalog;
mod config;
mod db;
mod handlers;
mod models;
mod payment;

use config::Config;
use payment::{PaymentProvider, SimulatedGateway};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger and environment
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().expect("Invalid configuration");

    log::info!("Connecting to database...");
    let pool = db::get_db_pool(&config.database_url).await;

    // Run migrations
    log::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let provider: Arc<dyn PaymentProvider> = Arc::new(SimulatedGateway::new(
        config.payment_success_rate,
        Duration::from_millis(config.payment_delay_ms),
    ));

    log::info!(
        "Starting server at http://{}:{}",
        config.host,
        config.port
    );

    let bind_addr = (config.host.clone(), config.port);
    let pool_data = web::Data::new(pool);
    let config_data = web::Data::new(config);
    let provider_data: web::Data<dyn PaymentProvider> = web::Data::from(provider);

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .app_data(provider_data.clone())
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login)),
            )
            .service(
                web::scope("/hostels")
                    .route("", web::get().to(handlers::hostels::get_hostels))
                    .route("", web::post().to(handlers::hostels::create_hostel))
                    .route("/{id}", web::get().to(handlers::hostels::get_hostel_by_id))
                    .route(
                        "/{id}/images",
                        web::post().to(handlers::hostels::upload_hostel_image),
                    ),
            )
            .service(
                web::scope("/rooms")
                    .route("", web::get().to(handlers::rooms::get_rooms))
                    .route("", web::post().to(handlers::rooms::create_room))
                    .route(
                        "/{id}/images",
                        web::post().to(handlers::rooms::upload_room_image),
                    ),
            )
            .service(
                web::scope("/bookings")
                    .route("", web::post().to(handlers::bookings::create_booking))
                    .route("", web::get().to(handlers::bookings::list_bookings))
                    .route("/{id}", web::get().to(handlers::bookings::get_booking))
                    .route(
                        "/{id}/pay",
                        web::post().to(handlers::bookings::pay_booking),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
