use actix_web::{middleware, web, App, HttpServer};
use booking_messaging_service::directory::{PgPaymentLedger, PgUserDirectory};
use booking_messaging_service::services::{
    BookingWorkflow, ConversationStore, MessagePipeline, NotificationCenter,
};
use booking_messaging_service::websocket::RoomRegistry;
use booking_messaging_service::{db, handlers, logging, metrics, AppState, Config};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    tracing::info!("starting booking-messaging-service");

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let db_pool = match db::init_pool(&config.database.url).await {
        Ok(pool) => {
            tracing::info!("connected to database, migrations applied");
            pool
        }
        Err(e) => {
            tracing::error!("failed to connect to database: {e}");
            return Err(io::Error::new(io::ErrorKind::Other, "database connection failed"));
        }
    };

    let registry = RoomRegistry::new();
    tracing::info!("room registry initialized");

    // Constructor injection end to end: every pipeline component receives the
    // registry and its collaborators explicitly, so tests can substitute them.
    let directory = Arc::new(PgUserDirectory::new(db_pool.clone()));
    let ledger = Arc::new(PgPaymentLedger::new(db_pool.clone()));
    let conversations = Arc::new(ConversationStore::new(db_pool.clone(), directory.clone()));
    let notifications = Arc::new(NotificationCenter::new(db_pool.clone(), registry.clone()));
    let messages = Arc::new(MessagePipeline::new(
        db_pool.clone(),
        registry.clone(),
        conversations.clone(),
        notifications.clone(),
    ));
    let bookings = Arc::new(BookingWorkflow::new(
        db_pool.clone(),
        registry.clone(),
        notifications.clone(),
        directory.clone(),
        ledger,
    ));

    let state = AppState {
        db: db_pool,
        registry,
        config: Arc::new(config.clone()),
        directory,
        conversations,
        messages,
        notifications,
        bookings,
    };

    let addr = format!("0.0.0.0:{}", config.app.port);
    tracing::info!("starting HTTP server on {addr}");

    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(metrics::MetricsMiddleware)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(handlers::register_routes)
    })
    .bind(&addr)?
    .run()
    .await
}
