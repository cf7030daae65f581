use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use aircnc::{
    auth::TokenService,
    config::Config,
    db::{DocumentStore, MongoStore},
    error::AppError,
    notifications::{DeliveryPolicy, NotificationDispatcher, SmtpMailer},
    payments::{PaymentIntentAdapter, StripeGateway},
    routes,
};

const MAIL_FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

fn startup_error(error: AppError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, error.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(startup_error)?;

    let store = MongoStore::connect(&config.database_uri, &config.database_name)
        .await
        .map_err(startup_error)?;
    match store.ping().await {
        Ok(()) => log::info!("Pinged your deployment. You successfully connected to MongoDB!"),
        Err(e) => log::error!("MongoDB ping failed, continuing without it: {}", e),
    }

    let gateway = StripeGateway::new(&config.payment_secret_key).map_err(startup_error)?;
    let mailer = SmtpMailer::new(&config.mail_relay, &config.mail_user, &config.mail_password)
        .map_err(startup_error)?;
    let (notifier, mail_worker) = NotificationDispatcher::spawn(
        Arc::new(mailer),
        DeliveryPolicy {
            max_attempts: config.mail_max_attempts,
            queue_capacity: config.mail_queue_capacity,
            ..DeliveryPolicy::default()
        },
    );

    let documents: web::Data<dyn DocumentStore> =
        web::Data::from(Arc::new(store.clone()) as Arc<dyn DocumentStore>);
    let tokens = web::Data::new(TokenService::new(&config.access_token_secret));
    let payments = web::Data::new(PaymentIntentAdapter::new(Arc::new(gateway)));
    let notifier = web::Data::new(notifier);

    log::info!("AirCNC is running on {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(documents.clone())
            .app_data(tokens.clone())
            .app_data(payments.clone())
            .app_data(notifier.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    // The server and every dispatcher clone are gone; let the worker flush.
    match tokio::time::timeout(MAIL_FLUSH_TIMEOUT, mail_worker).await {
        Ok(Ok(())) => log::info!("pending notifications flushed"),
        Ok(Err(e)) => log::error!("notification worker panicked: {}", e),
        Err(_) => log::warn!("gave up waiting for pending notifications"),
    }

    store.shutdown().await;
    log::info!("AirCNC stopped");
    Ok(())
}
