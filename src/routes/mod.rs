pub mod auth;
pub mod bookings;
pub mod health;
pub mod payments;
pub mod rooms;
pub mod users;

use actix_web::web;

use crate::error::AppError;

/// Registers every route plus the extractor configs that turn malformed JSON and
/// query strings into `ValidationError`s.
///
/// Expects `web::Data` for `dyn DocumentStore`, `TokenService`,
/// `PaymentIntentAdapter` and `NotificationDispatcher` to be registered on the app.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .service(health::index)
    .service(health::health)
    .service(auth::issue_token)
    .service(payments::create_payment_intent)
    .service(users::save_user)
    .service(users::get_user)
    .service(rooms::list_rooms)
    .service(rooms::create_room)
    .service(rooms::get_room)
    .service(rooms::host_rooms)
    .service(rooms::update_room)
    .service(rooms::delete_room)
    .service(rooms::set_room_status)
    .service(bookings::guest_bookings)
    .service(bookings::host_bookings)
    .service(bookings::create_booking)
    .service(bookings::delete_booking);
}
