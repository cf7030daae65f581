use crate::{
    db::{Collection, DocumentId, DocumentStore, Filter, JsonDocument},
    error::AppError,
    models::{BookingInput, EmailQuery},
    notifications::{booking_emails, NotificationDispatcher},
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Lists a guest's bookings (`?email=`). Without an email the answer is an empty
/// list and the database is not queried.
#[get("/bookings")]
pub async fn guest_bookings(
    store: web::Data<dyn DocumentStore>,
    query: web::Query<EmailQuery>,
) -> Result<impl Responder, AppError> {
    let Some(email) = query.email() else {
        return Ok(HttpResponse::Ok().json(Vec::<JsonDocument>::new()));
    };

    let bookings = store
        .find(Collection::Bookings, Filter::eq("guest.email", email))
        .await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// Lists the bookings made on a host's rooms (`?email=`), with the same
/// empty-email behaviour as `guest_bookings`.
#[get("/bookings/host")]
pub async fn host_bookings(
    store: web::Data<dyn DocumentStore>,
    query: web::Query<EmailQuery>,
) -> Result<impl Responder, AppError> {
    let Some(email) = query.email() else {
        return Ok(HttpResponse::Ok().json(Vec::<JsonDocument>::new()));
    };

    let bookings = store
        .find(Collection::Bookings, Filter::eq("host", email))
        .await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// Records a paid booking and notifies both parties.
///
/// The two emails are queued after the insert succeeds; delivery happens in the
/// background and its outcome never changes this response.
///
/// ## Responses:
/// - `200 OK`: `{acknowledged, insertedId}`.
/// - `400 Bad Request`: Missing guest email, host email or `transactionId`.
#[post("/bookings")]
pub async fn create_booking(
    store: web::Data<dyn DocumentStore>,
    notifier: web::Data<NotificationDispatcher>,
    booking: web::Json<BookingInput>,
) -> Result<impl Responder, AppError> {
    booking.validate()?;

    let result = store
        .insert_one(Collection::Bookings, booking.to_document()?)
        .await?;
    log::info!(
        "booking {} saved for transaction {}",
        result.inserted_id,
        booking.transaction_id
    );

    for email in booking_emails(
        &booking.guest.email,
        &booking.host,
        &result.inserted_id,
        &booking.transaction_id,
    ) {
        notifier.enqueue(email);
    }

    Ok(HttpResponse::Ok().json(result))
}

#[delete("/bookings/{id}")]
pub async fn delete_booking(
    store: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = DocumentId::parse(&id)?;
    let result = store
        .delete_one(Collection::Bookings, Filter::Id(id))
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
