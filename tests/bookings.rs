mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;

use aircnc::db::Collection;
use aircnc::testutil::{MockGateway, RecordingMailer};
use common::{TestContext, CLIENT_SECRET};

const MAIL_WAIT: Duration = Duration::from_secs(2);

fn booking(guest: &str, host: &str, transaction_id: &str) -> Value {
    json!({
        "guest": { "email": guest, "name": "Guest" },
        "host": host,
        "transactionId": transaction_id,
        "price": 240,
        "room": { "id": "64b7f0c2a1b2c3d4e5f60718", "title": "Cabin by the lake" }
    })
}

#[actix_rt::test]
async fn test_booking_success_notifies_guest_and_host() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/bookings")
        .set_json(json!({
            "guest": { "email": "g@x.com" },
            "host": "h@x.com",
            "transactionId": "tx1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let booking_id = body["insertedId"]
        .as_str()
        .expect("insertedId should be a string")
        .to_string();

    let mut sent = ctx.mailer.wait_for(2, MAIL_WAIT).await;
    assert_eq!(sent.len(), 2);
    sent.sort_by(|a, b| a.to.cmp(&b.to));

    let (guest_mail, host_mail) = (&sent[0], &sent[1]);
    assert_eq!(guest_mail.to, "g@x.com");
    assert_eq!(guest_mail.subject, "Booking Successful!");
    assert_eq!(host_mail.to, "h@x.com");
    assert_eq!(host_mail.subject, "Your room got booked!");
    for mail in &sent {
        assert!(mail.html.contains("tx1"));
        assert!(mail.html.contains(&booking_id));
    }
}

#[actix_rt::test]
async fn test_invalid_booking_is_not_stored_or_notified() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let bad_bodies = [
        json!({ "host": "h@x.com", "transactionId": "tx1" }),
        json!({ "guest": { "email": "g@x.com" }, "host": "h@x.com" }),
        json!({ "guest": { "email": "g@x.com" }, "host": "nobody", "transactionId": "tx1" }),
    ];
    for body in bad_bodies {
        let req = test::TestRequest::post()
            .uri("/bookings")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    assert!(ctx.store.is_empty(Collection::Bookings));
    assert!(ctx.mailer.wait_for(1, Duration::from_millis(50)).await.is_empty());
}

#[actix_rt::test]
async fn test_bookings_are_listed_by_guest_and_by_host() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    for (guest, host, tx) in [
        ("g1@x.com", "h1@x.com", "tx1"),
        ("g1@x.com", "h2@x.com", "tx2"),
        ("g2@x.com", "h1@x.com", "tx3"),
    ] {
        let req = test::TestRequest::post()
            .uri("/bookings")
            .set_json(booking(guest, host, tx))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    let req = test::TestRequest::get()
        .uri("/bookings?email=g1@x.com")
        .to_request();
    let guest_bookings: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    let transactions: Vec<&str> = guest_bookings
        .iter()
        .map(|b| b["transactionId"].as_str().unwrap())
        .collect();
    assert_eq!(transactions, vec!["tx1", "tx2"]);
    assert_eq!(guest_bookings[0]["room"]["title"], "Cabin by the lake");

    let req = test::TestRequest::get()
        .uri("/bookings/host?email=h1@x.com")
        .to_request();
    let host_bookings: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    let transactions: Vec<&str> = host_bookings
        .iter()
        .map(|b| b["transactionId"].as_str().unwrap())
        .collect();
    assert_eq!(transactions, vec!["tx1", "tx3"]);
}

#[actix_rt::test]
async fn test_missing_email_lists_nothing() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/bookings")
        .set_json(booking("g@x.com", "h@x.com", "tx1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    for uri in ["/bookings", "/bookings?email=", "/bookings/host", "/bookings/host?email="] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let bookings: Vec<Value> = test::read_body_json(resp).await;
        assert!(bookings.is_empty(), "{} should list nothing", uri);
    }
}

#[actix_rt::test]
async fn test_delete_booking() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/bookings")
        .set_json(booking("g@x.com", "h@x.com", "tx1"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["insertedId"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/bookings/{}", id))
        .to_request();
    let outcome: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(outcome["deletedCount"], 1);
    assert!(ctx.store.is_empty(Collection::Bookings));
}

#[actix_rt::test]
async fn test_mail_outage_does_not_fail_the_booking() {
    let ctx = TestContext::with(
        MockGateway::new(CLIENT_SECRET),
        RecordingMailer::failing_first(u32::MAX),
    );
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/bookings")
        .set_json(booking("g@x.com", "h@x.com", "tx1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["insertedId"].is_string());
    assert_eq!(ctx.store.len(Collection::Bookings), 1);

    // Both emails are attempted the full number of times, then given up on.
    let deadline = tokio::time::Instant::now() + MAIL_WAIT;
    while ctx.mailer.attempts() < 6 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(ctx.mailer.attempts(), 6);
    assert!(ctx.mailer.sent().is_empty());
}
