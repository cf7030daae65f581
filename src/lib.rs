#![doc = "The `aircnc` library crate."]
#![doc = ""]
#![doc = "Backend for the AirCNC rental marketplace: users, room listings, bookings,"]
#![doc = "payment intents, bearer-token access control and booking notifications."]
#![doc = "The binary (`main.rs`) wires the production collaborators (MongoDB, Stripe,"]
#![doc = "SMTP) into the routes declared here; tests wire in the doubles from `testutil`."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notifications;
pub mod payments;
pub mod routes;
pub mod testutil;

pub use crate::error::AppError;
