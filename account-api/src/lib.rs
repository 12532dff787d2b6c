//! HTTP routing adapter for the account service
//!
//! Thin translation layer: URLs map to account operations, operation errors
//! map to status codes. All business rules live in `account-core`.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;
pub mod models;

use actix_web::web;

/// Register all routes
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/accounts")
            .route("/{id}/create", web::post().to(handlers::create_account))
            .route("/{id}/deposit", web::post().to(handlers::deposit))
            .route("/{id}/withdraw", web::post().to(handlers::withdraw))
            .route("/{id}/balance", web::get().to(handlers::balance))
            .route("/{id}/entries", web::get().to(handlers::entries)),
    )
    .route("/health", web::get().to(handlers::health))
    .route("/metrics", web::get().to(handlers::metrics));
}
