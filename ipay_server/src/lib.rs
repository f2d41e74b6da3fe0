//! # International Payments Portal server
//! This crate hosts the REST server for the payments portal. It is responsible for:
//! * Registering customers and logging users in, issuing short-lived JWT access tokens.
//! * Checking access tokens and roles on every protected route.
//! * Handing payment submissions, verifications and SWIFT batch submissions to the payment workflow in `ipay_engine`.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /api/register` and `POST /api/login`: public and rate-limited.
//! * `GET /api/profile`: any authenticated user.
//! * `POST /api/payments`: customers.
//! * `GET /api/transactions`, `PUT /api/transactions/{id}/status`, `GET /api/transactions/{id}/history` and
//!   `POST /api/swift-submit`: employees.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
