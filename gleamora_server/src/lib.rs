//! # Gleamora Jewels marketplace server
//! This module hosts the HTTP boundary for the Gleamora Jewels marketplace. It is responsible for:
//! Validating access tokens issued by the identity service and enforcing role gates.
//! Accepting carts and turning them into priced, stock-reserved orders.
//! Driving orders through the fulfillment lifecycle and recording payment outcomes.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders`: Order creation (POST, customers) and role-scoped order listing (GET).
//! * `/api/orders/{order_id}`: Fetch a single order, subject to ownership checks.
//! * `/api/orders/{order_id}/status`: Move an order through its lifecycle (vendors and admins).
//! * `/api/payments/intent`, `/api/payments/verify`: Start and settle a payment attempt.
//! * `/api/payments/upi/{order_id}`: Resolve the UPI payee for an order.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
