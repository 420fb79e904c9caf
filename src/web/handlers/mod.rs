//! # Web API Request Handlers
//!
//! Handlers delegate to [`crate::services::DispatchService`] or the payment
//! ledger held in [`crate::web::state::AppState`].

pub mod health;
pub mod payments;
