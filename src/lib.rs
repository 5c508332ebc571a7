//! Reman Portal
//!
//! Backend for a remanufactured-electronics customer portal: orders and
//! delivery tracking, RMA submission with webhook/email notification,
//! environmental impact with ESG scoring, and an admin console API.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
pub mod validation;
