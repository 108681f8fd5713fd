//! Route Handlers

pub mod analyze;
