//! Request handlers

pub mod health;
pub mod plans;
pub mod statements;
