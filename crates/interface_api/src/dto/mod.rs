//! Request and response bodies

pub mod plans;
pub mod statements;
