//! API services.

pub mod plants;
