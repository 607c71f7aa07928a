//! Infrastructure layer - Storage, engine and observability implementations

pub mod engine;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
