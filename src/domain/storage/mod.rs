//! Storage domain - read/write capabilities over local disk or object storage

mod kind;
mod repository;

pub use kind::StorageKind;
pub use repository::{DataReader, DataWriter};

#[cfg(test)]
pub use repository::mock;
