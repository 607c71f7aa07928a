//! Storage infrastructure - local filesystem and S3 sinks

mod factory;
pub mod local;
pub mod s3;

pub use factory::{ConfiguredS3ClientProvider, S3ClientProvider, WriterBundle, WriterFactory};
pub use local::{list_files_with_suffix, FileBasedDataReader, FileBasedDataWriter};
pub use s3::{RealS3Client, S3ClientTrait, S3DataReader, S3DataWriter};

#[cfg(test)]
pub use factory::MockS3ClientProvider;
