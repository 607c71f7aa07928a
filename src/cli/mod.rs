//! CLI module for the document parsing gateway
//!
//! - `serve`: run the HTTP gateway
//! - `test-backends`: exercise every parsing backend of a running gateway

pub mod serve;
pub mod test_backends;

use clap::{Parser, Subcommand};

/// Document parsing gateway
#[derive(Parser)]
#[command(name = "docparse-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP gateway
    Serve,

    /// Post a document to a running gateway once per backend and report
    TestBackends(test_backends::TestBackendsArgs),
}
