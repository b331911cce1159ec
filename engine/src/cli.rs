//! CLI interface for the aftercare service
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Aftercare post-discharge assistant
///
/// A conversational service that looks up patient discharge reports,
/// classifies questions as clinical or administrative, and answers them
/// through a hosted LLM with reference-library or web-search grounding.
#[derive(Parser, Debug)]
#[command(name = "aftercare")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP service
    Serve {
        /// Override the configured listen address
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Run startup diagnostics (config, records file, credentials)
    Doctor,
}
