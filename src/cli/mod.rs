//! CLI module - Command-line interface for sbauction
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

use crate::parser::parse_price_param;

/// sbauction - Skyblock auction house search
/// Finds buy-it-now listings by name and price
#[derive(Parser)]
#[command(name = "sbauction")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web", alias = "daemon")]
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single search and print the results as JSON
    #[command(alias = "s")]
    Search {
        /// Item name to search for
        #[arg(required = true)]
        query: Vec<String>,
        /// Inclusive lower price bound
        #[arg(long, value_parser = parse_price)]
        min_price: Option<f64>,
        /// Inclusive upper price bound
        #[arg(long, value_parser = parse_price)]
        max_price: Option<f64>,
    },

    /// Create default config file
    #[command(alias = "init")]
    InitConfig,
}

pub use commands::*;

/// Same rules as the `/search` query bounds: finite numbers only.
fn parse_price(raw: &str) -> Result<f64, String> {
    parse_price_param(Some(raw))?.ok_or_else(|| "price cannot be blank".to_string())
}
