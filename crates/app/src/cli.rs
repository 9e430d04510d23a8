//! Command line definition.

use std::path::PathBuf;

use authgate_domain::{Header, HttpMethod, TokenSource};
use clap::{Parser, Subcommand};

/// Authenticated HTTP client with transparent credential refresh.
#[derive(Debug, Parser)]
#[command(name = "authgate", version, about)]
pub struct Args {
    /// Config file to use instead of ./authgate.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Credential backend: cookie, local or session
    #[arg(long, global = true, value_name = "SOURCE")]
    pub token_source: Option<TokenSource>,

    /// File used by the local backend
    #[arg(long, global = true, env = "AUTHGATE_TOKEN_FILE", value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// File mirroring the cookie jar
    #[arg(long, global = true, env = "AUTHGATE_COOKIE_JAR", value_name = "PATH")]
    pub cookie_jar: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store credentials issued by a login
    Login {
        /// Access credential
        #[arg(long)]
        access: String,
        /// Refresh credential
        #[arg(long)]
        refresh: Option<String>,
    },

    /// Remove stored credentials
    Logout,

    /// Show which credentials are stored
    Status,

    /// Send an authenticated request
    Request {
        /// HTTP method
        method: HttpMethod,
        /// Absolute URL
        url: String,
        /// Extra header as `Name: value`, repeatable
        #[arg(short = 'H', long = "header", value_name = "HEADER")]
        headers: Vec<Header>,
        /// Request body
        #[arg(long)]
        body: Option<String>,
        /// Send without attaching credentials
        #[arg(long)]
        skip_auth: bool,
    },
}
