//! Configuration management for bg-remover.
//!
//! This module provides the command-line interface and configuration types:
//! - Command-line arguments via clap
//! - Environment variables with the `BG_` prefix
//! - Sensible defaults for all optional settings
//!
//! Running the binary without a subcommand is the same as `bg-remover serve`.
//!
//! # Environment Variables
//!
//! - `BG_API_KEY` - Shared secret expected in `X-Api-Key` (unset = reject all)
//! - `BG_HOST` - Server bind address (default: 0.0.0.0)
//! - `BG_PORT` - Server port (default: 8000)
//! - `BG_MAX_BODY_SIZE` - Request body limit in bytes (default: 64 MiB)
//! - `BG_CORS_ORIGINS` - Comma-separated allowed origins (default: any)
//! - `BG_QUALITY` - Extraction preset: fast, balanced, quality (default: balanced)
//! - `BG_ITERATIONS` - Segmentation rounds, 1-20 (default: from preset)
//! - `BG_MARGIN` - Border inset in pixels (default: 2% of each side, min 5)
//! - `BG_EDGE_MODE` - Edge refinement: blur, bilateral, guided (default: from preset)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::extract::{EdgeMode, ExtractOptions, QualityPreset, MAX_ITERATIONS, MIN_ITERATIONS};
use crate::server::DEFAULT_MAX_BODY_SIZE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Path that stands for stdin (input) or stdout (output).
pub const STDIO_PATH: &str = "-";

// =============================================================================
// CLI Arguments
// =============================================================================

/// bg-remover - Remove image backgrounds over HTTP.
///
/// Accepts base64-encoded images on POST /removebg and returns PNGs whose
/// background is transparent.
#[derive(Parser, Debug, Clone)]
#[command(name = "bg-remover")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server options, used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// Resolve the command to run, defaulting to `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve(ServeConfig),

    /// Remove the background of a local image file
    Remove(RemoveConfig),
}

// =============================================================================
// Extraction Arguments
// =============================================================================

/// Extraction tuning shared by `serve` and `remove`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ExtractArgs {
    /// Quality preset.
    #[arg(short, long, value_enum, default_value_t = QualityPreset::Balanced, env = "BG_QUALITY")]
    pub quality: QualityPreset,

    /// Segmentation rounds, overrides the preset.
    #[arg(
        short = 'n',
        long,
        env = "BG_ITERATIONS",
        value_parser = clap::value_parser!(u32).range(MIN_ITERATIONS as i64..=MAX_ITERATIONS as i64)
    )]
    pub iterations: Option<u32>,

    /// Border inset in pixels treated as background (default: auto).
    #[arg(short, long, env = "BG_MARGIN")]
    pub margin: Option<u32>,

    /// Edge refinement mode, overrides the preset.
    #[arg(short, long, value_enum, env = "BG_EDGE_MODE")]
    pub edge_mode: Option<EdgeMode>,
}

impl ExtractArgs {
    /// Resolve the preset and overrides into extractor options.
    pub fn to_options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::from_preset(self.quality);
        if let Some(iterations) = self.iterations {
            options = options.with_iterations(iterations);
        }
        if let Some(margin) = self.margin {
            options = options.with_margin(margin);
        }
        if let Some(edge_mode) = self.edge_mode {
            options = options.with_edge_mode(edge_mode);
        }
        options
    }
}

// =============================================================================
// Serve Command
// =============================================================================

/// Configuration for the HTTP server.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "BG_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "BG_PORT")]
    pub port: u16,

    /// Maximum request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE, env = "BG_MAX_BODY_SIZE")]
    pub max_body_size: usize,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Shared API key callers must send in the X-Api-Key header.
    ///
    /// If unset or empty, every background removal request is rejected.
    #[arg(long, env = "BG_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "BG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Extraction Configuration
    // =========================================================================
    #[command(flatten)]
    pub extract: ExtractArgs,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    ///
    /// A missing API key is not an error: the server starts and rejects
    /// every removal request.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be greater than 0".to_string());
        }
        if self.max_body_size == 0 {
            return Err("max_body_size must be greater than 0".to_string());
        }
        self.extract.to_options().validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured API key, or "" when unset.
    pub fn api_key_or_empty(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Remove Command
// =============================================================================

/// Configuration for removing the background of a local file.
#[derive(Args, Debug, Clone)]
pub struct RemoveConfig {
    /// Input image path ('-' for stdin).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output PNG path ('-' for stdout).
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub extract: ExtractArgs,

    /// Show detailed processing information.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl RemoveConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.input.as_os_str().is_empty() {
            return Err("input path is required".to_string());
        }
        if self.output.as_os_str().is_empty() {
            return Err("output path is required".to_string());
        }
        self.extract.to_options().validate()
    }

    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == STDIO_PATH
    }

    pub fn writes_stdout(&self) -> bool {
        self.output.as_os_str() == STDIO_PATH
    }
}

// =============================================================================
// Tests
// =============================================================================
