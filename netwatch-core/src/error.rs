//! Error types for the netwatch monitoring engine
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and user-friendly error messages.

use thiserror::Error;

/// Main error type for the netwatch application
#[derive(Error, Debug)]
pub enum NetwatchError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors related to reachability probes
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Errors related to connect/disconnect command execution
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Errors enumerating local interface addresses
    #[error("Failed to enumerate local addresses: {0}")]
    AddressLookup(#[from] local_ip_address::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Duplicate target name in group {group}: {name}")]
    DuplicateTarget { group: usize, name: String },

    #[error("More than one internet-monitor declared")]
    DuplicateInternetMonitor,

    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Reachability probe errors
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to spawn ping process for {address}: {reason}")]
    SpawnFailed { address: String, reason: String },

    #[error("Ping process for {address} closed its output stream")]
    StreamClosed { address: String },

    #[error("Failed to read ping output: {0}")]
    ReadFailed(#[from] std::io::Error),
}

/// Connect/disconnect command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Empty command line")]
    EmptyCommand,

    #[error("Failed to parse command line: {0}")]
    ParseFailed(#[from] shell_words::ParseError),

    #[error("Failed to spawn command {program}: {reason}")]
    SpawnFailed { program: String, reason: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, NetwatchError>;
