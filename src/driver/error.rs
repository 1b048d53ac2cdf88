//! Error types for the ENET driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Initialization and configuration failures
//! - [`BufferError`]: Transmit buffer borrowing and submission
//! - [`IoError`]: Runtime hardware access and lookup failures
//!
//! The unified [`Error`] enum wraps all domain errors.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and lifecycle errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Controller already initialized
    AlreadyInitialized,
    /// Controller not initialized
    NotInitialized,
    /// Invalid configuration parameter or ring geometry
    InvalidConfig,
    /// MAC reset did not complete in time
    ResetFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::NotInitialized => "not initialized",
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::ResetFailed => "MAC reset failed",
        }
    }
}

// =============================================================================
// Buffer Errors
// =============================================================================

/// Transmit buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// No free buffer or descriptor right now; retry after confirmations
    Busy,
    /// Requested length does not fit
    Overflow {
        /// Largest payload length that would fit
        max_len: usize,
    },
    /// Buffer index out of range
    InvalidBuffer,
    /// Buffer is not borrowed by the caller
    NotLocked,
}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BufferError::Overflow { max_len } => {
                write!(f, "{} (max {max_len} bytes)", self.as_str())
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

impl BufferError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            BufferError::Busy => "no transmit buffer available",
            BufferError::Overflow { .. } => "frame too large for buffers",
            BufferError::InvalidBuffer => "invalid buffer index",
            BufferError::NotLocked => "buffer not borrowed",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime hardware access errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Management frame or capture did not complete in time
    Timeout,
    /// Invalid state for operation (e.g., controller not active)
    InvalidState,
    /// Controller did not respond
    AccessFailed,
    /// Requested entry does not exist
    NotFound,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::InvalidState => "invalid state for operation",
            IoError::AccessFailed => "hardware access failed",
            IoError::NotFound => "entry not found",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match enet.borrow_tx_buffer(len) {
///     Err(Error::Buffer(BufferError::Busy)) => { /* retry later */ }
///     Err(Error::Buffer(BufferError::Overflow { max_len })) => { /* split */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Buffer error
    Buffer(BufferError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {e}"),
            Error::Buffer(e) => write!(f, "buffer: {e}"),
            Error::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<BufferError> for Error {
    fn from(e: BufferError) -> Self {
        Error::Buffer(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for buffer operations
pub type BufferResult<T> = core::result::Result<T, BufferError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;
