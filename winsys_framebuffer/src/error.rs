//! Error types for the window-system framebuffer
//!
//! This module defines the errors reported by the framebuffer facade, the
//! swapchain manager and the platform backends.

use std::fmt;

/// Result type for framebuffer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Framebuffer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Caller contract violation (bad extent, unmapped format, format change...)
    InvalidArgument(String),

    /// Operation issued in a state that does not allow it (e.g. after destroy)
    InvalidState(String),

    /// The device cannot present to the surface from the chosen queue family
    Unsupported(String),

    /// Backend-specific platform failure (Vulkan, mock, ...)
    Backend(String),

    /// The swapchain no longer matches the surface and must be recreated
    OutOfDate,

    /// The logical device was lost
    DeviceLost,

    /// Out of host or device memory
    OutOfMemory,
}

impl Error {
    /// Whether the caller can recover by recreating the swapchain (`resize`)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::OutOfDate)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            Error::Backend(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfDate => write!(f, "Swapchain out of date"),
            Error::DeviceLost => write!(f, "Device lost"),
            Error::OutOfMemory => write!(f, "Out of memory"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
