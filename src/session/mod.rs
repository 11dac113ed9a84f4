//! Session-oriented encoding API.

/// The encoding session.
pub mod encoder;
/// Serializable encoder options.
pub mod options;
