//! GIF89a stream encoding.
//!
//! [`container::ContainerWriter`] lays out the records, [`lzw`] compresses image data, and the
//! output and sink modules move the produced bytes to their consumers.

/// Record layout and the per-session writer state machine.
pub mod container;
/// Variable-width LZW compression of color indices.
pub mod lzw;
/// Byte consumers attached to an encoding session.
pub mod output;
/// Frame sink adapter for ordered frame producers.
pub mod sink;
