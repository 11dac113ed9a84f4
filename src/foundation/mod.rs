pub(crate) mod bytes;
pub(crate) mod core;
pub(crate) mod error;
