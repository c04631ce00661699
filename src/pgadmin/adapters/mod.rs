//! Adapter implementations for server registry generation.

mod credential;
mod file_sink;

pub use credential::{EchoPasswordCommand, PassFileReference, QuotedEchoPasswordCommand};
pub use file_sink::{CapStdRegistryFileSink, REGISTRY_FILE_MODE};
