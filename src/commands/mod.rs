//! Command implementations for sip-composer CLI

pub mod completions;
pub mod compose;
pub mod describe;
pub mod version;
