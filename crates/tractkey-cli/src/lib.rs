//! Library side of the `tractkey` command: configuration, logging, the run
//! pipeline and terminal rendering.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod summary;
pub mod types;
