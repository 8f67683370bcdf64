//! Helper functions shared by the CLI and the preview server

mod date;
mod url;

pub use date::*;
pub use url::*;
