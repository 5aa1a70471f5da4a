//! kubegen - numbered client manifests from one template
//!
//! Reads `blockscape-client.yaml` and writes `blockscape-client-<i>.yaml` for
//! every index below the requested count, replacing each `%%` in the template
//! with the index.
//!
//! # Layout
//!
//! ```text
//! ./
//! ├── blockscape-client.yaml     # template, read-only
//! ├── blockscape-client-0.yaml
//! ├── blockscape-client-1.yaml
//! └── ...
//! ```
//!
//! # Example
//!
//! ```ignore
//! use kubegen::Expander;
//!
//! let report = Expander::new(".").run(3)?;
//! assert_eq!(report.written.len(), 3);
//! ```

pub mod cli;
pub mod config;
mod error;
mod expander;

pub use error::ExpandError;
pub use expander::{ExpandOptions, ExpandReport, Expander, substitute};

/// Template file, resolved against the expander's directory
pub const TEMPLATE_PATH: &str = "blockscape-client.yaml";

/// Stem shared by every generated manifest
pub const OUTPUT_BASE: &str = "blockscape-client";

/// Extension of generated manifests
pub const OUTPUT_EXT: &str = "yaml";

/// Token replaced by the pass index
pub const PLACEHOLDER: &str = "%%";

/// Default number of worker threads
pub const DEFAULT_JOBS: usize = 1;
