pub mod classifier;
pub mod config;
pub mod detector;
pub mod domain;
pub mod error;
pub mod git;
pub mod notice;
pub mod orchestrator;
pub mod registry;
pub mod ui;
pub mod version_files;

pub use error::{ReleaseError, Result};
