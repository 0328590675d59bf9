//! Helm integration

mod client;

pub use client::{HelmClient, InstallOptions};
