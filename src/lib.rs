// ANI Desktop - settings, n8n workflow import and UI bridge backend
// License: Apache-2.0

pub mod bridge;
pub mod config;
pub mod logger;
pub mod remote;
pub mod settings;
pub mod workflow;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
