//! Pure loader logic - no I/O, no side effects.
//!
//! This crate provides:
//! - Configuration types with validation
//! - Ordered polyfill descriptor assembly from declarative toggles
//! - Bootstrap-script code generation
//!
//! # Example
//!
//! ```
//! use polyloader_core::{generate_loader_script, EntrySet, EntryType, LoaderConfig};
//!
//! // Describe what to load on modern browsers
//! let config = LoaderConfig::new(EntrySet::new(
//!     EntryType::Module,
//!     vec!["app.js".to_string()],
//! ));
//!
//! // Generate the bootstrap script (pure string transformation)
//! let script = generate_loader_script(&config, &[]).unwrap();
//! assert!(script.contains("window.importShim('./app.js');"));
//! ```

mod codegen;
mod config;
mod error;
mod specs;

pub use codegen::generate_loader_script;
pub use config::{
    EntrySet, EntryType, LoaderConfig, PolyfillSpec, PolyfillsConfig, RegeneratorMode,
};
pub use error::{CoreError, Result};
pub use specs::{polyfill_specs, Polyfill, NO_MODULE_TEST};
