//! Polyfills bootstrap-script generation - Imperative Shell.
//!
//! This crate orchestrates I/O around the pure functions from
//! `polyloader_core`: it reads polyfill sources from disk, runs them through
//! an external [`Minifier`] when asked to, hashes them for cache busting, and
//! assembles the final bootstrap script a browser executes before the
//! application's own entry points.
//!
//! # Architecture
//!
//! - **Functional Core** (`polyloader_core`): config validation, descriptor
//!   assembly, code generation
//! - **Imperative Shell** (this crate): file reads, minification, hashing
//!
//! # Example
//!
//! ```
//! use polyloader::{create_polyfills_loader, EntrySet, EntryType, LoaderConfig};
//!
//! let config = LoaderConfig::new(EntrySet::new(
//!     EntryType::Module,
//!     vec!["app.js".to_string()],
//! ));
//!
//! let script = create_polyfills_loader(&config, None).unwrap();
//! assert!(script.contains("window.importShim('./app.js');"));
//! ```
//!
//! Writing the referenced `polyfills/<name>[.<hash>].js` files is the
//! caller's responsibility; [`resolve_polyfills`] exposes the descriptors
//! with their code, source maps and hashes for that purpose.

mod error;
mod hash;
mod minify;
mod resolver;

// Re-export core types for convenience
pub use polyloader_core::{
    generate_loader_script, polyfill_specs, CoreError, EntrySet, EntryType, LoaderConfig,
    Polyfill, PolyfillSpec, PolyfillsConfig, RegeneratorMode, NO_MODULE_TEST,
};

// Export shell types
pub use error::{LoaderError, Result};
pub use hash::content_hash;
pub use minify::{MinifiedOutput, Minifier};
pub use resolver::resolve_polyfills;

/// Generates the complete bootstrap script for `config`.
///
/// Resolves the configured polyfills (reading, minifying and hashing their
/// sources as requested), generates the loader script around them, and
/// optionally minifies the script itself. Any failure aborts the call; a
/// partial script is never returned.
pub fn create_polyfills_loader(
    config: &LoaderConfig,
    minifier: Option<&dyn Minifier>,
) -> Result<String> {
    let polyfills = resolve_polyfills(config, minifier)?;
    let script = generate_loader_script(config, &polyfills)?;

    if !config.polyfills.minify {
        return Ok(script);
    }

    let Some(minifier) = minifier else {
        return Err(LoaderError::MinifierNotConfigured);
    };
    let output = minifier.minify(&script).map_err(|e| LoaderError::Minify {
        name: "polyfills loader".to_string(),
        reason: e.to_string(),
    })?;

    if output.code.is_empty() {
        tracing::warn!("Minifier returned no output for the loader script, keeping it unminified");
        return Ok(script);
    }

    Ok(output.code)
}
