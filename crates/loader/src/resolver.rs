//! Polyfill resolution - reads sources from disk, minifies, hashes.
//!
//! This module is the impure half of polyfill handling: the ordered specs
//! come from `polyloader_core`, and each one is resolved here to a loadable
//! descriptor with its code, optional source map and optional content hash.

use std::path::Path;

use polyloader_core::{
    polyfill_specs, CoreError, LoaderConfig, Polyfill, PolyfillSpec, PolyfillsConfig,
};

use crate::error::{LoaderError, Result};
use crate::hash::content_hash;
use crate::minify::Minifier;

/// Resolves the configured polyfills to loadable descriptors, in load order.
///
/// Reads each polyfill's source (and source map, when declared) from disk,
/// minifies sources that do not ship their own map when the global `minify`
/// flag is set, and attaches a content hash when `hash` is set.
pub fn resolve_polyfills(
    config: &LoaderConfig,
    minifier: Option<&dyn Minifier>,
) -> Result<Vec<Polyfill>> {
    let specs = polyfill_specs(config)?;
    specs
        .iter()
        .map(|spec| resolve_spec(spec, &config.polyfills, minifier))
        .collect()
}

fn resolve_spec(
    spec: &PolyfillSpec,
    options: &PolyfillsConfig,
    minifier: Option<&dyn Minifier>,
) -> Result<Polyfill> {
    let mut code = read_source(spec)?;
    let mut sourcemap = match &spec.sourcemap_path {
        Some(path) => Some(read_file(path)?),
        None => None,
    };

    // A shipped source map means the source arrived already minified; only
    // sources without one go through the minifier.
    let mut minified = false;
    if sourcemap.is_none() && options.minify {
        let Some(minifier) = minifier else {
            return Err(LoaderError::MinifierNotConfigured);
        };
        let output = minifier.minify(&code).map_err(|e| LoaderError::Minify {
            name: spec.name.clone(),
            reason: e.to_string(),
        })?;
        code = output.code;
        sourcemap = output.sourcemap;
        minified = true;
    }

    let hash = options.hash.then(|| content_hash(&code));

    tracing::debug!(
        name = %spec.name,
        minified,
        hashed = hash.is_some(),
        "Resolved polyfill"
    );

    Ok(Polyfill {
        name: spec.name.clone(),
        test: spec.test.clone(),
        code,
        sourcemap,
        hash,
        module: spec.module,
    })
}

fn read_source(spec: &PolyfillSpec) -> Result<String> {
    if let Some(code) = spec.built_in_code {
        return Ok(code.to_string());
    }

    let Some(path) = &spec.path else {
        // polyfill_specs validates this; kept for exhaustiveness.
        return Err(CoreError::Configuration {
            name: spec.name.clone(),
            reason: "a polyfill needs both a name and a path".to_string(),
        }
        .into());
    };

    match read_file(path) {
        Err(LoaderError::FileNotFound { path, reason }) => match spec.install_hint {
            // A missing well-known polyfill is a configuration problem: the
            // package providing it is not installed.
            Some(package) => Err(CoreError::Configuration {
                name: spec.name.clone(),
                reason: format!(
                    "no polyfill source at {path}. Install with \"npm i -D {package}\""
                ),
            }
            .into()),
            None => Err(LoaderError::FileNotFound { path, reason }),
        },
        other => other,
    }
}

fn read_file(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(LoaderError::FileNotFound {
            path: path.display().to_string(),
            reason: "not a regular file".to_string(),
        });
    }

    std::fs::read_to_string(path).map_err(|e| LoaderError::FileNotFound {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
