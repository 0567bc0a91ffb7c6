//! Configuration types for loader generation with validation.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Mechanism the generated script uses to load an entry set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntryType {
    /// Classic script tag insertion.
    Script,
    /// Native ES module import.
    Module,
    /// Shimmed module import via `window.importShim`.
    ModuleShim,
    /// SystemJS import.
    SystemJs,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Script => "script",
            EntryType::Module => "module",
            EntryType::ModuleShim => "module-shim",
            EntryType::SystemJs => "systemjs",
        }
    }
}

impl FromStr for EntryType {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "script" => Ok(EntryType::Script),
            "module" => Ok(EntryType::Module),
            "module-shim" => Ok(EntryType::ModuleShim),
            "systemjs" => Ok(EntryType::SystemJs),
            other => Err(CoreError::TypeNotSupported(other.to_string())),
        }
    }
}

impl TryFrom<String> for EntryType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EntryType> for String {
    fn from(value: EntryType) -> Self {
        value.as_str().to_string()
    }
}

/// An ordered set of application files loaded with one mechanism.
///
/// Files must be non-empty by the time a script is generated from the set;
/// descriptor resolution alone only looks at the type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySet {
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub files: Vec<String>,
}

impl EntrySet {
    pub fn new(entry_type: EntryType, files: Vec<String>) -> Self {
        Self { entry_type, files }
    }

    /// Checks the non-empty invariant for generation.
    pub(crate) fn ensure_files(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(CoreError::EmptyEntries {
                entry_type: self.entry_type.as_str().to_string(),
            });
        }
        Ok(())
    }
}

/// Whether to load regenerator-runtime, and under which guard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegeneratorMode {
    #[default]
    Off,
    /// Load only on browsers without native module support.
    OnLegacy,
    /// Load unconditionally.
    Always,
}

/// A single polyfill to include: either one of the well-known set assembled
/// from [`PolyfillsConfig`] toggles, or a caller-supplied custom spec.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolyfillSpec {
    pub name: String,
    /// Path to the polyfill source on disk.
    pub path: Option<PathBuf>,
    /// Expression which should evaluate to true at runtime to load the
    /// polyfill; `None` loads unconditionally.
    pub test: Option<String>,
    /// Whether the polyfill must be loaded as a module-type script.
    pub module: bool,
    /// Path to the polyfill's source map. Its presence suppresses
    /// minification for this polyfill.
    pub sourcemap_path: Option<PathBuf>,
    /// npm package suggested in the error message when the source file is
    /// missing. Set on the well-known specs only.
    #[serde(skip)]
    pub install_hint: Option<&'static str>,
    /// Source shipped inside this crate instead of read from disk; takes
    /// precedence over `path`.
    #[serde(skip)]
    pub built_in_code: Option<&'static str>,
}

/// Toggles for the well-known polyfill set, plus custom polyfills and the
/// global minify/hash flags. Read once per generation call, never mutated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolyfillsConfig {
    pub core_js: bool,
    pub regenerator_runtime: RegeneratorMode,
    pub fetch: bool,
    pub webcomponents: bool,
    pub intersection_observer: bool,
    pub dynamic_import: bool,
    pub es_module_shims: bool,
    /// Use the full SystemJS build (including import maps) instead of the
    /// minimal ES-module-shim build.
    pub system_js_extended: bool,
    /// Custom polyfills, loaded before the well-known set.
    pub custom: Vec<PolyfillSpec>,
    pub minify: bool,
    pub hash: bool,
}

/// Aggregate configuration for one loader generation call. Owned by the
/// caller and treated as immutable input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Entries loaded on modern browsers.
    pub entries: EntrySet,
    /// Entries loaded on browsers without module support.
    pub legacy_entries: Option<EntrySet>,
    #[serde(default)]
    pub polyfills: PolyfillsConfig,
    /// Directory holding installed polyfill packages.
    #[serde(default = "default_modules_dir")]
    pub modules_dir: PathBuf,
}

impl LoaderConfig {
    pub fn new(entries: EntrySet) -> Self {
        Self {
            entries,
            legacy_entries: None,
            polyfills: PolyfillsConfig::default(),
            modules_dir: default_modules_dir(),
        }
    }
}

fn default_modules_dir() -> PathBuf {
    PathBuf::from("node_modules")
}
