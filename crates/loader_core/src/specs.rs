//! Polyfill descriptor assembly.
//!
//! Turns the declarative [`PolyfillsConfig`] toggles into an ordered list of
//! [`PolyfillSpec`]s. The order is load-attempt order: custom polyfills
//! first, then the well-known set in a fixed sequence.

use crate::config::{EntryType, LoaderConfig, PolyfillSpec, RegeneratorMode};
use crate::error::{CoreError, Result};

/// Runtime check for browsers without `nomodule` script support, the generic
/// "legacy browser" signal.
pub const NO_MODULE_TEST: &str = "!('noModule' in HTMLScriptElement.prototype)";

const FETCH_TEST: &str = "!('fetch' in window)";

const INTERSECTION_OBSERVER_TEST: &str = "!('IntersectionObserver' in window && 'IntersectionObserverEntry' in window && 'intersectionRatio' in window.IntersectionObserverEntry.prototype)";

const WEBCOMPONENTS_TEST: &str =
    "!('attachShadow' in Element.prototype) || !('getRootNode' in Element.prototype)";

// Safari 10.1 supports custom elements natively but not the nomodule
// attribute, so it needs the es5 adapter without the rest of the bundle.
const ES5_ADAPTER_TEST: &str =
    "!('noModule' in HTMLScriptElement.prototype) && 'getRootNode' in Element.prototype";

const ES_MODULE_SHIMS_TEST: &str = "'noModule' in HTMLScriptElement.prototype";

// Dynamic import is syntax, not a function, so it cannot be feature-detected
// without executing an import statement. Constructing the probe through
// Function() keeps a syntax error from killing the whole loader script.
const DYNAMIC_IMPORT_TEST: &str = "'noModule' in HTMLScriptElement.prototype && (function () { try { Function('window.importShim = s => import(s);').call(); return true; } catch (_) { return false } })()";

/// Fallback `window.importShim` for browsers where the dynamic-import probe
/// cannot define it natively. Shipped inside this crate rather than resolved
/// from an installed package.
const DYNAMIC_IMPORT_POLYFILL: &str = r#"(function () {
  if (window.importShim) {
    return;
  }
  window.importShim = function (specifier) {
    return new Promise(function (resolve, reject) {
      var tempGlobal = '__importShim' + Math.random().toString(32).slice(2);
      var s = document.createElement('script');
      function cleanup() {
        delete window[tempGlobal];
        s.remove();
      }
      s.type = 'module';
      s.textContent =
        'import * as m from "' + specifier + '"; window["' + tempGlobal + '"] = m;';
      s.onload = function () {
        resolve(window[tempGlobal]);
        cleanup();
      };
      s.onerror = function () {
        reject(new Error('failed to import: ' + specifier));
        cleanup();
      };
      document.head.appendChild(s);
    });
  };
})();
"#;

/// A fully resolved polyfill: source loaded, optionally minified and hashed.
/// Produced once per generation call and read-only afterward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polyfill {
    pub name: String,
    /// Runtime guard; `None` loads unconditionally.
    pub test: Option<String>,
    pub code: String,
    pub sourcemap: Option<String>,
    /// Content hash of `code`, set when hashing is enabled.
    pub hash: Option<String>,
    /// Whether the polyfill must be loaded as a module-type script.
    pub module: bool,
}

/// Assembles the ordered polyfill list for `config`.
///
/// Custom polyfills come first in the caller's order, followed by the
/// well-known set. Every returned spec has a name and a source; a spec
/// missing either fails with [`CoreError::Configuration`].
pub fn polyfill_specs(config: &LoaderConfig) -> Result<Vec<PolyfillSpec>> {
    let options = &config.polyfills;
    let mut specs: Vec<PolyfillSpec> = options.custom.clone();

    if options.core_js {
        specs.push(PolyfillSpec {
            name: "core-js".to_string(),
            test: Some(NO_MODULE_TEST.to_string()),
            path: Some(config.modules_dir.join("core-js-bundle/minified.js")),
            install_hint: Some("core-js-bundle"),
            ..Default::default()
        });
    }

    if options.regenerator_runtime != RegeneratorMode::Off {
        let test = match options.regenerator_runtime {
            RegeneratorMode::Always => None,
            _ => Some(NO_MODULE_TEST.to_string()),
        };
        specs.push(PolyfillSpec {
            name: "regenerator-runtime".to_string(),
            test,
            path: Some(config.modules_dir.join("regenerator-runtime/runtime.js")),
            install_hint: Some("regenerator-runtime"),
            ..Default::default()
        });
    }

    if options.fetch {
        specs.push(PolyfillSpec {
            name: "fetch".to_string(),
            test: Some(FETCH_TEST.to_string()),
            path: Some(config.modules_dir.join("whatwg-fetch/dist/fetch.umd.js")),
            install_hint: Some("whatwg-fetch"),
            ..Default::default()
        });
    }

    // SystemJS doubles as the ES module polyfill when an entry set needs it.
    if uses_systemjs(config) {
        // Only a legacy systemjs entry set gets a nomodule guard; a modern
        // systemjs entry set needs the loader unconditionally.
        let test = if config.entries.entry_type == EntryType::SystemJs {
            None
        } else {
            Some(NO_MODULE_TEST.to_string())
        };
        let dist = if options.system_js_extended {
            // Full build, including the import maps polyfill.
            "systemjs/dist/system.min.js"
        } else {
            "systemjs/dist/s.min.js"
        };
        specs.push(PolyfillSpec {
            name: "systemjs".to_string(),
            test,
            path: Some(config.modules_dir.join(dist)),
            sourcemap_path: Some(config.modules_dir.join(format!("{dist}.map"))),
            install_hint: Some("systemjs"),
            ..Default::default()
        });
    }

    if options.dynamic_import {
        specs.push(PolyfillSpec {
            name: "dynamic-import".to_string(),
            test: Some(DYNAMIC_IMPORT_TEST.to_string()),
            built_in_code: Some(DYNAMIC_IMPORT_POLYFILL),
            ..Default::default()
        });
    }

    if options.es_module_shims {
        specs.push(PolyfillSpec {
            name: "es-module-shims".to_string(),
            test: Some(ES_MODULE_SHIMS_TEST.to_string()),
            path: Some(
                config
                    .modules_dir
                    .join("es-module-shims/dist/es-module-shims.min.js"),
            ),
            sourcemap_path: Some(
                config
                    .modules_dir
                    .join("es-module-shims/dist/es-module-shims.min.js.map"),
            ),
            module: true,
            install_hint: Some("es-module-shims"),
            ..Default::default()
        });
    }

    if options.intersection_observer {
        specs.push(PolyfillSpec {
            name: "intersection-observer".to_string(),
            test: Some(INTERSECTION_OBSERVER_TEST.to_string()),
            path: Some(
                config
                    .modules_dir
                    .join("intersection-observer/intersection-observer.js"),
            ),
            install_hint: Some("intersection-observer"),
            ..Default::default()
        });
    }

    if options.webcomponents {
        specs.push(PolyfillSpec {
            name: "webcomponents".to_string(),
            test: Some(WEBCOMPONENTS_TEST.to_string()),
            path: Some(
                config
                    .modules_dir
                    .join("@webcomponents/webcomponentsjs/webcomponents-bundle.js"),
            ),
            sourcemap_path: Some(
                config
                    .modules_dir
                    .join("@webcomponents/webcomponentsjs/webcomponents-bundle.js.map"),
            ),
            install_hint: Some("@webcomponents/webcomponentsjs"),
            ..Default::default()
        });
        specs.push(PolyfillSpec {
            name: "custom-elements-es5-adapter".to_string(),
            test: Some(ES5_ADAPTER_TEST.to_string()),
            path: Some(
                config
                    .modules_dir
                    .join("@webcomponents/webcomponentsjs/custom-elements-es5-adapter.js"),
            ),
            install_hint: Some("@webcomponents/webcomponentsjs"),
            ..Default::default()
        });
    }

    for spec in &specs {
        validate_spec(spec)?;
    }

    Ok(specs)
}

fn uses_systemjs(config: &LoaderConfig) -> bool {
    config.entries.entry_type == EntryType::SystemJs
        || config
            .legacy_entries
            .as_ref()
            .is_some_and(|entries| entries.entry_type == EntryType::SystemJs)
}

fn validate_spec(spec: &PolyfillSpec) -> Result<()> {
    if spec.name.is_empty() || (spec.path.is_none() && spec.built_in_code.is_none()) {
        let name = if spec.name.is_empty() {
            "<unnamed>".to_string()
        } else {
            spec.name.clone()
        };
        return Err(CoreError::Configuration {
            name,
            reason: "a polyfill needs both a name and a path".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EntrySet, LoaderConfig, PolyfillsConfig};
    use std::path::PathBuf;

    fn module_config(polyfills: PolyfillsConfig) -> LoaderConfig {
        let mut config = LoaderConfig::new(EntrySet::new(
            EntryType::Module,
            vec!["app.js".to_string()],
        ));
        config.polyfills = polyfills;
        config
    }

    #[test]
    fn test_returns_well_known_polyfills_in_fixed_order() {
        let config = module_config(PolyfillsConfig {
            core_js: true,
            fetch: true,
            intersection_observer: true,
            webcomponents: true,
            ..Default::default()
        });

        let specs = polyfill_specs(&config).unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "core-js",
                "fetch",
                "intersection-observer",
                "webcomponents",
                "custom-elements-es5-adapter",
            ]
        );

        assert_eq!(specs[0].test.as_deref(), Some(NO_MODULE_TEST));
        assert_eq!(specs[1].test.as_deref(), Some(FETCH_TEST));
        assert_eq!(specs[2].test.as_deref(), Some(INTERSECTION_OBSERVER_TEST));
        assert_eq!(specs[3].test.as_deref(), Some(WEBCOMPONENTS_TEST));
        assert_eq!(specs[4].test.as_deref(), Some(ES5_ADAPTER_TEST));
    }

    #[test]
    fn test_webcomponents_always_produces_bundle_then_adapter() {
        let config = module_config(PolyfillsConfig {
            webcomponents: true,
            fetch: true,
            dynamic_import: true,
            ..Default::default()
        });

        let specs = polyfill_specs(&config).unwrap();
        let webcomponents: Vec<&str> = specs
            .iter()
            .filter(|s| s.install_hint == Some("@webcomponents/webcomponentsjs"))
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(webcomponents, ["webcomponents", "custom-elements-es5-adapter"]);
    }

    #[test]
    fn test_custom_polyfills_come_first() {
        let config = module_config(PolyfillsConfig {
            core_js: true,
            custom: vec![PolyfillSpec {
                name: "polyfill-a".to_string(),
                path: Some(PathBuf::from("custom-polyfills/polyfill-a.js")),
                test: Some("'foo' in window".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });

        let specs = polyfill_specs(&config).unwrap();
        assert_eq!(specs[0].name, "polyfill-a");
        assert_eq!(specs[0].test.as_deref(), Some("'foo' in window"));
        assert_eq!(specs[1].name, "core-js");
    }

    #[test]
    fn test_systemjs_modern_entries_load_unconditionally() {
        let config = LoaderConfig::new(EntrySet::new(
            EntryType::SystemJs,
            vec!["app.js".to_string()],
        ));

        let specs = polyfill_specs(&config).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "systemjs");
        assert_eq!(specs[0].test, None);
        assert_eq!(
            specs[0].path,
            Some(PathBuf::from("node_modules/systemjs/dist/s.min.js"))
        );
    }

    #[test]
    fn test_systemjs_legacy_entries_get_nomodule_guard() {
        let mut config = LoaderConfig::new(EntrySet::new(
            EntryType::Module,
            vec!["app.js".to_string()],
        ));
        config.legacy_entries = Some(EntrySet::new(
            EntryType::SystemJs,
            vec!["legacy/app.js".to_string()],
        ));

        let specs = polyfill_specs(&config).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "systemjs");
        assert_eq!(specs[0].test.as_deref(), Some(NO_MODULE_TEST));
    }

    #[test]
    fn test_systemjs_on_both_entry_sets_is_added_once() {
        let mut config = LoaderConfig::new(EntrySet::new(
            EntryType::SystemJs,
            vec!["app.js".to_string()],
        ));
        config.legacy_entries = Some(EntrySet::new(
            EntryType::SystemJs,
            vec!["legacy/app.js".to_string()],
        ));

        let specs = polyfill_specs(&config).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "systemjs");
        assert_eq!(specs[0].test, None);
    }

    #[test]
    fn test_systemjs_extended_uses_full_build() {
        let mut config = LoaderConfig::new(EntrySet::new(
            EntryType::SystemJs,
            vec!["app.js".to_string()],
        ));
        config.polyfills.system_js_extended = true;

        let specs = polyfill_specs(&config).unwrap();
        assert_eq!(
            specs[0].path,
            Some(PathBuf::from("node_modules/systemjs/dist/system.min.js"))
        );
        assert_eq!(
            specs[0].sourcemap_path,
            Some(PathBuf::from("node_modules/systemjs/dist/system.min.js.map"))
        );
    }

    #[test]
    fn test_regenerator_runtime_guarded_by_default() {
        let config = module_config(PolyfillsConfig {
            regenerator_runtime: RegeneratorMode::OnLegacy,
            ..Default::default()
        });

        let specs = polyfill_specs(&config).unwrap();
        assert_eq!(specs[0].name, "regenerator-runtime");
        assert_eq!(specs[0].test.as_deref(), Some(NO_MODULE_TEST));
    }

    #[test]
    fn test_regenerator_runtime_always_has_no_test() {
        let config = module_config(PolyfillsConfig {
            regenerator_runtime: RegeneratorMode::Always,
            ..Default::default()
        });

        let specs = polyfill_specs(&config).unwrap();
        assert_eq!(specs[0].name, "regenerator-runtime");
        assert_eq!(specs[0].test, None);
    }

    #[test]
    fn test_dynamic_import_ships_built_in_code() {
        let config = module_config(PolyfillsConfig {
            dynamic_import: true,
            ..Default::default()
        });

        let specs = polyfill_specs(&config).unwrap();
        assert_eq!(specs[0].name, "dynamic-import");
        assert_eq!(specs[0].test.as_deref(), Some(DYNAMIC_IMPORT_TEST));
        assert!(specs[0].path.is_none());
        let code = specs[0].built_in_code.unwrap();
        assert!(code.contains("window.importShim"));
    }

    #[test]
    fn test_es_module_shims_is_module_typed() {
        let config = module_config(PolyfillsConfig {
            es_module_shims: true,
            ..Default::default()
        });

        let specs = polyfill_specs(&config).unwrap();
        assert_eq!(specs[0].name, "es-module-shims");
        assert!(specs[0].module);
        assert_eq!(specs[0].test.as_deref(), Some(ES_MODULE_SHIMS_TEST));
    }

    #[test]
    fn test_custom_polyfill_without_path_fails() {
        let config = module_config(PolyfillsConfig {
            custom: vec![PolyfillSpec {
                name: "polyfill-a".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        });

        let error = polyfill_specs(&config).unwrap_err();
        assert_eq!(
            error,
            CoreError::Configuration {
                name: "polyfill-a".to_string(),
                reason: "a polyfill needs both a name and a path".to_string(),
            }
        );
    }

    #[test]
    fn test_custom_polyfill_without_name_fails() {
        let config = module_config(PolyfillsConfig {
            custom: vec![PolyfillSpec {
                path: Some(PathBuf::from("custom-polyfills/polyfill-a.js")),
                ..Default::default()
            }],
            ..Default::default()
        });

        let error = polyfill_specs(&config).unwrap_err();
        assert!(matches!(error, CoreError::Configuration { name, .. } if name == "<unnamed>"));
    }

    #[test]
    fn test_no_polyfills_configured_yields_empty_list() {
        let config = module_config(PolyfillsConfig::default());
        assert!(polyfill_specs(&config).unwrap().is_empty());
    }
}
