//! Bootstrap-script assembly.
//!
//! Builds the self-contained IIFE that browsers execute: an optional script-
//! loading helper, one guarded load per polyfill, and the entry-loading code
//! gated behind the polyfill loads.

use crate::config::{EntrySet, EntryType, LoaderConfig};
use crate::error::Result;
use crate::specs::Polyfill;

// The helper resolves on error as well as on load, so one failed polyfill
// never blocks the rest of the pipeline.
const LOAD_SCRIPT_FUNCTION: &str = r"
  function loadScript(src) {
    var loaded = false, thenCb, s = document.createElement('script');
    function resolve() {
      document.head.removeChild(s);
      thenCb ? thenCb() : loaded = true;
    }
    s.src = src; s.onload = resolve;
    s.onerror = function () {
      console.error('[polyloader] failed to load script: ' + src + ' check the network tab for HTTP status.');
      resolve();
    }
    document.head.appendChild(s);
    return { then: function (cb) { loaded ? cb() : thenCb = cb; } };
  }

";

/// Generates the bootstrap script for `config` and the resolved `polyfills`.
///
/// The polyfills must be in resolver order; it becomes the load-attempt
/// order of the emitted script.
pub fn generate_loader_script(config: &LoaderConfig, polyfills: &[Polyfill]) -> Result<String> {
    config.entries.ensure_files()?;
    if let Some(legacy) = &config.legacy_entries {
        legacy.ensure_files()?;
    }

    let mut code = String::from("\n(function() {\n");
    code.push_str(load_script_helper(config, polyfills));
    code.push_str(&polyfills_loader_code(polyfills));
    code.push_str(&entries_loader_code(config, polyfills));
    code.push_str("})();\n");
    Ok(code)
}

/// The helper is only needed when something is loaded through a script tag:
/// any polyfill, or a script-typed entry set.
fn load_script_helper(config: &LoaderConfig, polyfills: &[Polyfill]) -> &'static str {
    let script_entries = config.entries.entry_type == EntryType::Script
        || config
            .legacy_entries
            .as_ref()
            .is_some_and(|entries| entries.entry_type == EntryType::Script);

    if polyfills.is_empty() && !script_entries {
        ""
    } else {
        LOAD_SCRIPT_FUNCTION
    }
}

fn polyfills_loader_code(polyfills: &[Polyfill]) -> String {
    if polyfills.is_empty() {
        return String::new();
    }

    let mut code = String::from("  var polyfills = [];\n");
    for polyfill in polyfills {
        let file_name = match &polyfill.hash {
            Some(hash) => format!("{}.{hash}.js", polyfill.name),
            None => format!("{}.js", polyfill.name),
        };
        let src = js_string(&format!("polyfills/{file_name}"));
        let load = format!("polyfills.push(loadScript({src}))");

        match &polyfill.test {
            Some(test) => code.push_str(&format!("  if ({test}) {{ {load} }}\n")),
            None => code.push_str(&format!("  {load}\n")),
        }
    }

    code
}

fn entries_loader_code(config: &LoaderConfig, polyfills: &[Polyfill]) -> String {
    let statement = entries_loader_statement(config);

    // With no polyfills, entries load straight away.
    if polyfills.is_empty() {
        return format!("{statement}\n");
    }

    // Otherwise entry loading waits until every attempted polyfill load has
    // settled; the helper's handles resolve on failure too, so Promise.all
    // acts as an all-settled join.
    format!(
        "\n  function loadEntries() {{\n    {statement}\n  }}\n\n  polyfills.length ? Promise.all(polyfills).then(loadEntries) : loadEntries();\n"
    )
}

fn entries_loader_statement(config: &LoaderConfig) -> String {
    let load = entry_set_call(&config.entries);
    match &config.legacy_entries {
        None => format!("{load};"),
        Some(legacy) => {
            let load_legacy = entry_set_call(legacy);
            format!("'noModule' in HTMLScriptElement.prototype ? {load} : {load_legacy};")
        }
    }
}

fn entry_set_call(entries: &EntrySet) -> String {
    let files: Vec<String> = entries
        .files
        .iter()
        .map(|file| clean_import_path(file))
        .collect();

    if let [file] = files.as_slice() {
        return loader_call(entries.entry_type, &js_string(file));
    }

    let list = files
        .iter()
        .map(|file| js_string(file))
        .collect::<Vec<_>>()
        .join(",");
    let call = loader_call(entries.entry_type, "entry");
    format!("[{list}].forEach(function (entry) {{ {call}; }})")
}

/// Per-type load call. The entry types are a closed set, dispatched here and
/// nowhere else.
fn loader_call(entry_type: EntryType, arg: &str) -> String {
    match entry_type {
        EntryType::Script => format!("loadScript({arg})"),
        EntryType::Module | EntryType::ModuleShim => format!("window.importShim({arg})"),
        EntryType::SystemJs => format!("System.import({arg})"),
    }
}

/// Makes a relative path explicitly relative so a script evaluator cannot
/// mistake it for a bare module name. Absolute paths and paths already
/// carrying a `./` or `../` marker are embedded unchanged.
fn clean_import_path(path: &str) -> String {
    if path.starts_with('/') || path.starts_with('.') {
        path.to_string()
    } else {
        format!("./{path}")
    }
}

/// Embeds `value` in a single-quoted JS string literal.
fn js_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
