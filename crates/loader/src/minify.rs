//! Minifier seam.
//!
//! Minification is delegated to an external tool. Implementors wrap whichever
//! minifier the surrounding build pipeline ships; this crate only consumes
//! the output.

/// Output of one minifier invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinifiedOutput {
    pub code: String,
    /// Source map generated by the minifier, when the tool produces one.
    pub sourcemap: Option<String>,
}

/// External JavaScript minifier.
pub trait Minifier: Send + Sync {
    fn minify(
        &self,
        source: &str,
    ) -> std::result::Result<MinifiedOutput, Box<dyn std::error::Error + Send + Sync>>;
}
