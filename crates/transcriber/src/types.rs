use crate::asset::ModelSource;
use crate::module::{HookCallback, LineCallback, LocateFileCallback};
use crate::platform::HostCapabilities;
use std::sync::Arc;

/// Transcriber construction options
///
/// Only `model` is required for a useful instance; every callback defaults to
/// a no-op and `worker_path` is consulted only when `locate_file` is absent.
#[derive(Default)]
pub struct TranscriberOptions {
    /// Model reference: string path/URL or in-memory file handle
    pub model: Option<ModelSource>,

    /// Output line handler
    pub print: Option<LineCallback>,

    /// Error line handler
    pub print_err: Option<LineCallback>,

    /// Pre-init hook
    pub pre_init: Option<HookCallback>,

    /// Pre-run hook
    pub pre_run: Option<HookCallback>,

    /// Abort hook
    pub on_abort: Option<HookCallback>,

    /// Exit hook
    pub on_exit: Option<HookCallback>,

    /// Explicit file locator, overriding module asset path resolution
    pub locate_file: Option<LocateFileCallback>,

    /// Path prefix for module asset lookup when no locator is given
    pub worker_path: Option<String>,

    /// Host capability override; detected from the host when absent
    pub capabilities: Option<HostCapabilities>,
}

impl TranscriberOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model reference
    pub fn with_model(mut self, model: impl Into<ModelSource>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the output line handler
    pub fn with_print(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.print = Some(Arc::new(f));
        self
    }

    /// Set the error line handler
    pub fn with_print_err(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.print_err = Some(Arc::new(f));
        self
    }

    /// Set the pre-init hook
    pub fn with_pre_init(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.pre_init = Some(Arc::new(f));
        self
    }

    /// Set the pre-run hook
    pub fn with_pre_run(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.pre_run = Some(Arc::new(f));
        self
    }

    /// Set the abort hook
    pub fn with_on_abort(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_abort = Some(Arc::new(f));
        self
    }

    /// Set the exit hook
    pub fn with_on_exit(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_exit = Some(Arc::new(f));
        self
    }

    /// Set an explicit file locator
    pub fn with_locate_file(
        mut self,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.locate_file = Some(Arc::new(f));
        self
    }

    /// Set the worker path prefix
    pub fn with_worker_path(mut self, prefix: impl Into<String>) -> Self {
        self.worker_path = Some(prefix.into());
        self
    }

    /// Override host capabilities
    pub fn with_capabilities(mut self, capabilities: HostCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_empty() {
        let options = TranscriberOptions::new();
        assert!(options.model.is_none());
        assert!(options.print.is_none());
        assert!(options.locate_file.is_none());
        assert!(options.worker_path.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = TranscriberOptions::new()
            .with_model("path/to/my-model.bin")
            .with_worker_path("path/to/worker/");

        assert!(matches!(options.model, Some(ModelSource::Reference(ref r)) if r == "path/to/my-model.bin"));
        assert_eq!(options.worker_path.as_deref(), Some("path/to/worker/"));
    }
}
