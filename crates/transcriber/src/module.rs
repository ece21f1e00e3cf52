//! Native module boundary
//!
//! Configuration record handed to module instantiation, plus the capability
//! traits the embedded engine is reached through. The engine itself is opaque:
//! the core depends only on these traits, never on module internals.

use async_trait::async_trait;
use shout_common::Result;
use std::sync::Arc;

/// Callback receiving one line of module output
pub type LineCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Parameterless lifecycle hook
pub type HookCallback = Arc<dyn Fn() + Send + Sync>;

/// Maps a module-requested filename to the path it should be loaded from
pub type LocateFileCallback = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Configuration record consumed by module instantiation
///
/// Every callback slot is always callable, so the module can invoke any hook
/// unconditionally. The record is fixed once built; clones share the same
/// callback instances.
#[derive(Clone)]
pub struct ModuleConfig {
    /// Output line handler
    pub print: LineCallback,

    /// Error line handler
    pub print_err: LineCallback,

    /// Runs before module initialization
    pub pre_init: HookCallback,

    /// Runs before the module main loop
    pub pre_run: HookCallback,

    /// Invoked when the module aborts
    pub on_abort: HookCallback,

    /// Invoked when the module exits
    pub on_exit: HookCallback,

    /// Fired exactly once when the module runtime finishes bootstrapping.
    /// Installed by the lifecycle controller, not user-overridable.
    pub on_runtime_initialized: HookCallback,

    /// Optional override of the module's own asset path resolution
    pub locate_file: Option<LocateFileCallback>,
}

impl std::fmt::Debug for ModuleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleConfig")
            .field("locate_file", &self.locate_file.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ModuleConfig`]
///
/// Omitted callbacks default to no-ops. File-locating policy: an explicit
/// locator wins; otherwise a worker path installs a prefix-concatenating
/// locator; otherwise no override and the module default applies.
#[derive(Default)]
pub struct ModuleConfigBuilder {
    print: Option<LineCallback>,
    print_err: Option<LineCallback>,
    pre_init: Option<HookCallback>,
    pre_run: Option<HookCallback>,
    on_abort: Option<HookCallback>,
    on_exit: Option<HookCallback>,
    locate_file: Option<LocateFileCallback>,
    worker_path: Option<String>,
}

impl ModuleConfigBuilder {
    /// Create a builder with every slot unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output line handler
    pub fn print(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.print = Some(Arc::new(f));
        self
    }

    /// Set the error line handler
    pub fn print_err(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.print_err = Some(Arc::new(f));
        self
    }

    /// Set the pre-init hook
    pub fn pre_init(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.pre_init = Some(Arc::new(f));
        self
    }

    /// Set the pre-run hook
    pub fn pre_run(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.pre_run = Some(Arc::new(f));
        self
    }

    /// Set the abort hook
    pub fn on_abort(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_abort = Some(Arc::new(f));
        self
    }

    /// Set the exit hook
    pub fn on_exit(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_exit = Some(Arc::new(f));
        self
    }

    /// Set an explicit file locator, overriding any worker path
    pub fn locate_file(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.locate_file = Some(Arc::new(f));
        self
    }

    /// Set a worker path prefix, consulted only when no explicit locator is given
    pub fn worker_path(mut self, prefix: impl Into<String>) -> Self {
        self.worker_path = Some(prefix.into());
        self
    }

    /// Build the configuration, wiring the runtime-ready hook
    ///
    /// The ready hook must be in place before instantiation begins, or the
    /// readiness transition is unobservable.
    pub fn build(self, on_runtime_initialized: impl Fn() + Send + Sync + 'static) -> ModuleConfig {
        let locate_file = match (self.locate_file, self.worker_path) {
            (Some(f), _) => Some(f),
            (None, Some(prefix)) => Some(Arc::new(move |file: &str| {
                format!("{}{}", prefix, file)
            }) as LocateFileCallback),
            (None, None) => None,
        };

        ModuleConfig {
            print: self.print.unwrap_or_else(noop_line),
            print_err: self.print_err.unwrap_or_else(noop_line),
            pre_init: self.pre_init.unwrap_or_else(noop_hook),
            pre_run: self.pre_run.unwrap_or_else(noop_hook),
            on_abort: self.on_abort.unwrap_or_else(noop_hook),
            on_exit: self.on_exit.unwrap_or_else(noop_hook),
            on_runtime_initialized: Arc::new(on_runtime_initialized),
            locate_file,
        }
    }
}

fn noop_line() -> LineCallback {
    Arc::new(|_| {})
}

fn noop_hook() -> HookCallback {
    Arc::new(|| {})
}

/// Stable ABI surface of a live native module instance
///
/// Paths below refer to the module's private virtual filesystem, not the
/// host filesystem.
pub trait SpeechModule: Send {
    /// Write a file into the module's virtual filesystem
    fn fs_create_data_file(
        &self,
        parent: &str,
        filename: &str,
        data: &[u8],
        create: bool,
        persist: bool,
    ) -> Result<()>;

    /// Remove a file from the module's virtual filesystem
    fn fs_unlink(&self, filename: &str) -> Result<()>;

    /// Release the module's native memory allocation
    fn free(&self);
}

/// Instantiates the embedded engine
///
/// `instantiate` resolves only once the module's own asynchronous bootstrap
/// has completed; implementations are responsible for invoking the config's
/// `on_runtime_initialized` hook when the runtime comes up.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn instantiate(&self, config: ModuleConfig) -> Result<Box<dyn SpeechModule>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_default_slots_are_callable_noops() {
        let config = ModuleConfigBuilder::new().build(|| {});

        (config.print)("line");
        (config.print_err)("line");
        (config.pre_init)();
        (config.pre_run)();
        (config.on_abort)();
        (config.on_exit)();
        (config.on_runtime_initialized)();

        assert!(config.locate_file.is_none());
    }

    #[test]
    fn test_user_callbacks_receive_arguments_unchanged() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let hooks = Arc::new(AtomicUsize::new(0));

        let l = lines.clone();
        let h = hooks.clone();
        let config = ModuleConfigBuilder::new()
            .print(move |s| l.lock().unwrap().push(s.to_string()))
            .pre_run(move || {
                h.fetch_add(1, Ordering::SeqCst);
            })
            .build(|| {});

        (config.print)("hello");
        (config.pre_run)();

        assert_eq!(lines.lock().unwrap().as_slice(), ["hello"]);
        assert_eq!(hooks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_worker_path_installs_prefix_locator() {
        let config = ModuleConfigBuilder::new()
            .worker_path("path/to/worker/")
            .build(|| {});

        let locate = config.locate_file.expect("locator should be installed");
        assert_eq!(locate("file"), "path/to/worker/file");
    }

    #[test]
    fn test_explicit_locator_wins_over_worker_path() {
        let config = ModuleConfigBuilder::new()
            .locate_file(|file| format!("override/{}", file))
            .worker_path("path/to/worker/")
            .build(|| {});

        let locate = config.locate_file.expect("locator should be installed");
        assert_eq!(locate("file"), "override/file");
    }

    #[test]
    fn test_clones_share_callback_instances() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let config = ModuleConfigBuilder::new().build(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let clone = config.clone();
        (config.on_runtime_initialized)();
        (clone.on_runtime_initialized)();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
