//! Transcriber lifecycle controller
//!
//! Owns the native module handle and sequences the bridge lifecycle: module
//! instantiation, model asset installation into the module's virtual
//! filesystem, readiness tracking, and teardown of native resources.

use crate::asset::{self, AssetFetcher, HttpFetcher, ModelSource};
use crate::module::{ModuleConfig, ModuleConfigBuilder, ModuleLoader, SpeechModule};
use crate::platform::PlatformProbe;
use crate::types::TranscriberOptions;
use shout_common::{Result, ShoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle phase of a [`Transcriber`]
///
/// `destroy` is the only transition out of `Ready`; on a non-ready instance
/// it is a no-op. There is no transition back out of `Destroyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, init not yet invoked (or a failed init rolled back here)
    Uninitialized,
    /// Init in flight
    Initializing,
    /// Module live and model installed
    Ready,
    /// Native resources released; the instance cannot be reused
    Destroyed,
}

/// Bridge between a host application and the embedded transcription module
///
/// One transcriber owns at most one module instance; the handle is never
/// shared, so teardown can invalidate it unconditionally. `init` and
/// `destroy` both take `&mut self`, which rules out a destroy racing an
/// in-flight init.
pub struct Transcriber {
    model: Option<ModelSource>,
    model_internal_filename: Option<String>,
    module: Option<Box<dyn SpeechModule>>,
    module_config: ModuleConfig,
    loader: Arc<dyn ModuleLoader>,
    fetcher: Option<Arc<dyn AssetFetcher>>,
    probe: PlatformProbe,
    runtime_initialized: Arc<AtomicBool>,
    state: LifecycleState,
}

impl Transcriber {
    /// Create a transcriber
    ///
    /// Builds the module configuration, wiring the runtime-ready hook to the
    /// internal readiness flag, and records the host capabilities. Touches
    /// neither the network nor the module. Never fails.
    pub fn new(loader: Arc<dyn ModuleLoader>, options: TranscriberOptions) -> Self {
        let probe = match options.capabilities {
            Some(caps) => PlatformProbe::new(Some(caps)),
            None => PlatformProbe::from_host(),
        };

        let mut builder = ModuleConfigBuilder::new();
        if let Some(cb) = options.print {
            builder = builder.print(move |line| (cb)(line));
        }
        if let Some(cb) = options.print_err {
            builder = builder.print_err(move |line| (cb)(line));
        }
        if let Some(cb) = options.pre_init {
            builder = builder.pre_init(move || (cb)());
        }
        if let Some(cb) = options.pre_run {
            builder = builder.pre_run(move || (cb)());
        }
        if let Some(cb) = options.on_abort {
            builder = builder.on_abort(move || (cb)());
        }
        if let Some(cb) = options.on_exit {
            builder = builder.on_exit(move || (cb)());
        }
        if let Some(cb) = options.locate_file {
            builder = builder.locate_file(move |file| (cb)(file));
        }
        if let Some(prefix) = options.worker_path {
            builder = builder.worker_path(prefix);
        }

        // The ready hook must be wired before instantiation can begin, or the
        // readiness transition is unobservable.
        let runtime_initialized = Arc::new(AtomicBool::new(false));
        let flag = runtime_initialized.clone();
        let module_config = builder.build(move || {
            debug!("Module runtime initialized");
            flag.store(true, Ordering::Release);
        });

        Self {
            model: options.model,
            model_internal_filename: None,
            module: None,
            module_config,
            loader,
            fetcher: None,
            probe,
            runtime_initialized,
            state: LifecycleState::Uninitialized,
        }
    }

    /// Replace the asset fetcher used for string-referenced models
    pub fn with_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Instantiate the module and install the model
    ///
    /// Suspends on the module's own asynchronous bootstrap and on asset
    /// retrieval. On failure the state rolls back to `Uninitialized` and no
    /// model file is left installed; the module handle, if it was already
    /// created, is retained so the instance stays destroyable.
    pub async fn init(&mut self) -> Result<()> {
        if self.state == LifecycleState::Destroyed {
            return Err(ShoutError::initialization(
                "Transcriber has been destroyed; construct a new instance",
            ));
        }

        let source = self
            .model
            .clone()
            .ok_or_else(|| ShoutError::initialization("No model configured"))?;

        info!("Initializing transcriber");
        self.state = LifecycleState::Initializing;

        match self.bootstrap(source).await {
            Ok(()) => {
                self.state = LifecycleState::Ready;
                info!("Transcriber ready");
                Ok(())
            }
            Err(e) => {
                self.state = LifecycleState::Uninitialized;
                Err(e)
            }
        }
    }

    async fn bootstrap(&mut self, source: ModelSource) -> Result<()> {
        // A previous cycle's module must be released before a new one
        // replaces it, or its native allocation would be orphaned.
        self.release_module();

        // The default HTTP fetcher only exists for string references; a
        // memory file never touches the network.
        let fetcher: Option<Arc<dyn AssetFetcher>> = if let Some(f) = &self.fetcher {
            Some(Arc::clone(f))
        } else if matches!(source, ModelSource::Reference(_)) {
            let f: Arc<dyn AssetFetcher> = Arc::new(HttpFetcher::new()?);
            self.fetcher = Some(Arc::clone(&f));
            Some(f)
        } else {
            None
        };

        debug!("Instantiating native module");
        let module = self.loader.instantiate(self.module_config.clone()).await?;

        // Handle stored before asset resolution so a failed fetch still
        // leaves a destroyable module behind.
        let module = self.module.insert(module);

        let asset = asset::resolve(&source, fetcher.as_deref()).await?;

        module.fs_create_data_file("/", &asset.filename, &asset.bytes, true, true)?;
        info!(
            "Model installed into module filesystem: /{} ({} bytes)",
            asset.filename,
            asset.bytes.len()
        );
        self.model_internal_filename = Some(asset.filename);

        Ok(())
    }

    /// Tear down native resources
    ///
    /// On a ready instance: releases the module's native memory, unlinks the
    /// installed model file, clears the readiness flag and both the model and
    /// module handles. On anything else: no observable effect, so defensive
    /// cleanup call sites never need to check state first.
    pub fn destroy(&mut self) {
        if !self.runtime_initialized.load(Ordering::Acquire) {
            debug!("destroy called on a non-ready instance; nothing to do");
            return;
        }

        info!("Destroying transcriber");

        self.release_module();
        self.model = None;
        self.state = LifecycleState::Destroyed;
    }

    /// Free the owned module, unlink its installed model file, and clear the
    /// readiness flag
    fn release_module(&mut self) {
        if let Some(module) = self.module.take() {
            module.free();
            if let Some(filename) = self.model_internal_filename.take() {
                if let Err(e) = module.fs_unlink(&filename) {
                    warn!("Failed to unlink model file {}: {}", filename, e);
                }
            }
        }
        self.runtime_initialized.store(false, Ordering::Release);
    }

    /// Whether the module runtime has signalled readiness
    pub fn is_runtime_initialized(&self) -> bool {
        self.runtime_initialized.load(Ordering::Acquire)
    }

    /// Short name the model is stored under inside the module's filesystem,
    /// set once init has resolved the asset
    pub fn model_internal_filename(&self) -> Option<&str> {
        self.model_internal_filename.as_deref()
    }

    /// The user-supplied model reference, until destroy clears it
    pub fn model(&self) -> Option<&ModelSource> {
        self.model.as_ref()
    }

    /// Configuration record handed to module instantiation
    pub fn module_config(&self) -> &ModuleConfig {
        &self.module_config
    }

    /// Safe concurrency level for the engine on this host
    pub fn max_threads(&self) -> usize {
        self.probe.max_threads()
    }

    /// Current lifecycle phase
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether a module handle is currently owned
    pub fn has_module(&self) -> bool {
        self.module.is_some()
    }
}
