//! Shout transcriber bridge
//!
//! Lifecycle manager bridging a host application to an embedded native
//! speech-transcription module: acquires a model asset, materializes it in
//! the module's private virtual filesystem, wires lifecycle callbacks, tracks
//! asynchronous readiness, and guarantees clean teardown of native resources.
//! The module's inference internals are opaque; they are reached only through
//! the [`module::SpeechModule`] and [`module::ModuleLoader`] traits.

pub mod asset;
pub mod module;
pub mod platform;
pub mod transcriber;
pub mod types;

// Re-export main types
pub use asset::{AssetFetcher, HttpFetcher, ModelFile, ModelSource, ResolvedAsset};
pub use module::{ModuleConfig, ModuleConfigBuilder, ModuleLoader, SpeechModule};
pub use platform::{HostCapabilities, PlatformProbe};
pub use transcriber::{LifecycleState, Transcriber};
pub use types::TranscriberOptions;

pub use shout_common::{Result, ShoutError};
