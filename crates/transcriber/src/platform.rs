use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Conservative thread count used when the host cannot be trusted
const FALLBACK_THREADS: usize = 2;

/// Host concurrency capabilities, the navigator-equivalent record
///
/// `user_agent` is `None` on native hosts; it only carries a value when the
/// embedding layer forwards a browser identity string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostCapabilities {
    /// Browser identity string, if the host is a browser
    pub user_agent: Option<String>,

    /// Reported hardware concurrency (logical cores)
    pub hardware_concurrency: usize,
}

impl HostCapabilities {
    /// Detect capabilities of the current native host
    ///
    /// Returns `None` when the host reports no usable concurrency value.
    pub fn detect() -> Option<Self> {
        let concurrency = std::thread::available_parallelism().ok()?.get();
        Some(Self {
            user_agent: None,
            hardware_concurrency: concurrency,
        })
    }
}

/// Platform capability probe
///
/// Decides how many threads the embedded engine may safely use.
#[derive(Debug, Clone, Default)]
pub struct PlatformProbe {
    capabilities: Option<HostCapabilities>,
}

impl PlatformProbe {
    /// Create a probe over explicit capabilities (or none)
    pub fn new(capabilities: Option<HostCapabilities>) -> Self {
        Self { capabilities }
    }

    /// Create a probe from the current host
    pub fn from_host() -> Self {
        Self::new(HostCapabilities::detect())
    }

    /// Safe concurrency level for the engine
    ///
    /// Returns the reported hardware concurrency verbatim, clamped to a fixed
    /// conservative value when capabilities are unavailable or the host is the
    /// Safari browser family. The engine's threaded code path is unstable on
    /// Safari regardless of the reported core count.
    pub fn max_threads(&self) -> usize {
        let Some(caps) = &self.capabilities else {
            debug!("Host capabilities unavailable; using {} threads", FALLBACK_THREADS);
            return FALLBACK_THREADS;
        };

        if let Some(ua) = &caps.user_agent {
            if is_safari(ua) {
                info!(
                    "Safari host detected; clamping engine threads to {}",
                    FALLBACK_THREADS
                );
                return FALLBACK_THREADS;
            }
        }

        caps.hardware_concurrency
    }
}

/// Safari family check
///
/// Chrome-based browsers also advertise "Safari" in their identity string, so
/// the Chrome tokens must be absent for a match.
fn is_safari(user_agent: &str) -> bool {
    user_agent.contains("Safari")
        && !user_agent.contains("Chrome")
        && !user_agent.contains("Chromium")
}
