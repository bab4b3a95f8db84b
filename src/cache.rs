use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::instance::InstanceTemplate;

/// Memoizes committed instance templates by configuration fingerprint.
///
/// Building and committing a template is the expensive part of provisioning
/// (image pull, volume setup, pre-start commands), so logically identical
/// participants share one template and clone it. Each fingerprint is backed
/// by its own `OnceCell`: concurrent callers for the same fingerprint block
/// on a single build and share its result, while different fingerprints
/// build independently. A failed build leaves the cell empty, so the next
/// caller retries instead of observing a poisoned entry.
///
/// The cache is owned by the test-run context and lives for one run; entries
/// are never evicted. The number of distinct fingerprints is bounded by the
/// participant kind/version combinations in the topology.
#[derive(Default)]
pub struct TemplateCache {
    entries: Mutex<HashMap<Fingerprint, Arc<OnceCell<InstanceTemplate>>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the template for `fingerprint`, invoking `build` at most once
    /// per fingerprint across all callers of this cache.
    pub async fn resolve<F, Fut>(&self, fingerprint: Fingerprint, build: F) -> Result<InstanceTemplate>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<InstanceTemplate>>,
    {
        let cell = {
            let mut entries = self.entries.lock().unwrap();
            Arc::clone(entries.entry(fingerprint).or_default())
        };
        let template = cell.get_or_try_init(build).await?;
        trace!(fingerprint = %fingerprint, template = %template.name(), "resolved instance template");
        Ok(template.clone())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
