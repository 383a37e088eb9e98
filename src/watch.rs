use crate::{CredentialCache, Error, Result};
use log::{info, warn};
use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

/// CredentialFileWatcher bridges filesystem events on the shared credentials
/// file to cache invalidation.
///
/// The watch is established on the file's parent directory so that atomic
/// replace (delete + recreate) keeps being observed; events are filtered back
/// down to the target file name. The watcher runs as one background task for
/// the lifetime of the extension and performs no work beyond dispatching
/// `invalidate` calls.
///
/// Watcher runtime errors are logged and absorbed; only [`stop`] ends the
/// loop.
///
/// [`stop`]: CredentialFileWatcher::stop
pub struct CredentialFileWatcher {
    // Dropping the OS handle closes the event channel, which is what lets
    // the background task drain and exit.
    watcher: Option<RecommendedWatcher>,
    task: tokio::task::JoinHandle<()>,
}

/// Event kinds that mean the file's credential content may have changed:
/// creation, data writes, and renames (atomic replace). Metadata-only events
/// like chmod do not warrant an invalidation.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    )
}

impl std::fmt::Debug for CredentialFileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialFileWatcher")
            .field("running", &!self.task.is_finished())
            .finish()
    }
}

impl CredentialFileWatcher {
    /// Establish the watch and spawn the event loop.
    ///
    /// Must be called within a tokio runtime. Returns an error if the watch
    /// cannot be established; the caller decides whether that is fatal.
    pub fn spawn(path: impl AsRef<Path>, cache: Arc<CredentialCache>) -> Result<Self> {
        let path = path.as_ref();
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| {
                Error::config_invalid(format!(
                    "credentials file path {} has no file name",
                    path.display()
                ))
            })?
            .to_os_string();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // Receiver gone means we are shutting down; nothing to do.
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let task = tokio::spawn(async move {
            while let Some(res) = rx.recv().await {
                match res {
                    Ok(event) => {
                        if !is_content_change(&event.kind) {
                            continue;
                        }
                        if event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == Some(file_name.as_os_str()))
                        {
                            info!("detected change to shared credentials file, invalidating cache");
                            cache.invalidate();
                        }
                    }
                    Err(err) => {
                        warn!("credentials file watcher error: {err}");
                    }
                }
            }
        });

        Ok(Self {
            watcher: Some(watcher),
            task,
        })
    }

    /// Stop watching: release the OS handle and join the event loop.
    ///
    /// No invalidation is dispatched after this returns.
    pub async fn stop(mut self) -> Result<()> {
        drop(self.watcher.take());
        self.task
            .await
            .map_err(|e| Error::unexpected("credentials file watcher task panicked").with_source(e))
    }
}
