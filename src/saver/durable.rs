use crate::error::{Result, TapeSieveError};
use crate::saver::Persist;
use crate::ui::Reporter;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const ERROR_SHARING_VIOLATION: i32 = 32;
const ERROR_LOCK_VIOLATION: i32 = 33;

/// What happened to a save request at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The destination was writable; the payload is on disk.
    Written,
    /// The destination is held open elsewhere; the payload is retained and
    /// will be replayed once the watched path signals a change.
    Deferred,
    /// A write for this destination was already awaiting release; its
    /// retained payload has been replaced with this one.
    Superseded,
}

/// Persists payloads to destinations that may be transiently locked by
/// another process.
///
/// Each save request runs a small state machine: attempt the write, and on a
/// lock-class failure register a filesystem watch on the destination's
/// parent directory, retain the payload, and return immediately. A change
/// notification touching the destination fires the retained continuation
/// exactly once; the replay either succeeds or is fatal. The watch is torn
/// down on both terminal transitions. At most one write is pending per
/// destination path; a newer request for the same path supersedes the
/// retained payload without registering a second watch.
pub struct DurableSaver {
    reporter: Reporter,
    pending: Arc<Mutex<HashMap<PathBuf, Box<dyn Persist>>>>,
    tasks: Mutex<Vec<JoinHandle<Result<()>>>>,
}

impl DurableSaver {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            reporter,
            pending: Arc::new(Mutex::new(HashMap::new())),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("pending lock poisoned").len()
    }

    /// Attempts the write now; defers it if the destination is locked.
    ///
    /// Returns without blocking in every case. Lock conflicts are recovered
    /// internally and reported as a warning; any other failure is fatal for
    /// this destination.
    pub fn save_when_ready<P>(&self, payload: P, destination: PathBuf) -> Result<SaveOutcome>
    where
        P: Persist + 'static,
    {
        let payload: Box<dyn Persist> = Box::new(payload);

        {
            let mut pending = self.pending.lock().expect("pending lock poisoned");
            if let Some(slot) = pending.get_mut(&destination) {
                self.reporter.warning(&format!(
                    "Replacing the pending {} for {} with newer content.",
                    slot.kind(),
                    destination.display()
                ));
                *slot = payload;
                return Ok(SaveOutcome::Superseded);
            }
        }

        match payload.persist(&destination) {
            Ok(()) => {
                self.reporter
                    .success(&format!("File saved to {}.", destination.display()));
                Ok(SaveOutcome::Written)
            }
            Err(cause) if is_lock_conflict(&cause, &destination) => {
                self.defer(payload, destination, cause)?;
                Ok(SaveOutcome::Deferred)
            }
            Err(cause) => {
                self.reporter.critical(&format!(
                    "Failed to write {}: {}",
                    destination.display(),
                    cause
                ));
                Err(TapeSieveError::FatalWrite {
                    path: destination.display().to_string(),
                    source: cause,
                })
            }
        }
    }

    /// Registers the watch and parks the replay continuation.
    fn defer(
        &self,
        payload: Box<dyn Persist>,
        destination: PathBuf,
        cause: io::Error,
    ) -> Result<()> {
        // The destination exists (lock classification checked), so it has a
        // real parent directory to watch.
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        self.reporter.warning(&format!(
            "Unable to save {}, as it is already in use. Please close the file so changes can be made.",
            destination.display()
        ));
        self.reporter.log_debug(&cause.to_string());

        let (tx, mut rx) = mpsc::channel::<()>(4);
        let watched = destination.clone();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            let Ok(event) = event else { return };
            if signals_release(&event, &watched) {
                // One signal is enough; drop extras on a full channel.
                let _ = tx.try_send(());
            }
        })
        .map_err(|source| TapeSieveError::Watch {
            path: destination.display().to_string(),
            source,
        })?;

        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .map_err(|source| TapeSieveError::Watch {
                path: destination.display().to_string(),
                source,
            })?;

        self.pending
            .lock()
            .expect("pending lock poisoned")
            .insert(destination.clone(), payload);

        let pending = Arc::clone(&self.pending);
        let reporter = self.reporter.clone();
        let handle = tokio::spawn(async move {
            // A closed channel (watch backend gone) falls through to the
            // replay as well; the retained payload must not be stranded.
            let _ = rx.recv().await;

            // Tear the watch down before replaying so the replay's own
            // write cannot re-trigger it.
            drop(watcher);

            let payload = pending
                .lock()
                .expect("pending lock poisoned")
                .remove(&destination);
            let Some(payload) = payload else {
                return Ok(());
            };

            match payload.persist(&destination) {
                Ok(()) => {
                    reporter.success(&format!("File saved to {}.", destination.display()));
                    Ok(())
                }
                Err(cause) => {
                    reporter.critical(&format!(
                        "Still unable to write {} after the file was released: {}",
                        destination.display(),
                        cause
                    ));
                    Err(TapeSieveError::FatalWrite {
                        path: destination.display().to_string(),
                        source: cause,
                    })
                }
            }
        });

        self.tasks.lock().expect("tasks lock poisoned").push(handle);
        Ok(())
    }

    /// Awaits every pending replay; surfaces the first fatal failure.
    pub async fn drain(&self) -> Result<()> {
        let handles: Vec<_> = {
            let mut tasks = self.tasks.lock().expect("tasks lock poisoned");
            tasks.drain(..).collect()
        };

        let mut first_error = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
                Err(join_error) => {
                    if first_error.is_none() {
                        first_error = Some(TapeSieveError::Config {
                            message: format!("Deferred save task failed: {}", join_error),
                        });
                    }
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Aborts pending replays and drops their retained payloads and watches.
    pub fn abandon(&self) {
        let handles: Vec<_> = {
            let mut tasks = self.tasks.lock().expect("tasks lock poisoned");
            tasks.drain(..).collect()
        };
        for handle in handles {
            handle.abort();
        }
        self.pending.lock().expect("pending lock poisoned").clear();
    }
}

/// Whether a failed write should wait for the destination to be released.
///
/// Only sharing/busy-class failures against an existing destination qualify;
/// a missing parent directory, Unix permission errors, or a full disk are
/// not going to clear when someone closes a file.
fn is_lock_conflict(error: &io::Error, destination: &Path) -> bool {
    if !destination.exists() {
        return false;
    }

    match error.kind() {
        io::ErrorKind::WouldBlock
        | io::ErrorKind::ResourceBusy
        | io::ErrorKind::ExecutableFileBusy => true,
        // Windows reports a file held open elsewhere as access denied.
        io::ErrorKind::PermissionDenied => cfg!(windows),
        _ => {
            cfg!(windows)
                && matches!(
                    error.raw_os_error(),
                    Some(ERROR_SHARING_VIOLATION) | Some(ERROR_LOCK_VIOLATION)
                )
        }
    }
}

/// Whether a change notification plausibly means the destination's lock
/// cleared: a modify, remove, or rename touching the destination's name.
fn signals_release(event: &Event, destination: &Path) -> bool {
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Remove(_)) {
        return false;
    }
    let Some(name) = destination.file_name() else {
        return false;
    };
    event.paths.iter().any(|path| path.file_name() == Some(name))
}
