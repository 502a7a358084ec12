//! A shared, lazily started `git cat-file --batch` process.
//!
//! Lookups register an awaiter keyed by object id and write one request
//! line; concurrent lookups of the same id share that line. A reader task
//! feeds stdout through [`BatchParser`] and wakes awaiters as answers arrive.
//! Once nobody is waiting the process is shut down, and the next lookup
//! starts a fresh one.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};

use crate::cat_file::{BatchEvent, BatchObject, BatchParser};
use crate::error::{Error, Result};
use crate::types::ObjectId;

const READ_BUFFER_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone)]
enum Reply {
    Found(BatchObject),
    Missing,
    Failed(String),
}

#[derive(Debug)]
struct Session {
    generation: u64,
    requests: mpsc::UnboundedSender<ObjectId>,
}

#[derive(Debug, Default)]
struct Inner {
    awaiters: HashMap<ObjectId, Vec<oneshot::Sender<Reply>>>,
    session: Option<Session>,
    generation: u64,
}

impl Inner {
    /// Drop the session if it is still the one identified by `generation`.
    fn end_session(&mut self, generation: u64) -> bool {
        if self.session.as_ref().is_some_and(|s| s.generation == generation) {
            self.session = None;
            true
        } else {
            false
        }
    }
}

/// Handle to the batch process for one repository.
#[derive(Debug, Clone)]
pub struct CatFileProcess {
    binary: PathBuf,
    repo: PathBuf,
    inner: Arc<Mutex<Inner>>,
}

impl CatFileProcess {
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, repo: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            repo: repo.into(),
            inner: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a process is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock().session.is_some()
    }

    /// Look up one object.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if git cannot be started, [`Error::Protocol`] if
    /// its output is malformed, or [`Error::BatchClosed`] if it exits while
    /// the lookup is pending.
    pub async fn lookup(&self, id: &ObjectId) -> Result<Option<BatchObject>> {
        let receiver = {
            let mut inner = self.lock();
            let (sender, receiver) = oneshot::channel();

            if let Some(waiting) = inner.awaiters.get_mut(id) {
                tracing::trace!(%id, "joining pending cat-file lookup");
                waiting.push(sender);
            } else {
                if inner.session.is_none() {
                    inner.generation += 1;
                    let session = self.spawn(inner.generation)?;
                    inner.session = Some(session);
                }
                inner.awaiters.insert(id.clone(), vec![sender]);

                let sent = inner
                    .session
                    .as_ref()
                    .is_some_and(|session| session.requests.send(id.clone()).is_ok());
                if !sent {
                    inner.awaiters.remove(id);
                    return Err(Error::BatchClosed);
                }
            }
            receiver
        };

        match receiver.await {
            Ok(Reply::Found(object)) => Ok(Some(object)),
            Ok(Reply::Missing) => Ok(None),
            Ok(Reply::Failed(message)) => Err(Error::Protocol(message)),
            Err(_) => Err(Error::BatchClosed),
        }
    }

    fn spawn(&self, generation: u64) -> Result<Session> {
        tracing::debug!(repo = %self.repo.display(), generation, "starting git cat-file --batch");

        let mut child = Command::new(&self.binary)
            .arg("-C")
            .arg(&self.repo)
            .args(["cat-file", "--batch"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let (Some(mut stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(Error::BatchClosed);
        };
        let (requests, mut pending) = mpsc::unbounded_channel::<ObjectId>();

        // Writer: owns stdin and the child. Closing the request channel
        // closes stdin, which makes git exit.
        tokio::spawn(async move {
            while let Some(id) = pending.recv().await {
                let line = format!("{id}\n");
                if let Err(e) = stdin.write_all(line.as_bytes()).await {
                    tracing::debug!(error = %e, "cat-file stdin closed");
                    break;
                }
                if stdin.flush().await.is_err() {
                    break;
                }
            }
            drop(stdin);
            let _ = child.wait().await;
            tracing::debug!(generation, "git cat-file --batch exited");
        });

        tokio::spawn(read_responses(Arc::clone(&self.inner), generation, stdout));

        Ok(Session {
            generation,
            requests,
        })
    }
}

async fn read_responses(inner: Arc<Mutex<Inner>>, generation: u64, mut stdout: ChildStdout) {
    let mut parser = BatchParser::new();
    let mut buffer = vec![0_u8; READ_BUFFER_SIZE];

    loop {
        let read = stdout.read(&mut buffer).await;
        let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);

        let n = match read {
            Ok(0) | Err(_) => {
                // Unanswered awaiters see their sender dropped.
                if inner.end_session(generation) {
                    inner.awaiters.clear();
                }
                return;
            }
            Ok(n) => n,
        };

        match parser.feed(&buffer[..n]) {
            Ok(events) => {
                for event in events {
                    let reply = match &event {
                        BatchEvent::Found(object) => Reply::Found(object.clone()),
                        BatchEvent::Missing(_) => Reply::Missing,
                    };
                    // Answers for ids nobody waits on are stale; drop them.
                    for waiter in inner.awaiters.remove(event.id()).unwrap_or_default() {
                        let _ = waiter.send(reply.clone());
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cat-file stream corrupted, discarding process");
                if inner.end_session(generation) {
                    for (_, waiters) in inner.awaiters.drain() {
                        for waiter in waiters {
                            let _ = waiter.send(Reply::Failed(e.to_string()));
                        }
                    }
                }
                return;
            }
        }

        if inner.awaiters.is_empty() && parser.is_idle() && inner.end_session(generation) {
            tracing::debug!(generation, "no pending lookups, stopping cat-file process");
            return;
        }
    }
}
