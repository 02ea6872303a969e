//! Readiness gates.
//!
//! After navigation the harvest suspends until something outside the engine
//! says the page is ready: a person finishing a login, an automated login
//! flow, or the page itself showing the comment thread. Gates never time out
//! on their own; the harvest bounds the wait with `Options::gate_timeout_ms`.

use std::cell::RefCell;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info};

use crate::error::GateError;
use crate::page::Page;

/// Suspension point between navigation and harvesting.
#[async_trait(?Send)]
pub trait ReadinessGate {
    /// Resolve once the page is ready to harvest.
    ///
    /// # Errors
    ///
    /// [`GateError::Abandoned`] when the external actor gives up;
    /// [`GateError::Page`] when the page fails while being watched.
    async fn wait_ready(&self, page: &dyn Page) -> Result<(), GateError>;
}

/// A gate that is always open.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

#[async_trait(?Send)]
impl ReadinessGate for Immediate {
    async fn wait_ready(&self, _page: &dyn Page) -> Result<(), GateError> {
        Ok(())
    }
}

/// A gate opened by its paired [`ReadySignal`].
///
/// Dropping the signal without firing it abandons the gate. The gate opens
/// at most once.
///
/// # Example
///
/// ```rust
/// use rs_harvest::{ReadinessGate, SignalGate, SnapshotPage};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (gate, signal) = SignalGate::new();
/// signal.fire();
///
/// let page = SnapshotPage::new(["<html></html>"]);
/// assert!(gate.wait_ready(&page).await.is_ok());
/// # }
/// ```
#[derive(Debug)]
pub struct SignalGate {
    receiver: RefCell<Option<oneshot::Receiver<()>>>,
}

/// Opens a [`SignalGate`]. Can be moved to another task or thread.
#[derive(Debug)]
pub struct ReadySignal {
    sender: oneshot::Sender<()>,
}

impl SignalGate {
    #[must_use]
    pub fn new() -> (Self, ReadySignal) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                receiver: RefCell::new(Some(receiver)),
            },
            ReadySignal { sender },
        )
    }
}

impl ReadySignal {
    /// Open the gate.
    pub fn fire(self) {
        // The gate may already be gone; nothing is waiting then.
        let _ = self.sender.send(());
    }
}

#[async_trait(?Send)]
impl ReadinessGate for SignalGate {
    async fn wait_ready(&self, _page: &dyn Page) -> Result<(), GateError> {
        let receiver = self
            .receiver
            .borrow_mut()
            .take()
            .ok_or_else(|| GateError::Abandoned("readiness gate already used".to_string()))?;

        info!("waiting for ready signal");
        receiver
            .await
            .map_err(|_| GateError::Abandoned("ready signal dropped before firing".to_string()))
    }
}

/// A gate opened by a line of input, typically a person pressing ENTER.
///
/// End of input abandons the gate.
///
/// # Example
///
/// ```rust
/// use rs_harvest::{LineGate, ReadinessGate, SnapshotPage};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gate = LineGate::new(&b"\n"[..]);
/// let page = SnapshotPage::new(["<html></html>"]);
/// assert!(gate.wait_ready(&page).await.is_ok());
/// # }
/// ```
pub struct LineGate<R> {
    reader: Mutex<R>,
    prompt: Option<String>,
}

impl<R: AsyncBufRead + Unpin> LineGate<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
            prompt: None,
        }
    }

    /// Print `prompt` to stderr before waiting.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

impl LineGate<BufReader<Stdin>> {
    /// A gate reading from the process's stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait(?Send)]
impl<R: AsyncBufRead + Unpin> ReadinessGate for LineGate<R> {
    async fn wait_ready(&self, _page: &dyn Page) -> Result<(), GateError> {
        if let Some(prompt) = &self.prompt {
            eprintln!("{prompt}");
        }
        info!("waiting for input line");

        let mut line = String::new();
        match self.reader.lock().await.read_line(&mut line).await {
            Ok(0) => Err(GateError::Abandoned("input closed before ready".to_string())),
            Ok(_) => Ok(()),
            Err(err) => Err(GateError::Abandoned(format!("input unreadable: {err}"))),
        }
    }
}

/// A gate that opens once an element matching `selector` appears.
///
/// Polls the page every `interval` without an upper bound.
#[derive(Debug, Clone)]
pub struct ElementGate {
    pub selector: String,
    pub interval: Duration,
}

impl ElementGate {
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            interval: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

#[async_trait(?Send)]
impl ReadinessGate for ElementGate {
    async fn wait_ready(&self, page: &dyn Page) -> Result<(), GateError> {
        info!(selector = %self.selector, "waiting for element");
        loop {
            match page.find_all(&self.selector).await {
                Ok(found) if !found.is_empty() => return Ok(()),
                Ok(_) => {}
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => debug!(error = %err, "readiness probe failed"),
            }
            page.wait(self.interval).await?;
        }
    }
}
