//! Sequential command queue around an `AppController`.
//!
//! One tokio task owns the controller. It drains user commands in FIFO
//! order and, interleaved with them, the results of fetches running on
//! their own tasks. A fresh `Snapshot` is published on a watch channel
//! after every state change, so the renderer never reads a half-applied
//! command.

use std::time::Duration;

use anyhow::{Context, Result};
use shoreline_events::EventSource;
use shoreline_weather::ForecastProvider;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::controller::{AppController, FetchSender, Snapshot};

/// Commands accepted from the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init,
    RefreshWeather,
    SetFilter(String),
    Join(u64),
    LoadMore,
    DismissNotice(u64),
}

pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// Queue a command behind any already pending.
    ///
    /// # Errors
    /// Fails only if the controller task has stopped.
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .ok()
            .context("Controller task has stopped")
    }

    pub fn init(&self) -> Result<()> {
        self.send(Command::Init)
    }

    pub fn refresh_weather(&self) -> Result<()> {
        self.send(Command::RefreshWeather)
    }

    pub fn set_filter(&self, tag: impl Into<String>) -> Result<()> {
        self.send(Command::SetFilter(tag.into()))
    }

    pub fn join(&self, id: u64) -> Result<()> {
        self.send(Command::Join(id))
    }

    pub fn load_more(&self) -> Result<()> {
        self.send(Command::LoadMore)
    }

    pub fn dismiss_notice(&self, id: u64) -> Result<()> {
        self.send(Command::DismissNotice(id))
    }

    /// Latest published view model
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait for the first snapshot matching `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&Snapshot) -> bool) -> Result<Snapshot> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(predicate)
            .await
            .context("Controller task has stopped")?;
        Ok(snapshot.clone())
    }

    /// Drain queued commands and in-flight fetches, then stop the
    /// controller task.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.commands);
        self.task.await.context("Controller task panicked")
    }
}

/// Move `controller` onto its own task.
///
/// `join_latency` delays each join inside the queue, so rapid repeated
/// joins still apply one after another. Fetches never hold the queue.
pub fn spawn<W, E>(controller: AppController<W, E>, join_latency: Duration) -> ControllerHandle
where
    W: ForecastProvider + 'static,
    E: EventSource + 'static,
{
    let (commands, rx) = mpsc::unbounded_channel();
    let (tx, snapshots) = watch::channel(controller.snapshot());
    let task = tokio::spawn(run(controller, rx, tx, join_latency));

    ControllerHandle {
        commands,
        snapshots,
        task,
    }
}

async fn run<W, E>(
    mut controller: AppController<W, E>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<Snapshot>,
    join_latency: Duration,
) where
    W: ForecastProvider + 'static,
    E: EventSource + 'static,
{
    let mut revision = 0;
    let mut publish = |controller: &AppController<W, E>| {
        revision += 1;
        let mut snapshot = controller.snapshot();
        snapshot.revision = revision;
        snapshots.send_replace(snapshot);
    };

    let (fetched_tx, mut fetched) = mpsc::unbounded_channel();
    // Dropped once commands close, so `fetched` ends when the last fetch lands
    let mut fetched_tx = Some(fetched_tx);

    loop {
        tokio::select! {
            command = commands.recv(), if fetched_tx.is_some() => match command {
                Some(command) => {
                    if let Some(tx) = &fetched_tx {
                        dispatch(&mut controller, command, tx, join_latency).await;
                    }
                }
                None => {
                    tracing::debug!("Command channel closed, waiting for in-flight fetches");
                    fetched_tx = None;
                    continue;
                }
            },
            result = fetched.recv() => match result {
                Some(result) => controller.apply(result),
                None => break,
            },
        }
        publish(&controller);
    }

    tracing::debug!("Controller task exiting");
}

async fn dispatch<W, E>(
    controller: &mut AppController<W, E>,
    command: Command,
    fetched: &FetchSender,
    join_latency: Duration,
) where
    W: ForecastProvider + 'static,
    E: EventSource + 'static,
{
    tracing::debug!("Processing {:?}", command);
    match command {
        Command::Init => controller.init(fetched),
        Command::RefreshWeather => controller.refresh_weather(fetched),
        Command::SetFilter(tag) => {
            controller.set_filter(&tag);
        }
        Command::Join(id) => {
            if !join_latency.is_zero() {
                tokio::time::sleep(join_latency).await;
            }
            controller.join(id);
        }
        Command::LoadMore => {
            controller.load_more(fetched);
        }
        Command::DismissNotice(id) => controller.dismiss_notice(id),
    }
}
