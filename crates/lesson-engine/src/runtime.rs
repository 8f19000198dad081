//! Tokio driver for the engine
//!
//! The engine lives on a single task. Commands arrive over an mpsc channel,
//! timers are served by sleeping until the next deadline, and every emitted
//! event is forwarded to an unbounded channel the host reads from.

use crate::clock::Clock;
use crate::engine::PlaybackEngine;
use crate::events::EngineEvent;
use crate::state::PlaybackSnapshot;
use crate::{EngineError, EngineResult};
use lessonflow_config::PlayerConfig;
use lessonflow_core::{Lesson, Timestamp};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

const COMMAND_BUFFER: usize = 32;

/// Milliseconds on the tokio clock since the driver started
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn instant_at(&self, timestamp: Timestamp) -> Instant {
        self.origin + std::time::Duration::from_millis(timestamp.as_millis())
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        let elapsed = Instant::now().saturating_duration_since(self.origin);
        Timestamp::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

enum Command {
    Load(Arc<Lesson>, oneshot::Sender<EngineResult<()>>),
    Unload,
    Next,
    Previous,
    JumpTo(usize, oneshot::Sender<EngineResult<()>>),
    SetAutoplay(bool),
    SetAudioEnabled(bool),
    PauseNarration,
    ResumeNarration,
    RestartNarration,
    Snapshot(oneshot::Sender<Option<PlaybackSnapshot>>),
    Shutdown,
}

/// Cloneable handle for sending commands to a running engine
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
}

/// A spawned engine task and its channels
pub struct EngineRuntime {
    pub handle: EngineHandle,
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
    pub task: JoinHandle<()>,
}

/// Spawns the engine on the current tokio runtime
pub fn spawn(config: PlayerConfig) -> EngineResult<EngineRuntime> {
    let clock = TokioClock::new();
    let engine = PlaybackEngine::with_config(clock, config)?;
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(run(engine, clock, command_rx, event_tx));
    log::debug!("Engine task started");

    Ok(EngineRuntime {
        handle: EngineHandle {
            commands: command_tx,
        },
        events: event_rx,
        task,
    })
}

async fn run(
    mut engine: PlaybackEngine,
    clock: TokioClock,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<EngineEvent>,
) {
    loop {
        forward(&mut engine, &events);

        let deadline = engine.next_deadline().map(|d| clock.instant_at(d));
        let timer = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => apply(&mut engine, command),
            },
            _ = timer => {
                engine.fire_due_timers();
            }
        }
    }

    engine.unload();
    forward(&mut engine, &events);
    log::debug!("Engine task stopped");
}

fn forward(engine: &mut PlaybackEngine, events: &mpsc::UnboundedSender<EngineEvent>) {
    for event in engine.drain_events() {
        if events.send(event).is_err() {
            log::trace!("Event receiver dropped, discarding event");
        }
    }
}

fn apply(engine: &mut PlaybackEngine, command: Command) {
    match command {
        Command::Load(lesson, reply) => {
            let _ = reply.send(engine.load(lesson));
        }
        Command::Unload => engine.unload(),
        Command::Next => engine.next(),
        Command::Previous => engine.previous(),
        Command::JumpTo(index, reply) => {
            let _ = reply.send(engine.jump_to(index));
        }
        Command::SetAutoplay(enabled) => engine.set_autoplay(enabled),
        Command::SetAudioEnabled(enabled) => engine.set_audio_enabled(enabled),
        Command::PauseNarration => {
            engine.pause_narration();
        }
        Command::ResumeNarration => {
            engine.resume_narration();
        }
        Command::RestartNarration => {
            engine.restart_narration();
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(engine.snapshot());
        }
        Command::Shutdown => {}
    }
}

fn stopped() -> EngineError {
    EngineError::InvalidState("engine task is not running".to_string())
}

impl EngineHandle {
    async fn send(&self, command: Command) -> EngineResult<()> {
        self.commands.send(command).await.map_err(|_| stopped())
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> EngineResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(command(tx)).await?;
        rx.await.map_err(|_| stopped())
    }

    pub async fn load(&self, lesson: impl Into<Arc<Lesson>>) -> EngineResult<()> {
        let lesson = lesson.into();
        self.request(|reply| Command::Load(lesson, reply)).await?
    }

    pub async fn unload(&self) -> EngineResult<()> {
        self.send(Command::Unload).await
    }

    pub async fn next(&self) -> EngineResult<()> {
        self.send(Command::Next).await
    }

    pub async fn previous(&self) -> EngineResult<()> {
        self.send(Command::Previous).await
    }

    pub async fn jump_to(&self, index: usize) -> EngineResult<()> {
        self.request(|reply| Command::JumpTo(index, reply)).await?
    }

    pub async fn set_autoplay(&self, enabled: bool) -> EngineResult<()> {
        self.send(Command::SetAutoplay(enabled)).await
    }

    pub async fn set_audio_enabled(&self, enabled: bool) -> EngineResult<()> {
        self.send(Command::SetAudioEnabled(enabled)).await
    }

    pub async fn pause_narration(&self) -> EngineResult<()> {
        self.send(Command::PauseNarration).await
    }

    pub async fn resume_narration(&self) -> EngineResult<()> {
        self.send(Command::ResumeNarration).await
    }

    pub async fn restart_narration(&self) -> EngineResult<()> {
        self.send(Command::RestartNarration).await
    }

    pub async fn snapshot(&self) -> EngineResult<Option<PlaybackSnapshot>> {
        self.request(Command::Snapshot).await
    }

    /// Stops the engine task; pending timers are dropped
    pub async fn shutdown(&self) -> EngineResult<()> {
        self.send(Command::Shutdown).await
    }
}
