//! Lesson Engine - slide playback for LessonFlow

mod autoplay;
mod clock;
mod engine;
mod error;
mod events;
mod narration;
mod navigation;
mod renderer;
pub mod runtime;
mod simulation;
mod state;
mod timer;

pub use autoplay::{AdvanceRequested, AdvanceTrigger, AutoplayScheduler, NARRATION_COMPLETE_DELAY_MS};
pub use clock::{Clock, ManualClock};
pub use engine::PlaybackEngine;
pub use error::{EngineError, EngineResult, NavigationError};
pub use events::{CompletionSummary, EngineEvent};
pub use narration::{tick_interval, NarrationSignal, NarrationSimulator, NarrationState};
pub use navigation::NavigationPolicy;
pub use renderer::{RendererRegistry, SlideRenderer, SlideView};
pub use runtime::{EngineHandle, EngineRuntime, TokioClock};
pub use simulation::{Simulation, TimedEvent};
pub use state::{PlaybackSnapshot, PlaybackState, ProgressView, SlideIndicator, SlidePhase};
pub use timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
pub use lessonflow_config::PlayerConfig;
pub use lessonflow_core::{Duration, Lesson, LessonSettings, Slide, SlideKind, Timestamp};
