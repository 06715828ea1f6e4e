//! Frame Driver
//!
//! Runs a session on a tokio task at the configured frame rate. Controls
//! arrive on an `mpsc` channel and are applied between ticks; each tick's
//! result is published on a `broadcast` channel.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::game::config::{ConfigError, Rules};
use crate::game::input::InputState;
use crate::game::state::SessionState;
use crate::game::tick::{tick, RecordedFrame};
use crate::runtime::protocol::{ControlMessage, FrameUpdate, GameSnapshot, MapView};

/// Queued controls before senders wait.
const CONTROL_CAPACITY: usize = 64;

/// Frames buffered per subscriber before it lags.
const UPDATE_CAPACITY: usize = 256;

/// Frame driver errors.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The driver task has exited.
    #[error("frame driver has stopped")]
    Stopped,
}

/// What the driver leaves behind when its loop ends.
#[derive(Debug)]
pub struct DriverOutput {
    /// Final session state.
    pub state: SessionState,
    /// Every frame fed to a playing tick, in order.
    pub recording: Vec<RecordedFrame>,
}

/// Client side of a running driver.
#[derive(Clone)]
pub struct DriverHandle {
    control_tx: mpsc::Sender<ControlMessage>,
    update_tx: broadcast::Sender<FrameUpdate>,
    map: Arc<MapView>,
}

impl DriverHandle {
    /// Queue a control for the next tick.
    pub async fn send(&self, message: ControlMessage) -> Result<(), DriverError> {
        self.control_tx
            .send(message)
            .await
            .map_err(|_| DriverError::Stopped)
    }

    /// Receive every frame published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<FrameUpdate> {
        self.update_tx.subscribe()
    }

    /// The session's terrain.
    pub fn map(&self) -> &MapView {
        &self.map
    }
}

/// Owns the session while it runs.
pub struct FrameDriver {
    state: SessionState,
    rules: Rules,
    input: InputState,
    recording: Vec<RecordedFrame>,
    control_rx: mpsc::Receiver<ControlMessage>,
    update_tx: broadcast::Sender<FrameUpdate>,
}

impl FrameDriver {
    /// Build a session and start ticking it.
    ///
    /// The loop ends once every [`DriverHandle`] is dropped; the join handle
    /// then yields the final state and the input recording.
    pub fn spawn(
        rules: Rules,
        seed: u64,
    ) -> Result<(DriverHandle, JoinHandle<DriverOutput>), ConfigError> {
        let state = SessionState::new(&rules, seed)?;
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CAPACITY);
        let (update_tx, _) = broadcast::channel(UPDATE_CAPACITY);

        let handle = DriverHandle {
            control_tx,
            update_tx: update_tx.clone(),
            map: Arc::new(MapView::from_map(&state.map)),
        };

        let driver = Self {
            state,
            rules,
            input: InputState::new(),
            recording: Vec::new(),
            control_rx,
            update_tx,
        };

        Ok((handle, tokio::spawn(driver.run())))
    }

    async fn run(mut self) -> DriverOutput {
        let mut frame_interval = interval(self.rules.frame_period());
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();

        info!(frame_rate = self.rules.frame_rate, "Frame driver started");

        loop {
            frame_interval.tick().await;

            if !self.drain_controls() {
                break;
            }

            let now = Instant::now();
            let dt = now.duration_since(last_frame);
            last_frame = now;

            let frame = self.input.take_frame();
            let was_playing = self.state.is_playing();
            let result = tick(&mut self.state, frame, dt, &self.rules);
            if was_playing {
                self.recording.push(RecordedFrame { frame, dt });
            }

            let update = FrameUpdate {
                snapshot: GameSnapshot::from_state(&self.state),
                events: result.events,
                attack: result.attack,
            };
            // No subscribers is fine
            let _ = self.update_tx.send(update);
        }

        info!(tick = self.state.tick, "Frame driver stopped");
        DriverOutput {
            state: self.state,
            recording: self.recording,
        }
    }

    /// Apply queued controls. Returns false once every handle is gone.
    fn drain_controls(&mut self) -> bool {
        loop {
            match self.control_rx.try_recv() {
                Ok(message) => self.apply_control(message),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn apply_control(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::Key { event } => self.input.apply(event),
            ControlMessage::Start => {
                if !self.state.start() {
                    debug!(phase = ?self.state.phase, "Start ignored");
                }
            }
            ControlMessage::Restart => {
                if self.state.restart(&self.rules) {
                    self.input.release_all();
                } else {
                    debug!(phase = ?self.state.phase, "Restart ignored");
                }
            }
        }
    }
}
