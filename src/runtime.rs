use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Event consumed by the TUI loop
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Maps a raw terminal event to an app event.
/// Only key presses count; Windows also reports releases and repeats.
pub fn translate(event: CtEvent) -> Option<AppEvent> {
    match event {
        CtEvent::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        CtEvent::Resize(_, _) => Some(AppEvent::Resize),
        _ => None,
    }
}

/// Source of terminal events
pub trait EventSource: Send + 'static {
    /// Wait up to `timeout` for the next event
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(raw) = event::read() {
                let Some(ev) = translate(raw) else {
                    continue;
                };
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Events fed through a channel, for headless tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Interleaves terminal events with ticks on a fixed schedule.
///
/// Ticks fire every interval even while keys keep arriving, so the
/// question timer on the practice screen keeps moving during typing.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Cell<Instant>,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Cell::new(Instant::now() + ticker.interval());
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Returns the next event, or Tick once the tick deadline passes
    pub fn step(&self) -> AppEvent {
        let now = Instant::now();
        let deadline = self.next_tick.get();
        if now >= deadline {
            return self.tick();
        }

        match self.event_source.recv_timeout(deadline - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(),
            Err(RecvTimeoutError::Disconnected) => {
                // no more input will come; keep ticking at the normal pace
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
                self.tick()
            }
        }
    }

    fn tick(&self) -> AppEvent {
        self.next_tick.set(Instant::now() + self.ticker.interval());
        AppEvent::Tick
    }
}
