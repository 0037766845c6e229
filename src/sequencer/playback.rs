/// Playback engine - walks the shared label grid on a timer thread
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{info, warn};
use parking_lot::Mutex;

use super::{ClickKind, Label, Tick};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    StepAdvanced(usize),
    /// A labeled step was reached
    Trigger { step: usize, label: Label },
    Click(ClickKind),
}

pub struct PlaybackEngine {
    sender: Sender<PlaybackEvent>,
    receiver: Receiver<PlaybackEvent>,
    is_running: Arc<AtomicBool>,
    metronome: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            sender,
            receiver,
            is_running: Arc::new(AtomicBool::new(false)),
            metronome: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Start ticking from step 0. Does nothing if already running, so
    /// repeated starts never stack timers.
    pub fn start(
        &mut self,
        step_duration: Duration,
        beat_stride: usize,
        grid_state: Arc<Mutex<Vec<Label>>>,
    ) {
        if self.is_running.swap(true, Ordering::SeqCst) {
            return;
        }

        let is_running = Arc::clone(&self.is_running);
        let metronome = Arc::clone(&self.metronome);
        let sender = self.sender.clone();
        info!("playback started: {:?} per step", step_duration);

        let spawned = thread::Builder::new()
            .name("groovepan-playback".into())
            .spawn(move || {
                let mut current_step = 0;
                let mut last_step_time = Instant::now();

                while is_running.load(Ordering::SeqCst) {
                    let now = Instant::now();

                    if now.duration_since(last_step_time) >= step_duration {
                        let tick = {
                            let labels = grid_state.lock();
                            let total = labels.len().max(1);
                            current_step %= total;
                            Tick::at(&labels, current_step, beat_stride, metronome.load(Ordering::Relaxed))
                        };

                        for event in tick_events(&tick) {
                            if sender.send(event).is_err() {
                                return;
                            }
                        }

                        current_step += 1;
                        last_step_time = now;
                    }

                    thread::sleep(Duration::from_millis(1));
                }
            });

        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                warn!("could not spawn playback thread: {}", e);
                self.is_running.store(false, Ordering::SeqCst);
            }
        }
    }

    pub fn stop(&mut self) {
        self.is_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("playback thread panicked");
            }
            info!("playback stopped");
        }
    }

    /// Stop and start again, e.g. after a tempo or grid change.
    pub fn restart(
        &mut self,
        step_duration: Duration,
        beat_stride: usize,
        grid_state: Arc<Mutex<Vec<Label>>>,
    ) {
        self.stop();
        self.start(step_duration, beat_stride, grid_state);
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn set_metronome(&self, on: bool) {
        self.metronome.store(on, Ordering::Relaxed);
    }

    pub fn poll_events(&self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Events emitted for one tick, in order.
pub fn tick_events(tick: &Tick) -> Vec<PlaybackEvent> {
    let mut events = vec![PlaybackEvent::StepAdvanced(tick.step)];
    if let Some(kind) = tick.click {
        events.push(PlaybackEvent::Click(kind));
    }
    if !tick.label.is_empty() {
        events.push(PlaybackEvent::Trigger {
            step: tick.step,
            label: tick.label,
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_events_order() {
        let tick = Tick {
            step: 0,
            label: Label::Ding,
            click: Some(ClickKind::Downbeat),
        };
        assert_eq!(
            tick_events(&tick),
            vec![
                PlaybackEvent::StepAdvanced(0),
                PlaybackEvent::Click(ClickKind::Downbeat),
                PlaybackEvent::Trigger { step: 0, label: Label::Ding },
            ]
        );

        let ghost = Tick {
            step: 3,
            label: Label::Empty,
            click: None,
        };
        assert_eq!(tick_events(&ghost), vec![PlaybackEvent::StepAdvanced(3)]);
    }

    #[test]
    fn test_engine_walks_grid() {
        let labels = Arc::new(Mutex::new(vec![Label::Ding, Label::Empty, Label::Tak, Label::Empty]));
        let mut engine = PlaybackEngine::new();
        engine.start(Duration::from_millis(2), 2, Arc::clone(&labels));
        assert!(engine.is_running());

        // A second start must not spawn another timer.
        engine.start(Duration::from_millis(2), 2, Arc::clone(&labels));

        thread::sleep(Duration::from_millis(100));
        engine.stop();
        assert!(!engine.is_running());

        let events = engine.poll_events();
        let steps: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::StepAdvanced(step) => Some(*step),
                _ => None,
            })
            .collect();
        assert!(steps.len() >= 4, "only {} steps", steps.len());
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(*step, i % 4);
        }
        assert!(events.contains(&PlaybackEvent::Trigger { step: 2, label: Label::Tak }));
        assert!(!events.iter().any(|e| matches!(e, PlaybackEvent::Click(_))));
    }

    #[test]
    fn test_metronome_clicks() {
        let labels = Arc::new(Mutex::new(vec![Label::Empty; 8]));
        let mut engine = PlaybackEngine::new();
        engine.set_metronome(true);
        engine.start(Duration::from_millis(2), 2, labels);
        thread::sleep(Duration::from_millis(60));
        engine.stop();
        let events = engine.poll_events();
        assert!(events.contains(&PlaybackEvent::Click(ClickKind::Downbeat)));
    }
}
