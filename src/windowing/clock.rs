use std::{mem, sync::Arc, thread, time::Instant};

use flume::{Receiver, RecvTimeoutError, Sender};

use crate::driver::Driver;

/// Called from the timer thread with the generation of the deadline that
/// passed.
pub(crate) type Wake = Arc<dyn Fn(u64) + Send + Sync>;

enum TimerCmd {
    Arm { at: Instant, generation: u64 },
    Disarm,
}

/// A background thread that calls `wake` once the armed deadline passes.
/// Arming again replaces the deadline. The thread exits when the timer is
/// dropped.
pub(crate) struct FrameTimer {
    tx: Sender<TimerCmd>,
}

impl FrameTimer {
    pub fn spawn(wake: Wake) -> Option<Self> {
        let (tx, rx) = flume::unbounded();
        let spawned = thread::Builder::new()
            .name("frame-timer".into())
            .spawn(move || run_timer(rx, wake));
        match spawned {
            Ok(_) => Some(Self { tx }),
            Err(err) => {
                log::error!("failed to spawn frame timer: {err}");
                None
            }
        }
    }

    fn arm(&self, at: Instant, generation: u64) {
        let _ = self.tx.send(TimerCmd::Arm { at, generation });
    }

    fn disarm(&self) {
        let _ = self.tx.send(TimerCmd::Disarm);
    }
}

fn run_timer(rx: Receiver<TimerCmd>, wake: Wake) {
    let mut armed: Option<(Instant, u64)> = None;
    loop {
        let cmd = match armed {
            Some((at, _)) => rx.recv_deadline(at),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match cmd {
            Ok(TimerCmd::Arm { at, generation }) => armed = Some((at, generation)),
            Ok(TimerCmd::Disarm) => armed = None,
            Err(RecvTimeoutError::Timeout) => {
                if let Some((_, generation)) = armed.take() {
                    wake(generation);
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Decides when the window wants its next frame.
///
/// Frame requests from every source coalesce into the earliest deadline. A
/// deadline that has passed turns animation on; a future one arms the
/// [`FrameTimer`], started on first use. Every recomputation bumps the
/// generation, so a deadline reported for an older one is stale.
pub(crate) struct FrameClock {
    next_frame: Option<Instant>,
    animating: bool,
    timer: Option<FrameTimer>,
    armed: bool,
    generation: u64,
    wake: Wake,
}

impl FrameClock {
    pub fn new(wake: Wake) -> Self {
        Self {
            next_frame: None,
            animating: false,
            timer: None,
            armed: false,
            generation: 0,
            wake,
        }
    }

    /// Requests a frame at `at`, or as soon as possible when `None`.
    pub fn request_frame(&mut self, at: Option<Instant>) {
        let at = at.unwrap_or_else(Instant::now);
        match self.next_frame {
            Some(next) if next <= at => {}
            _ => self.next_frame = Some(at),
        }
    }

    /// Forgets the pending request; a frame is being produced.
    pub fn clear(&mut self) {
        self.next_frame = None;
    }

    /// The timer reported the deadline armed at `generation` as due.
    pub fn deadline_reached(&mut self, generation: u64, now: Instant) {
        if generation != self.generation {
            log::trace!("ignoring stale frame deadline");
            return;
        }
        self.armed = false;
        self.request_frame(Some(now));
    }

    /// Recomputes the animation state after anything affecting it changed.
    ///
    /// `driver` is `None` once the window is dead; nothing is scheduled then.
    pub fn update(&mut self, now: Instant, running: bool, driver: Option<&dyn Driver>) {
        self.generation += 1;
        let Some(driver) = driver else {
            self.disarm();
            return;
        };
        let mut animate = false;
        match (running, self.next_frame) {
            (true, Some(at)) if at <= now => {
                animate = true;
                self.disarm();
            }
            (true, Some(at)) => self.arm(at),
            _ => self.disarm(),
        }
        if animate != self.animating {
            self.animating = animate;
            driver.set_animating(animate);
        }
    }

    fn arm(&mut self, at: Instant) {
        if self.timer.is_none() {
            self.timer = FrameTimer::spawn(self.wake.clone());
        }
        if let Some(timer) = &self.timer {
            timer.arm(at, self.generation);
            self.armed = true;
        }
    }

    fn disarm(&mut self) {
        if mem::take(&mut self.armed) {
            if let Some(timer) = &self.timer {
                timer.disarm();
            }
        }
    }
}

#[cfg(test)]
impl FrameClock {
    pub fn next_frame(&self) -> Option<Instant> {
        self.next_frame
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
