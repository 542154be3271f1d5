//! Gesture-gated stage machine
//!
//! Stages only move forward. A gesture must be held for a run of
//! consecutive frames before it confirms; confirmation locks the machine
//! until its own timed sequence unlocks the next stage.
//!
//! Timers are plain data evaluated against a caller-supplied timestamp, so
//! the whole choreography runs on one logical thread and tests drive it
//! with a virtual clock. Side effects are reported as [`StageEvent`]s.

use serde::{Deserialize, Serialize};

use super::gesture::{Hand, gesture_satisfied};
use crate::settings::Tunables;

/// Milliseconds on the session clock
pub type Millis = u64;

/// Narrative stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Waiting for a pinch
    One,
    /// Waiting for a raised open hand
    Two,
    /// Finale (terminal)
    Three,
}

impl Stage {
    /// 1-based panel id
    pub fn id(&self) -> u8 {
        match self {
            Stage::One => 1,
            Stage::Two => 2,
            Stage::Three => 3,
        }
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::One => Some(Stage::Two),
            Stage::Two => Some(Stage::Three),
            Stage::Three => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

/// Side effects requested by the machine, applied by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// Spawn `amount` particles in every celebratory pool
    Celebrate { amount: u32 },
    HidePanel(Stage),
    ShowPanel(Stage),
    /// Gesture held long enough; the machine is now locked
    Confirmed { from: Stage },
    /// `stage` is now current
    Advanced { to: Stage },
}

/// What a scheduled task does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Bounded fireworks show; cancelled when `remaining` hits zero
    Fireworks { remaining: u32 },
    /// Unlock into the next stage
    Advance { to: Stage },
    /// Repeating burst that is never cancelled
    Finale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedTask {
    pub due: Millis,
    pub interval: Millis,
    pub kind: TaskKind,
}

#[derive(Debug, Clone)]
pub struct StageMachine {
    tunables: Tunables,
    stage: Stage,
    locked: bool,
    hold_count: u32,
    tasks: Vec<TimedTask>,
}

impl StageMachine {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            tunables: tunables.clone(),
            stage: Stage::One,
            locked: false,
            hold_count: 0,
            tasks: Vec::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn hold_count(&self) -> u32 {
        self.hold_count
    }

    pub fn tasks(&self) -> &[TimedTask] {
        &self.tasks
    }

    /// True once the never-ending finale has been scheduled
    pub fn finale_running(&self) -> bool {
        self.tasks.iter().any(|t| t.kind == TaskKind::Finale)
    }

    /// Run due timers, then classify and evaluate one tracking frame
    pub fn on_frame(&mut self, hand: Option<&Hand>, now: Millis, events: &mut Vec<StageEvent>) {
        self.advance(now, events);
        if self.locked || self.stage.is_terminal() {
            return;
        }
        let satisfied = gesture_satisfied(self.stage, hand, &self.tunables);
        log::trace!("Stage {} gesture: {}", self.stage.id(), satisfied);
        self.on_gesture(satisfied, now, events);
    }

    /// Feed one classifier result. No-op while locked or terminal.
    pub fn on_gesture(&mut self, satisfied: bool, now: Millis, events: &mut Vec<StageEvent>) {
        if self.locked || self.stage.is_terminal() {
            return;
        }

        if !satisfied {
            if self.hold_count > 0 {
                log::debug!("Hold broken at {} frames", self.hold_count);
            }
            self.hold_count = 0;
            return;
        }

        self.hold_count += 1;
        // A zero period disables micro-bursts
        if self.hold_count.checked_rem(self.tunables.micro_burst_every) == Some(0) {
            events.push(StageEvent::Celebrate {
                amount: self.tunables.micro_burst_amount,
            });
        }
        if self.hold_count >= self.tunables.hold_frames {
            self.confirm(now, events);
        }
    }

    fn confirm(&mut self, now: Millis, events: &mut Vec<StageEvent>) {
        let from = self.stage;
        log::info!(
            "Stage {} gesture confirmed after {} frames",
            from.id(),
            self.hold_count
        );
        self.locked = true;
        self.hold_count = 0;
        events.push(StageEvent::Confirmed { from });
        events.push(StageEvent::HidePanel(from));

        let t = &self.tunables;
        match from {
            Stage::One => {
                if t.fireworks_count > 0 {
                    self.tasks.push(TimedTask {
                        due: now + t.fireworks_interval_ms.max(1),
                        interval: t.fireworks_interval_ms.max(1),
                        kind: TaskKind::Fireworks { remaining: t.fireworks_count },
                    });
                }
                self.tasks.push(TimedTask {
                    due: now + t.stage_advance_delay_ms,
                    interval: 0,
                    kind: TaskKind::Advance { to: Stage::Two },
                });
            }
            Stage::Two => {
                self.stage = Stage::Three;
                events.push(StageEvent::ShowPanel(Stage::Three));
                events.push(StageEvent::Advanced { to: Stage::Three });
                self.tasks.push(TimedTask {
                    due: now + t.finale_interval_ms.max(1),
                    interval: t.finale_interval_ms.max(1),
                    kind: TaskKind::Finale,
                });
                log::info!("Finale started");
            }
            Stage::Three => {}
        }
    }

    /// Fire every task due at or before `now`, earliest first.
    ///
    /// Fireworks replay each missed occurrence (the show is bounded). The
    /// finale fires once per call and skips to its next slot after `now`.
    pub fn advance(&mut self, now: Millis, events: &mut Vec<StageEvent>) {
        loop {
            let Some(idx) = self
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= now)
                .min_by_key(|(_, t)| t.due)
                .map(|(i, _)| i)
            else {
                break;
            };
            self.fire(idx, now, events);
        }
    }

    fn fire(&mut self, idx: usize, now: Millis, events: &mut Vec<StageEvent>) {
        let burst = self.tunables.burst_amount;
        let task = &mut self.tasks[idx];
        match task.kind {
            TaskKind::Fireworks { remaining } => {
                events.push(StageEvent::Celebrate { amount: burst });
                if remaining <= 1 {
                    log::debug!("Fireworks show finished");
                    self.tasks.remove(idx);
                } else {
                    task.kind = TaskKind::Fireworks { remaining: remaining - 1 };
                    task.due += task.interval.max(1);
                }
            }
            TaskKind::Finale => {
                events.push(StageEvent::Celebrate { amount: burst });
                let interval = task.interval.max(1);
                let missed = (now - task.due) / interval;
                if missed > 0 {
                    log::debug!("Finale skipped {} missed bursts", missed);
                }
                task.due += interval * (missed + 1);
            }
            TaskKind::Advance { to } => {
                self.tasks.remove(idx);
                self.stage = to;
                self.locked = false;
                self.hold_count = 0;
                log::info!("Advanced to stage {}", to.id());
                events.push(StageEvent::ShowPanel(to));
                events.push(StageEvent::Advanced { to });
            }
        }
    }
}
