//! Cancellable timers advanced by the frame loop
//!
//! Nothing fires on its own: the session calls [`Timers::advance`] once per
//! frame and reacts to whatever came due. Cancelling is always safe, even
//! for timers that already fired or were cancelled before.

use serde::{Deserialize, Serialize};

/// Handle returned by `schedule_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u32);

/// What a timer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Periodic card spawn
    SpawnTick,
    /// End of the pause after a level-up; spawning restarts
    ResumeSpawning,
    /// Active question ran out of time
    QuestionTimeout,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    /// Time left until the next fire (ms)
    remaining_ms: f64,
    /// Period for repeating timers
    period_ms: Option<f64>,
}

/// A fired timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
}

/// Active timers, kept in scheduling order
#[derive(Debug, Clone, Default)]
pub struct Timers {
    timers: Vec<Timer>,
    next_id: u32,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Fire once after `delay_ms`
    pub fn schedule_once(&mut self, kind: TimerKind, delay_ms: f64) -> TimerId {
        let id = self.allocate_id();
        self.timers.push(Timer {
            id,
            kind,
            remaining_ms: delay_ms.max(0.0),
            period_ms: None,
        });
        id
    }

    /// Fire every `period_ms`, first after one full period.
    /// A non-positive period is a configuration error.
    pub fn schedule_repeating(&mut self, kind: TimerKind, period_ms: f64) -> TimerId {
        debug_assert!(period_ms > 0.0, "repeating timer needs a positive period");
        let id = self.allocate_id();
        self.timers.push(Timer {
            id,
            kind,
            remaining_ms: period_ms,
            period_ms: Some(period_ms),
        });
        id
    }

    /// Returns true if the timer was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Milliseconds until `id` fires, if it is pending
    pub fn remaining_ms(&self, id: TimerId) -> Option<f64> {
        self.timers.iter().find(|t| t.id == id).map(|t| t.remaining_ms)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance all timers by `dt_ms` and return what fired, earliest first.
    /// A repeating timer fires once per elapsed period.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<Fired> {
        // (time into this advance at which it fired, fire)
        let mut fired: Vec<(f64, Fired)> = Vec::new();
        let mut finished: Vec<TimerId> = Vec::new();

        for timer in &mut self.timers {
            let mut elapsed = 0.0;
            let mut budget = dt_ms;
            let mut done = false;
            while timer.remaining_ms <= budget {
                budget -= timer.remaining_ms;
                elapsed += timer.remaining_ms;
                fired.push((
                    elapsed,
                    Fired {
                        id: timer.id,
                        kind: timer.kind,
                    },
                ));
                match timer.period_ms {
                    Some(period) if period > 0.0 => timer.remaining_ms = period,
                    _ => {
                        done = true;
                        break;
                    }
                }
            }
            if done {
                finished.push(timer.id);
            } else {
                timer.remaining_ms -= budget;
            }
        }

        self.timers.retain(|t| !finished.contains(&t.id));

        // Stable sort keeps scheduling order for simultaneous fires
        fired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        fired.into_iter().map(|(_, f)| f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_fires_once() {
        let mut timers = Timers::new();
        let id = timers.schedule_once(TimerKind::ResumeSpawning, 100.0);
        assert!(timers.advance(99.0).is_empty());
        let fired = timers.advance(1.0);
        assert_eq!(fired, vec![Fired { id, kind: TimerKind::ResumeSpawning }]);
        assert!(!timers.is_pending(id));
        assert!(timers.advance(1000.0).is_empty());
    }

    #[test]
    fn test_repeating_catches_up() {
        let mut timers = Timers::new();
        timers.schedule_repeating(TimerKind::SpawnTick, 100.0);
        assert_eq!(timers.advance(350.0).len(), 3);
        // 50ms carried over
        assert_eq!(timers.advance(49.0).len(), 0);
        assert_eq!(timers.advance(1.0).len(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = Timers::new();
        let id = timers.schedule_repeating(TimerKind::SpawnTick, 100.0);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.advance(1000.0).is_empty());

        let once = timers.schedule_once(TimerKind::QuestionTimeout, 10.0);
        timers.advance(10.0);
        // Already fired
        assert!(!timers.cancel(once));
    }

    #[test]
    fn test_fire_order_by_due_time() {
        let mut timers = Timers::new();
        timers.schedule_once(TimerKind::QuestionTimeout, 80.0);
        timers.schedule_once(TimerKind::ResumeSpawning, 20.0);
        let kinds: Vec<_> = timers.advance(100.0).into_iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![TimerKind::ResumeSpawning, TimerKind::QuestionTimeout]);
    }

    #[test]
    fn test_cancel_all_and_remaining() {
        let mut timers = Timers::new();
        let id = timers.schedule_once(TimerKind::QuestionTimeout, 500.0);
        timers.advance(200.0);
        assert_eq!(timers.remaining_ms(id), Some(300.0));
        timers.cancel_all();
        assert!(timers.is_empty());
        assert_eq!(timers.remaining_ms(id), None);
    }
}
