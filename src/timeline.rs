//! Frame-driven scheduling.
//!
//! Delayed effects are queued on a [`Timeline`] and released by the frame
//! update that crosses their due time, so a sequence can be stepped in tests
//! by feeding it deltas instead of waiting on a clock.

/// One-shot events due at an offset from the timeline's start.
#[derive(Debug)]
pub struct Timeline<E> {
    now: f32,
    pending: Vec<(f32, u64, E)>,
    next_seq: u64,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self {
            now: 0.0,
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds advanced so far.
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Queue `event` to fire `delay` seconds from now.
    pub fn schedule(&mut self, delay: f32, event: E) {
        let due = self.now + delay.max(0.0);
        self.pending.push((due, self.next_seq, event));
        self.next_seq += 1;
    }

    /// Advance by `dt` and return every event that came due, earliest first.
    /// Events due at the same instant keep their scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<E> {
        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }
        let now = self.now;
        let mut due: Vec<(f32, u64, E)> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].0 <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, e)| e).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Repeating tick with a fixed period.
#[derive(Clone, Debug)]
pub struct Interval {
    period: f32,
    acc: f32,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            acc: 0.0,
        }
    }

    /// Number of periods completed during this step.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.acc += dt;
        let mut fired = 0;
        while self.acc >= self.period {
            self.acc -= self.period;
            fired += 1;
        }
        fired
    }

    pub fn reset(&mut self) {
        self.acc = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_in_due_order() {
        let mut tl = Timeline::new();
        tl.schedule(0.3, "b");
        tl.schedule(0.1, "a");
        tl.schedule(0.3, "c");
        assert!(tl.advance(0.05).is_empty());
        assert_eq!(tl.advance(0.5), vec!["a", "b", "c"]);
        assert!(tl.is_idle());
    }

    #[test]
    fn schedule_is_relative_to_now() {
        let mut tl = Timeline::new();
        tl.advance(1.0);
        tl.schedule(0.5, 1);
        assert!(tl.advance(0.4).is_empty());
        assert_eq!(tl.advance(0.2), vec![1]);
    }

    #[test]
    fn interval_counts_whole_periods() {
        let mut iv = Interval::new(0.25);
        assert_eq!(iv.tick(0.2), 0);
        assert_eq!(iv.tick(0.1), 1);
        assert_eq!(iv.tick(0.5), 2);
        assert_eq!(iv.tick(-1.0), 0);
    }
}
