/// Estimates drag velocity, in layout units per millisecond, from a series of drag deltas.
///
/// Each new sample is blended into the running estimate, so the estimate follows the latest
/// movement while smoothing out jittery pointer events. A pause longer than
/// [`VelocityTracker::STALE_MS`] starts over from scratch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VelocityTracker {
    velocity: f32,
    samples: u32,
    last_ms: Option<u64>,
}

impl VelocityTracker {
    pub const STALE_MS: u64 = 100;

    /// Weight of the newest sample in the running estimate.
    const SMOOTHING: f32 = 0.6;

    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the pointer moved by `delta` at `now_ms`.
    pub fn record(&mut self, delta: f32, now_ms: u64) {
        let Some(last_ms) = self.last_ms else {
            self.last_ms = Some(now_ms);
            return;
        };
        let elapsed = now_ms.saturating_sub(last_ms);
        self.last_ms = Some(now_ms);
        if elapsed > Self::STALE_MS {
            self.velocity = 0.0;
            self.samples = 0;
            return;
        }

        let instant = delta / elapsed.max(1) as f32;
        self.velocity = if self.samples == 0 {
            instant
        } else {
            Self::SMOOTHING * instant + (1.0 - Self::SMOOTHING) * self.velocity
        };
        self.samples = self.samples.saturating_add(1);
    }

    /// The current estimate. Zero when the last movement is older than [`Self::STALE_MS`].
    pub fn velocity(&self, now_ms: u64) -> f32 {
        match self.last_ms {
            Some(last_ms) if now_ms.saturating_sub(last_ms) <= Self::STALE_MS => self.velocity,
            _ => 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Momentum scrolling after a drag is released.
///
/// The velocity decays exponentially: every millisecond the offset advances by the current
/// velocity and the velocity is multiplied by `decay`. The fling is done once the velocity
/// drops below `min_velocity` or the offset hits one of the bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fling {
    pub offset: f32,
    pub velocity: f32,
    pub decay: f32,
    pub min_velocity: f32,
    pub min_offset: f32,
    pub max_offset: f32,
    last_ms: u64,
    done: bool,
}

impl Fling {
    pub const DEFAULT_DECAY: f32 = 0.998;
    pub const DEFAULT_MIN_VELOCITY: f32 = 0.02;

    /// Longest stretch of time a single [`Fling::advance`] simulates. A stalled frame loop
    /// resumes the fling instead of jumping to its end.
    pub const MAX_STEP_MS: u64 = 250;

    pub fn new(offset: f32, velocity: f32, now_ms: u64) -> Self {
        Self {
            offset,
            velocity,
            decay: Self::DEFAULT_DECAY,
            min_velocity: Self::DEFAULT_MIN_VELOCITY,
            min_offset: 0.0,
            max_offset: f32::INFINITY,
            last_ms: now_ms,
            done: velocity.abs() < Self::DEFAULT_MIN_VELOCITY,
        }
    }

    pub fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay.clamp(0.0, 1.0);
        self
    }

    pub fn with_min_velocity(mut self, min_velocity: f32) -> Self {
        self.min_velocity = min_velocity;
        self.done = self.velocity.abs() < min_velocity;
        self
    }

    pub fn with_bounds(mut self, min_offset: f32, max_offset: f32) -> Self {
        self.min_offset = min_offset;
        self.max_offset = max_offset.max(min_offset);
        self
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Runs the simulation up to `now_ms` and returns the new offset.
    pub fn advance(&mut self, now_ms: u64) -> f32 {
        let steps = now_ms.saturating_sub(self.last_ms).min(Self::MAX_STEP_MS);
        self.last_ms = now_ms;

        for _ in 0..steps {
            if self.done {
                break;
            }
            self.offset += self.velocity;
            self.velocity *= self.decay;

            if self.offset <= self.min_offset || self.offset >= self.max_offset {
                self.offset = self.offset.clamp(self.min_offset, self.max_offset);
                self.done = true;
            } else if self.velocity.abs() < self.min_velocity {
                self.done = true;
            }
        }
        self.offset
    }
}
