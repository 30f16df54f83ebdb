//! Random choices made during timetable generation, behind a seam so the
//! walk can be driven deterministically.

use rand::Rng;
use rand::rngs::ThreadRng;

use crate::models::Session;

pub trait SessionRng {
    /// Picks the preferred session for the next placement.
    fn pick_session(&mut self) -> Session;

    /// Samples a cursor advance in days, in `1..=max_gap`.
    fn pick_gap(&mut self, max_gap: u32) -> u32;
}

/// `rand`-backed source used outside tests.
pub struct RandomSessionRng<R: Rng = ThreadRng> {
    rng: R,
}

impl RandomSessionRng<ThreadRng> {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for RandomSessionRng<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomSessionRng<R> {
    /// Wraps a caller-supplied generator, e.g. a seeded one.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> SessionRng for RandomSessionRng<R> {
    fn pick_session(&mut self) -> Session {
        if self.rng.random_bool(0.5) {
            Session::Afternoon
        } else {
            Session::Morning
        }
    }

    fn pick_gap(&mut self, max_gap: u32) -> u32 {
        self.rng.random_range(1..=max_gap)
    }
}

/// Always the same session, always the same gap. Makes generation
/// reproducible for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSessionRng {
    pub session: Session,
    pub gap: u32,
}

impl SessionRng for FixedSessionRng {
    fn pick_session(&mut self) -> Session {
        self.session
    }

    fn pick_gap(&mut self, max_gap: u32) -> u32 {
        self.gap.clamp(1, max_gap)
    }
}
