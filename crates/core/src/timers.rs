//! Deadlines for the host's time-driven transitions.

use std::time::{Duration, Instant};

/// The host-side timer set: one deadline per time-driven transition.
///
/// Only armed on the peer that drives the clock. Deadlines are one-shot:
/// checking an expired deadline disarms it, the driver re-arms on the
/// next tick if the phase still calls for it.
#[derive(Debug, Default,)]
pub struct HostTimers {
    chant_step: Option<Instant,>,
    resolve:    Option<Instant,>,
    cpu_think:  Option<Instant,>,
}

impl HostTimers {
    /// Arm the next chant step, unless already armed.
    pub fn arm_chant_step(&mut self, after: Duration,) {
        self.chant_step.get_or_insert(Instant::now() + after,);
    }

    /// Arm the resolution delay, unless already armed.
    pub fn arm_resolve(&mut self, after: Duration,) {
        self.resolve.get_or_insert(Instant::now() + after,);
    }

    /// Arm the next CPU move, unless already armed.
    pub fn arm_cpu_think(&mut self, after: Duration,) {
        self.cpu_think.get_or_insert(Instant::now() + after,);
    }

    /// Whether the chant step deadline expired; disarms it if so.
    pub fn chant_step_due(&mut self,) -> bool {
        Self::take_due(&mut self.chant_step,)
    }

    /// Whether the resolution deadline expired; disarms it if so.
    pub fn resolve_due(&mut self,) -> bool {
        Self::take_due(&mut self.resolve,)
    }

    /// Whether the CPU think deadline expired; disarms it if so.
    pub fn cpu_think_due(&mut self,) -> bool {
        Self::take_due(&mut self.cpu_think,)
    }

    /// Drop the chant-round deadlines.
    ///
    /// Must run whenever the phase leaves `Chanting`, so a stale timer
    /// never fires a transition into a reset state.
    pub fn clear_round(&mut self,) {
        self.chant_step = None;
        self.resolve = None;
    }

    /// Drop every deadline.
    pub fn clear_all(&mut self,) {
        self.clear_round();
        self.cpu_think = None;
    }

    fn take_due(slot: &mut Option<Instant,>,) -> bool {
        match slot {
            Some(deadline,) if *deadline <= Instant::now() => {
                *slot = None;
                true
            },
            _ => false,
        }
    }
}
