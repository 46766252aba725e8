//! Per-category admission gate for mutating remote actions.
//!
//! The check-and-set happens inside one short mutex section and never spans an
//! await point, so two concurrent handlers cannot both pass the busy check.
//! The returned [`ActionPermit`] clears the flag when dropped, so every exit
//! path of the holder releases the gate. A permit only clears the admission it
//! was issued for: after an explicit [`ActionGate::release`] and a new
//! acquire, dropping the stale permit leaves the new holder in place.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct ActionGateState {
    busy: bool,
    current_action: String,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Rejection returned while another action holds the gate.
pub struct GateBusy {
    pub current_action: String,
}

#[derive(Debug, Default)]
/// Busy flag plus the label of the in-flight action.
pub struct ActionGate {
    state: Mutex<ActionGateState>,
}

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ActionGateState> {
        // Guarded fields stay consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits `label` if idle. Not re-entrant: a busy gate is left untouched.
    pub fn try_acquire(&self, label: &str) -> Result<ActionPermit<'_>, GateBusy> {
        let mut state = self.lock();
        if state.busy {
            return Err(GateBusy {
                current_action: state.current_action.clone(),
            });
        }
        state.busy = true;
        state.current_action = label.to_string();
        state.generation = state.generation.wrapping_add(1);
        Ok(ActionPermit {
            gate: self,
            generation: state.generation,
        })
    }

    /// Unconditionally clears the busy flag.
    pub fn release(&self) {
        self.lock().busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn current_action(&self) -> Option<String> {
        let state = self.lock();
        state.busy.then(|| state.current_action.clone())
    }
}

#[derive(Debug)]
#[must_use = "dropping the permit releases the gate immediately"]
pub struct ActionPermit<'a> {
    gate: &'a ActionGate,
    generation: u64,
}

impl ActionPermit<'_> {
    pub fn label(&self) -> String {
        self.gate.lock().current_action.clone()
    }
}

impl Drop for ActionPermit<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.lock();
        if state.generation == self.generation {
            state.busy = false;
        }
    }
}
