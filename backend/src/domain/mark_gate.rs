//! Per-student serialisation of attendance marks.
//!
//! A mark reads the student's latest record and then inserts a new one. Two
//! marks for the same student must not interleave between those steps, or
//! both pass the window check. Manual and recognition marks share one gate.
//! The gate only covers a single process; replicas need a store-level guard.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::RegNumber;

type Slots = Arc<Mutex<HashMap<RegNumber, Arc<AsyncMutex<()>>>>>;

/// Keyed async lock over registration numbers.
#[derive(Debug, Clone, Default)]
pub struct MarkGate {
    slots: Slots,
}

impl MarkGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other mark for `reg_number` is in progress.
    pub async fn enter(&self, reg_number: &RegNumber) -> MarkPass {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(reg_number.clone()).or_default())
        };
        MarkPass {
            guard: Some(slot.lock_owned().await),
            reg_number: reg_number.clone(),
            slots: Arc::clone(&self.slots),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Held while one mark for a student is checked and written.
#[derive(Debug)]
pub struct MarkPass {
    guard: Option<OwnedMutexGuard<()>>,
    reg_number: RegNumber,
    slots: Slots,
}

impl Drop for MarkPass {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard.take();
        // Only the map holds the slot once nobody waits on it.
        if slots
            .get(&self.reg_number)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.reg_number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    fn reg(value: &str) -> RegNumber {
        RegNumber::new(value).expect("valid reg number")
    }

    #[rstest]
    #[tokio::test]
    async fn same_student_waits_for_the_holder() {
        let gate = MarkGate::new();
        let first = gate.enter(&reg("220014")).await;

        let same = reg("220014");
        let waiting = tokio::time::timeout(Duration::from_millis(50), gate.enter(&same));
        assert!(waiting.await.is_err(), "second mark should wait");

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(50), gate.enter(&reg("220014")))
            .await
            .expect("gate should open once the holder leaves");
        drop(second);
    }

    #[rstest]
    #[tokio::test]
    async fn different_students_do_not_block() {
        let gate = MarkGate::new();
        let _first = gate.enter(&reg("220014")).await;
        let other_reg = reg("220015");
        let other = tokio::time::timeout(Duration::from_millis(50), gate.enter(&other_reg));
        assert!(other.await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn idle_slots_are_released() {
        let gate = MarkGate::new();
        let pass = gate.enter(&reg("220014")).await;
        assert_eq!(gate.tracked(), 1);
        drop(pass);
        assert_eq!(gate.tracked(), 0);
    }
}
