use crate::controller::VirtualController;
use crate::devices::joypad_layout::{MAX_CONTROLLERS, MIN_CONTROLLERS};
use crate::devices::{EventSink, GamepadBackend};
use crate::error::{CreationError, LookupError};
use tracing::{error, info, warn};

enum Slot<S: EventSink> {
    Live(VirtualController<S>),
    /// Creation failed at startup; the index stays unusable.
    Failed(CreationError),
}

/// Owns 1..=16 controllers indexed `0..len()`.
///
/// Dropping the pool tears down whatever [`ControllerPool::shutdown`] did not.
pub struct ControllerPool<S: EventSink> {
    slots: Vec<Slot<S>>,
}

/// Clamps a requested controller count into `MIN_CONTROLLERS..=MAX_CONTROLLERS`.
pub fn clamp_controller_count(requested: i64) -> usize {
    if requested < MIN_CONTROLLERS as i64 {
        warn!(requested, min = MIN_CONTROLLERS, "controller count below minimum, raising it");
        MIN_CONTROLLERS
    } else if requested > MAX_CONTROLLERS as i64 {
        warn!(requested, max = MAX_CONTROLLERS, "controller count above maximum, lowering it");
        MAX_CONTROLLERS
    } else {
        requested as usize
    }
}

impl<S: EventSink> ControllerPool<S> {
    /// Creates controllers `0..count` in order. A failed index is logged and
    /// left unusable; startup carries on with the rest.
    pub fn start<B>(backend: &mut B, requested: i64) -> Self
    where
        B: GamepadBackend<Sink = S>,
    {
        let count = clamp_controller_count(requested);
        info!(count, "starting controller pool");

        let slots: Vec<Slot<S>> = (0..count)
            .map(|index| match VirtualController::create(backend, index) {
                Ok(ctrl) => Slot::Live(ctrl),
                Err(e) => {
                    error!(
                        index,
                        error = %e,
                        "unable to create controller; check permissions on /dev/uinput"
                    );
                    Slot::Failed(e)
                }
            })
            .collect();

        let pool = Self { slots };
        info!(live = pool.live_count(), count, "controller pool ready");
        pool
    }

    /// Number of slots, live or failed.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding a created controller.
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Live(_)))
            .count()
    }

    /// Why the slot at `index` failed, if it did.
    pub fn creation_error(&self, index: usize) -> Option<&CreationError> {
        match self.slots.get(index) {
            Some(Slot::Failed(e)) => Some(e),
            _ => None,
        }
    }

    pub fn device(&self, index: usize) -> Result<&VirtualController<S>, LookupError> {
        let count = self.slots.len();
        match self.slots.get(index) {
            Some(Slot::Live(ctrl)) => Ok(ctrl),
            Some(Slot::Failed(_)) => Err(LookupError::DeviceNotCreated { index }),
            None => Err(LookupError::InvalidIndex { index, count }),
        }
    }

    pub fn device_mut(&mut self, index: usize) -> Result<&mut VirtualController<S>, LookupError> {
        let count = self.slots.len();
        match self.slots.get_mut(index) {
            Some(Slot::Live(ctrl)) => Ok(ctrl),
            Some(Slot::Failed(_)) => Err(LookupError::DeviceNotCreated { index }),
            None => Err(LookupError::InvalidIndex { index, count }),
        }
    }

    /// Runs `f` against the controller at `index`.
    pub fn with_device<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut VirtualController<S>) -> R,
    ) -> Result<R, LookupError> {
        self.device_mut(index).map(f)
    }

    pub fn live_mut(&mut self) -> impl Iterator<Item = &mut VirtualController<S>> {
        self.slots.iter_mut().filter_map(|s| match s {
            Slot::Live(ctrl) => Some(ctrl),
            Slot::Failed(_) => None,
        })
    }

    /// Resets every live controller. A failure is logged and the rest still
    /// get reset. Returns how many resets succeeded.
    pub fn reset_all(&mut self) -> usize {
        let mut ok = 0;
        for ctrl in self.live_mut() {
            match ctrl.reset() {
                Ok(()) => ok += 1,
                Err(e) => warn!(index = ctrl.index(), error = %e, "reset failed"),
            }
        }
        ok
    }

    /// Destroys every live controller, continuing past failures.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.slots.is_empty() {
            return;
        }
        let total = self.slots.len();
        let mut destroyed = 0;
        for slot in self.slots.drain(..) {
            if let Slot::Live(ctrl) = slot {
                let index = ctrl.index();
                match ctrl.destroy() {
                    Ok(()) => destroyed += 1,
                    Err(e) => error!(index, error = %e, "failed to destroy controller"),
                }
            }
        }
        info!(destroyed, total, "controller pool shut down");
    }
}

impl<S: EventSink> Drop for ControllerPool<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::recording::RecordingBackend;
    use proptest::prelude::*;

    #[test]
    fn clamps_to_bounds() {
        assert_eq!(clamp_controller_count(-3), 1);
        assert_eq!(clamp_controller_count(0), 1);
        assert_eq!(clamp_controller_count(1), 1);
        assert_eq!(clamp_controller_count(16), 16);
        assert_eq!(clamp_controller_count(17), 16);
        assert_eq!(clamp_controller_count(i64::MAX), 16);
    }

    #[test]
    fn lookup_distinguishes_failed_and_missing_slots() {
        let mut backend = RecordingBackend::new().unavailable_at(1);
        let mut pool = ControllerPool::start(&mut backend, 3);

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.live_count(), 2);
        assert!(pool.device(0).is_ok());
        assert_eq!(
            pool.device(1).err(),
            Some(LookupError::DeviceNotCreated { index: 1 })
        );
        assert_eq!(
            pool.device_mut(3).err(),
            Some(LookupError::InvalidIndex { index: 3, count: 3 })
        );
        assert!(matches!(
            pool.creation_error(1),
            Some(CreationError::ResourceUnavailable { index: 1, .. })
        ));
        assert!(pool.creation_error(0).is_none());
        assert!(pool.device(2).is_ok());
    }

    #[test]
    fn drop_tears_down_once() {
        let mut backend = RecordingBackend::new();
        let journal = backend.journal();
        {
            let _pool = ControllerPool::start(&mut backend, 2);
        }
        assert_eq!(journal.destroyed(), vec![0, 1]);
    }

    #[test]
    fn reset_all_skips_failed_slots() {
        let mut backend = RecordingBackend::new().rejected_at(0);
        let journal = backend.journal();
        let mut pool = ControllerPool::start(&mut backend, 2);
        journal.unplug(1);
        assert_eq!(pool.reset_all(), 0);

        let mut backend = RecordingBackend::new();
        let mut pool = ControllerPool::start(&mut backend, 4);
        assert_eq!(pool.reset_all(), 4);
    }

    proptest! {
        #[test]
        fn start_matches_clamped_count(n in -100i64..100) {
            let mut backend = RecordingBackend::new();
            let journal = backend.journal();
            let pool = ControllerPool::start(&mut backend, n);
            let expected = n.clamp(1, 16) as usize;
            prop_assert_eq!(pool.len(), expected);
            prop_assert_eq!(journal.created(), (0..expected).collect::<Vec<_>>());
        }
    }
}
