//! Keyboard test loop: one character per action against a single controller.

use crate::devices::EventSink;
use crate::devices::joypad_layout::{AxisId, ButtonId, MAX_AXIS_VAL, MIN_AXIS_VAL};
use crate::error::{EmitError, LookupError};
use crate::pool::ControllerPool;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessAction {
    Button(ButtonId, bool),
    Axis(AxisId, i32),
}

impl HarnessAction {
    pub fn from_char(c: char) -> Option<Self> {
        let action = match c {
            'p' => HarnessAction::Button(ButtonId::A, true),
            'r' => HarnessAction::Button(ButtonId::A, false),
            'a' => HarnessAction::Axis(AxisId::X, MIN_AXIS_VAL),
            'd' => HarnessAction::Axis(AxisId::X, MAX_AXIS_VAL),
            'w' => HarnessAction::Axis(AxisId::Y, MIN_AXIS_VAL),
            's' => HarnessAction::Axis(AxisId::Y, MAX_AXIS_VAL),
            'z' => HarnessAction::Axis(AxisId::X, 0),
            'x' => HarnessAction::Axis(AxisId::Y, 0),
            'f' => HarnessAction::Axis(AxisId::Z, MAX_AXIS_VAL),
            'g' => HarnessAction::Axis(AxisId::RZ, MAX_AXIS_VAL),
            'v' => HarnessAction::Axis(AxisId::Z, 0),
            'b' => HarnessAction::Axis(AxisId::RZ, 0),
            _ => return None,
        };
        Some(action)
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Applies `action` to controller `target` and syncs it.
pub fn apply<S: EventSink>(
    pool: &mut ControllerPool<S>,
    target: usize,
    action: HarnessAction,
) -> Result<(), HarnessError> {
    let ctrl = pool.device_mut(target)?;
    match action {
        HarnessAction::Button(button, down) => ctrl.press_button(button, down)?,
        HarnessAction::Axis(axis, value) => ctrl.set_axis(axis, value)?,
    }
    ctrl.sync()?;
    Ok(())
}

/// Reads lines until EOF, applying every recognised character in order.
/// Failed actions are logged and the loop keeps going. Returns how many
/// actions were applied.
pub async fn run<R, S>(input: R, pool: &mut ControllerPool<S>, target: usize) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    S: EventSink,
{
    let mut lines = input.lines();
    let mut applied = 0;

    while let Some(line) = lines.next_line().await? {
        for c in line.chars() {
            let Some(action) = HarnessAction::from_char(c) else {
                if !c.is_whitespace() {
                    debug!(key = %c, "ignored key");
                }
                continue;
            };
            match apply(pool, target, action) {
                Ok(()) => applied += 1,
                Err(e) => warn!(controller = target, ?action, error = %e, "action failed"),
            }
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::recording::RecordingBackend;
    use evdev::EventType;

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(
            HarnessAction::from_char('p'),
            Some(HarnessAction::Button(ButtonId::A, true))
        );
        assert_eq!(
            HarnessAction::from_char('w'),
            Some(HarnessAction::Axis(AxisId::Y, MIN_AXIS_VAL))
        );
        assert_eq!(HarnessAction::from_char('q'), None);
    }

    #[tokio::test]
    async fn drives_the_target_controller() {
        let mut backend = RecordingBackend::new();
        let journal = backend.journal();
        let mut pool = ControllerPool::start(&mut backend, 2);

        let input: &[u8] = b"pr\nd q\n";
        let applied = run(input, &mut pool, 1).await.unwrap();
        assert_eq!(applied, 3);

        assert!(journal.events_for(0).is_empty());
        let events = journal.events_for(1);
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].event_type, EventType::KEY);
        assert_eq!(events[0].value, 1);
        assert_eq!(events[2].value, 0);
        assert_eq!(events[4].event_type, EventType::ABSOLUTE);
        assert_eq!(events[4].value, MAX_AXIS_VAL);
        assert!(events[5].is_sync());
    }

    #[tokio::test]
    async fn bad_target_does_not_stop_the_loop() {
        let mut backend = RecordingBackend::new();
        let mut pool = ControllerPool::start(&mut backend, 1);
        let input: &[u8] = b"ppp\n";
        assert_eq!(run(input, &mut pool, 7).await.unwrap(), 0);
    }
}
