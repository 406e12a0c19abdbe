use crate::devices::joypad_layout::{
    AxisId, ButtonId, DeviceIdentity, MAX_AXIS_VAL, MIN_AXIS_VAL, axis_code, axis_from_percent,
    button_code,
};
use crate::devices::{EventSink, GamepadBackend, VirtualControllerConfig};
use crate::error::{CreationError, EmitError};
use evdev::{EventType, InputEvent};
use std::path::PathBuf;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Released,
    Pressed,
}

impl From<bool> for ButtonState {
    fn from(down: bool) -> Self {
        if down {
            ButtonState::Pressed
        } else {
            ButtonState::Released
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InputSnapshot {
    buttons: [ButtonState; ButtonId::COUNT],
    axes: [i32; AxisId::COUNT],
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            buttons: [ButtonState::Released; ButtonId::COUNT],
            axes: [0; AxisId::COUNT],
        }
    }
}

/// One live emulated joypad.
///
/// Owning a `VirtualController` means owning its OS device: it cannot be
/// cloned, and [`VirtualController::destroy`] consumes it, so a torn-down
/// controller cannot be written to again.
///
/// Button and axis changes are only observed by readers of the device after
/// [`VirtualController::sync`]. Callers driving several controllers from
/// different threads must keep each controller on one thread at a time.
pub struct VirtualController<S: EventSink> {
    config: VirtualControllerConfig,
    sink: S,
    pending: InputSnapshot,
    committed: InputSnapshot,
}

impl<S: EventSink> VirtualController<S> {
    /// Registers a new joypad for `index` with every catalog button and axis.
    pub fn create<B>(backend: &mut B, index: usize) -> Result<Self, CreationError>
    where
        B: GamepadBackend<Sink = S>,
    {
        let config = VirtualControllerConfig::for_index(index);
        let sink = backend.create(&config)?;
        info!(index, name = %config.identity.name, "controller created");

        Ok(Self {
            config,
            sink,
            pending: InputSnapshot::default(),
            committed: InputSnapshot::default(),
        })
    }

    pub fn index(&self) -> usize {
        self.config.index
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.config.identity
    }

    /// Resolves the device node. This walks sysfs synchronously.
    pub fn dev_node(&mut self) -> Option<PathBuf> {
        self.sink.dev_node()
    }

    fn write(&mut self, event_type: EventType, code: u16, value: i32) -> Result<(), EmitError> {
        trace!(index = self.config.index, ?event_type, code, value, "emit");
        self.sink
            .write(InputEvent::new(event_type, code, value))
            .map_err(|source| EmitError::Write {
                index: self.config.index,
                source,
            })
    }

    /// Queues a key-down (`down = true`) or key-up event.
    pub fn press_button(&mut self, button: ButtonId, down: bool) -> Result<(), EmitError> {
        self.write(EventType::KEY, button_code(button), i32::from(down))?;
        self.pending.buttons[button.slot()] = ButtonState::from(down);
        Ok(())
    }

    /// Queues an absolute axis value. Values are passed through unchanged,
    /// even outside `MIN_AXIS_VAL..=MAX_AXIS_VAL`.
    pub fn set_axis(&mut self, axis: AxisId, value: i32) -> Result<(), EmitError> {
        if !(MIN_AXIS_VAL..=MAX_AXIS_VAL).contains(&value) {
            debug!(index = self.config.index, ?axis, value, "axis value outside declared range");
        }
        self.write(EventType::ABSOLUTE, axis_code(axis), value)?;
        self.pending.axes[axis.slot()] = value;
        Ok(())
    }

    /// Sets `axis` to `percent` of the way between the normalized bounds
    /// `min` and `max` (each in `-1.0..=1.0`).
    pub fn set_axis_percent(
        &mut self,
        axis: AxisId,
        min: f64,
        max: f64,
        percent: f64,
    ) -> Result<(), EmitError> {
        self.set_axis(axis, axis_from_percent(min, max, percent))
    }

    /// Publishes every change queued since the last sync as one report.
    /// A failed sync drops the unsent batch, so pending state rolls back to
    /// the last committed snapshot.
    pub fn sync(&mut self) -> Result<(), EmitError> {
        if let Err(source) = self.sink.sync() {
            self.pending = self.committed;
            return Err(EmitError::Write {
                index: self.config.index,
                source,
            });
        }
        self.committed = self.pending;
        Ok(())
    }

    /// Releases every button, centers every axis and syncs.
    pub fn reset(&mut self) -> Result<(), EmitError> {
        for axis in AxisId::ALL {
            self.set_axis(axis, 0)?;
        }
        for button in ButtonId::ALL {
            self.press_button(button, false)?;
        }
        self.sync()
    }

    /// State of `button` as of the last successful sync.
    pub fn button_state(&self, button: ButtonId) -> ButtonState {
        self.committed.buttons[button.slot()]
    }

    /// Value of `axis` as of the last successful sync.
    pub fn axis_value(&self, axis: AxisId) -> i32 {
        self.committed.axes[axis.slot()]
    }

    /// Unregisters the device. The controller is consumed either way, so a
    /// failed teardown cannot be retried.
    pub fn destroy(self) -> std::io::Result<()> {
        let index = self.config.index;
        self.sink.destroy()?;
        info!(index, "controller destroyed");
        Ok(())
    }
}
