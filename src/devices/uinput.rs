use super::joypad_layout::{AxisId, AxisTuning, ButtonId, tuned_axis_range};
use super::{EventSink, GamepadBackend, VirtualControllerConfig};
use crate::error::CreationError;
use evdev::{
    AttributeSet, BusType, InputEvent, InputId, Key, UinputAbsSetup,
    uinput::{VirtualDevice, VirtualDeviceBuilder},
};
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Backend over `/dev/uinput`, driven through evdev's builder.
///
/// A raw-ioctl variant (`UI_SET_*BIT` + `uinput_user_dev` write +
/// `UI_DEV_CREATE`) would register the same capabilities; this crate only
/// ships the evdev one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UinputBackend {
    tuning: AxisTuning,
}

impl UinputBackend {
    pub fn new(tuning: AxisTuning) -> Self {
        Self { tuning }
    }
}

impl GamepadBackend for UinputBackend {
    type Sink = UinputGamepad;

    fn create(&mut self, config: &VirtualControllerConfig) -> Result<UinputGamepad, CreationError> {
        let index = config.index;
        let registration = |source: io::Error| CreationError::RegistrationFailed { index, source };

        let mut keys = AttributeSet::<Key>::new();
        for button in ButtonId::ALL {
            keys.insert(button.key());
        }

        let id = &config.identity;
        // The builder owns the uinput fd; any early return below drops it and
        // closes the descriptor, so a failed attempt leaks nothing.
        let mut builder = VirtualDeviceBuilder::new()
            .map_err(|source| CreationError::ResourceUnavailable { index, source })?
            .name(&id.name)
            .input_id(InputId::new(BusType(id.bus_type), id.vendor, id.product, id.version))
            .with_keys(&keys)
            .map_err(registration)?;

        for axis in AxisId::ALL {
            let info = tuned_axis_range(axis, self.tuning).abs_info();
            let setup = UinputAbsSetup::new(axis.abs_type(), info);
            builder = builder.with_absolute_axis(&setup).map_err(registration)?;
        }

        let device = builder.build().map_err(registration)?;
        debug!(index, name = %id.name, vendor = id.vendor, "uinput device registered");

        Ok(UinputGamepad {
            index,
            device,
            batch: Vec::with_capacity(ButtonId::COUNT + AxisId::COUNT),
        })
    }
}

/// A registered uinput joypad.
///
/// evdev terminates every `emit` with its own `SYN_REPORT`, so writes are
/// batched here and flushed as one report on `sync`.
pub struct UinputGamepad {
    index: usize,
    device: VirtualDevice,
    batch: Vec<InputEvent>,
}

impl EventSink for UinputGamepad {
    fn write(&mut self, event: InputEvent) -> io::Result<()> {
        self.batch.push(event);
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        let result = self.device.emit(&self.batch);
        self.batch.clear();
        result
    }

    fn destroy(self) -> io::Result<()> {
        if !self.batch.is_empty() {
            warn!(
                index = self.index,
                pending = self.batch.len(),
                "destroying controller with unsynced events"
            );
        }
        // Closing the uinput fd makes the kernel run UI_DEV_DESTROY.
        drop(self.device);
        Ok(())
    }

    fn dev_node(&mut self) -> Option<PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}
