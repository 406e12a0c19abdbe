pub mod joypad_layout;
pub mod recording;
pub mod uinput;

use crate::error::CreationError;
use evdev::InputEvent;
use joypad_layout::{DeviceIdentity, device_identity};
use std::io;
use std::path::PathBuf;

/// Construction parameters of one controller, derived from its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualControllerConfig {
    pub index: usize,
    pub identity: DeviceIdentity,
}

impl VirtualControllerConfig {
    pub fn for_index(index: usize) -> Self {
        Self {
            index,
            identity: device_identity(index),
        }
    }
}

/// One registered OS-level device that accepts event triples.
///
/// Writes are not synchronized internally: a sink must only ever be driven
/// from one thread at a time.
pub trait EventSink {
    /// Queues or writes one event. It becomes visible to readers at the next `sync`.
    fn write(&mut self, event: InputEvent) -> io::Result<()>;

    /// Emits `SYN_REPORT`, publishing everything written since the last sync.
    fn sync(&mut self) -> io::Result<()>;

    /// Unregisters the device and releases its resources.
    fn destroy(self) -> io::Result<()>
    where
        Self: Sized;

    /// `/dev/input/eventN` node backing the device, when it can be resolved.
    fn dev_node(&mut self) -> Option<PathBuf> {
        None
    }
}

/// Creates sinks. One backend kind is used per process.
pub trait GamepadBackend {
    type Sink: EventSink;

    /// Opens and registers a device for `config`. Either a fully registered
    /// sink comes back or nothing was left behind.
    fn create(&mut self, config: &VirtualControllerConfig) -> Result<Self::Sink, CreationError>;
}
