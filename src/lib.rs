//! Virtual gamepad pool: creates 1..=16 uinput joypads and turns button and
//! axis requests into the kernel's event protocol.

pub mod config;
pub mod controller;
pub mod devices;
pub mod error;
pub mod harness;
pub mod logger;
pub mod pool;

pub use controller::{ButtonState, VirtualController};
pub use devices::joypad_layout::{
    AxisId, ButtonId, MAX_AXIS_VAL, MAX_CONTROLLERS, MIN_AXIS_VAL, MIN_CONTROLLERS,
};
pub use devices::{EventSink, GamepadBackend, VirtualControllerConfig};
pub use error::{CreationError, EmitError, LookupError};
pub use pool::ControllerPool;
