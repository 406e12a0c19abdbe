//! Fixed button/axis catalog of the virtual joypad and the capability
//! description handed to the kernel when a device is registered.
//!
//! Nothing here touches the OS; every function is a pure mapping.

use evdev::{AbsInfo, AbsoluteAxisType, Key};

/// Minimum number of controllers a pool will hold.
pub const MIN_CONTROLLERS: usize = 1;
/// Maximum number of controllers a pool will hold.
pub const MAX_CONTROLLERS: usize = 16;

/// Lower bound of every axis.
pub const MIN_AXIS_VAL: i32 = -32767;
/// Upper bound of every axis.
pub const MAX_AXIS_VAL: i32 = 32767;

pub const DEFAULT_AXIS_FUZZ: i32 = 0;
pub const DEFAULT_AXIS_FLAT: i32 = 15;

/// `BUS_USB` from `linux/input.h`.
pub const BUS_USB: u16 = 0x03;
pub const VENDOR_BASE: u16 = 0x378;
pub const PRODUCT_ID: u16 = 0x3;
pub const VERSION_ID: u16 = 2;

/// Botones del joypad virtual, en el orden en que se declaran al kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ButtonId {
    A,
    B,
    C,
    X,
    Y,
    Z,
    TL,
    TR,
    TL2,
    TR2,
    Select,
    Start,
    Mode,
    ThumbL,
    ThumbR,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Joystick,
    Thumb,
    Thumb2,
}

impl ButtonId {
    pub const COUNT: usize = 32;

    pub const ALL: [ButtonId; Self::COUNT] = [
        ButtonId::A,
        ButtonId::B,
        ButtonId::C,
        ButtonId::X,
        ButtonId::Y,
        ButtonId::Z,
        ButtonId::TL,
        ButtonId::TR,
        ButtonId::TL2,
        ButtonId::TR2,
        ButtonId::Select,
        ButtonId::Start,
        ButtonId::Mode,
        ButtonId::ThumbL,
        ButtonId::ThumbR,
        ButtonId::DpadUp,
        ButtonId::DpadDown,
        ButtonId::DpadLeft,
        ButtonId::DpadRight,
        ButtonId::Num0,
        ButtonId::Num1,
        ButtonId::Num2,
        ButtonId::Num3,
        ButtonId::Num4,
        ButtonId::Num5,
        ButtonId::Num6,
        ButtonId::Num7,
        ButtonId::Num8,
        ButtonId::Num9,
        ButtonId::Joystick,
        ButtonId::Thumb,
        ButtonId::Thumb2,
    ];

    /// Position in [`ButtonId::ALL`] and in [`JoypadLayout::BUTTON_CODES`].
    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn key(self) -> Key {
        Key::new(button_code(self))
    }
}

/// Ejes absolutos del joypad virtual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AxisId {
    X,
    Y,
    Z,
    RX,
    RY,
    RZ,
    Hat0X,
    Hat0Y,
}

impl AxisId {
    pub const COUNT: usize = 8;

    pub const ALL: [AxisId; Self::COUNT] = [
        AxisId::X,
        AxisId::Y,
        AxisId::Z,
        AxisId::RX,
        AxisId::RY,
        AxisId::RZ,
        AxisId::Hat0X,
        AxisId::Hat0Y,
    ];

    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn abs_type(self) -> AbsoluteAxisType {
        match self {
            AxisId::X => AbsoluteAxisType::ABS_X,
            AxisId::Y => AbsoluteAxisType::ABS_Y,
            AxisId::Z => AbsoluteAxisType::ABS_Z,
            AxisId::RX => AbsoluteAxisType::ABS_RX,
            AxisId::RY => AbsoluteAxisType::ABS_RY,
            AxisId::RZ => AbsoluteAxisType::ABS_RZ,
            AxisId::Hat0X => AbsoluteAxisType::ABS_HAT0X,
            AxisId::Hat0Y => AbsoluteAxisType::ABS_HAT0Y,
        }
    }
}

/// Layout del joypad: códigos evdev reales, indexados por `ButtonId`/`AxisId`.
pub struct JoypadLayout;

impl JoypadLayout {
    pub const BUTTON_CODES: [u16; ButtonId::COUNT] = [
        0x130, // BTN_A
        0x131, // BTN_B
        0x132, // BTN_C
        0x133, // BTN_X
        0x134, // BTN_Y
        0x135, // BTN_Z
        0x136, // BTN_TL
        0x137, // BTN_TR
        0x138, // BTN_TL2
        0x139, // BTN_TR2
        0x13a, // BTN_SELECT
        0x13b, // BTN_START
        0x13c, // BTN_MODE
        0x13d, // BTN_THUMBL
        0x13e, // BTN_THUMBR
        0x220, // BTN_DPAD_UP
        0x221, // BTN_DPAD_DOWN
        0x222, // BTN_DPAD_LEFT
        0x223, // BTN_DPAD_RIGHT
        0x100, // BTN_0
        0x101, // BTN_1
        0x102, // BTN_2
        0x103, // BTN_3
        0x104, // BTN_4
        0x105, // BTN_5
        0x106, // BTN_6
        0x107, // BTN_7
        0x108, // BTN_8
        0x109, // BTN_9
        0x120, // BTN_JOYSTICK
        0x121, // BTN_THUMB
        0x122, // BTN_THUMB2
    ];

    pub const AXIS_CODES: [u16; AxisId::COUNT] = [
        0x00, // ABS_X
        0x01, // ABS_Y
        0x02, // ABS_Z
        0x03, // ABS_RX
        0x04, // ABS_RY
        0x05, // ABS_RZ
        0x10, // ABS_HAT0X
        0x11, // ABS_HAT0Y
    ];
}

pub fn button_code(button: ButtonId) -> u16 {
    JoypadLayout::BUTTON_CODES[button.slot()]
}

pub fn axis_code(axis: AxisId) -> u16 {
    JoypadLayout::AXIS_CODES[axis.slot()]
}

/// Fuzz/flat pair applied to every axis of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisTuning {
    pub fuzz: i32,
    pub flat: i32,
}

impl Default for AxisTuning {
    fn default() -> Self {
        Self {
            fuzz: DEFAULT_AXIS_FUZZ,
            flat: DEFAULT_AXIS_FLAT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
    pub fuzz: i32,
    pub flat: i32,
}

impl AxisRange {
    pub fn abs_info(&self) -> AbsInfo {
        // value, min, max, fuzz, flat, resolution
        AbsInfo::new(0, self.min, self.max, self.fuzz, self.flat, 0)
    }
}

/// Domain of `axis` with the default tuning.
pub fn axis_range(axis: AxisId) -> AxisRange {
    tuned_axis_range(axis, AxisTuning::default())
}

pub fn tuned_axis_range(_axis: AxisId, tuning: AxisTuning) -> AxisRange {
    // All axes share one domain so deadzones stay consistent across the device.
    AxisRange {
        min: MIN_AXIS_VAL,
        max: MAX_AXIS_VAL,
        fuzz: tuning.fuzz,
        flat: tuning.flat,
    }
}

/// Identity a device reports on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub bus_type: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
    pub name: String,
}

/// Deterministic identity for the controller at `index`. The vendor id is
/// what keeps sibling devices apart, so it scales with the index.
pub fn device_identity(index: usize) -> DeviceIdentity {
    let vendor = u16::try_from(index + 1)
        .ok()
        .and_then(|n| VENDOR_BASE.checked_mul(n))
        .unwrap_or(u16::MAX);

    DeviceIdentity {
        bus_type: BUS_USB,
        vendor,
        product: PRODUCT_ID,
        version: VERSION_ID,
        name: format!("Joypad {}", index),
    }
}

/// Scales a normalized value in `-1.0..=1.0` to the axis domain, truncating
/// toward zero. Values outside the normalized range saturate.
pub fn scale_normalized(value: f64) -> i32 {
    (value.clamp(-1.0, 1.0) * f64::from(MAX_AXIS_VAL)) as i32
}

/// Axis value for `percent` of the way from `min` to `max` (both normalized).
pub fn axis_from_percent(min: f64, max: f64, percent: f64) -> i32 {
    let t = percent / 100.0;
    scale_normalized(min + (max - min) * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn button_codes_are_unique() {
        let codes: HashSet<u16> = ButtonId::ALL.iter().map(|&b| button_code(b)).collect();
        assert_eq!(codes.len(), ButtonId::COUNT);
    }

    #[test]
    fn axis_codes_are_unique_and_match_evdev() {
        let codes: HashSet<u16> = AxisId::ALL.iter().map(|&a| axis_code(a)).collect();
        assert_eq!(codes.len(), AxisId::COUNT);
        for axis in AxisId::ALL {
            assert_eq!(axis.abs_type().0, axis_code(axis));
        }
    }

    #[test]
    fn catalog_order_matches_slots() {
        for (i, b) in ButtonId::ALL.iter().enumerate() {
            assert_eq!(b.slot(), i);
        }
        for (i, a) in AxisId::ALL.iter().enumerate() {
            assert_eq!(a.slot(), i);
        }
        assert_eq!(button_code(ButtonId::A), 0x130);
        assert_eq!(button_code(ButtonId::DpadRight), 0x223);
        assert_eq!(button_code(ButtonId::Thumb2), 0x122);
        assert_eq!(ButtonId::Start.key(), Key::BTN_START);
    }

    #[test]
    fn every_axis_shares_one_range() {
        let first = axis_range(AxisId::X);
        assert_eq!(first.min, MIN_AXIS_VAL);
        assert_eq!(first.max, MAX_AXIS_VAL);
        for axis in AxisId::ALL {
            assert_eq!(axis_range(axis), first);
        }
    }

    #[test]
    fn identity_for_first_slot() {
        let id = device_identity(0);
        assert_eq!(id.name, "Joypad 0");
        assert_eq!(id.vendor, 0x378);
        assert_eq!(id.product, 0x3);
        assert_eq!(id.version, 2);
        assert_eq!(id.bus_type, BUS_USB);
        assert_eq!(device_identity(15).vendor, 0x3780);
    }

    #[test]
    fn percent_mapping_truncates() {
        assert_eq!(axis_from_percent(0.0, 1.0, 50.0), 16383);
        assert_eq!(axis_from_percent(0.0, 1.0, 100.0), MAX_AXIS_VAL);
        assert_eq!(axis_from_percent(0.0, -1.0, 100.0), MIN_AXIS_VAL);
        assert_eq!(axis_from_percent(0.0, 1.0, 0.0), 0);
        assert_eq!(scale_normalized(4.0), MAX_AXIS_VAL);
    }

    proptest! {
        #[test]
        fn identities_are_distinct(a in 0usize..MAX_CONTROLLERS, b in 0usize..MAX_CONTROLLERS) {
            prop_assume!(a != b);
            prop_assert_ne!(device_identity(a).vendor, device_identity(b).vendor);
            prop_assert_ne!(device_identity(a).name, device_identity(b).name);
        }

        #[test]
        fn identity_is_deterministic(i in 0usize..MAX_CONTROLLERS) {
            prop_assert_eq!(device_identity(i), device_identity(i));
        }

        #[test]
        fn percent_stays_in_domain(min in -1.0f64..=1.0, max in -1.0f64..=1.0, pct in 0.0f64..=100.0) {
            let v = axis_from_percent(min, max, pct);
            prop_assert!((MIN_AXIS_VAL..=MAX_AXIS_VAL).contains(&v));
        }
    }
}
