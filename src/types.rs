//! Core value types decoded from device registers.

use bitflags::bitflags;

/// Dimming curve applied by the device when mapping level to phase angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DimmingCurve {
    /// Linear, works with any load.
    Linear = 0,

    /// RMS-compensated, for incandescent and halogen lamps.
    Rms = 1,

    /// Logarithmic, for dimmable LED lamps.
    Log = 2,
}

impl DimmingCurve {
    /// All curves, in register-code order.
    pub const ALL: [DimmingCurve; 3] = [
        DimmingCurve::Linear,
        DimmingCurve::Rms,
        DimmingCurve::Log,
    ];

    /// Decodes a curve register value.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(DimmingCurve::Linear),
            1 => Some(DimmingCurve::Rms),
            2 => Some(DimmingCurve::Log),
            _ => None,
        }
    }

    /// Register code for this curve.
    #[inline]
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Option name used by select controls.
    pub const fn as_str(self) -> &'static str {
        match self {
            DimmingCurve::Linear => "LINEAR",
            DimmingCurve::Rms => "RMS",
            DimmingCurve::Log => "LOG",
        }
    }

    /// Parses an option name as produced by [`as_str`](Self::as_str).
    pub fn parse_from_str(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|curve| curve.as_str() == name)
    }
}

bitflags! {
    /// Contents of the status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Device finished calibration and accepts commands.
        const READY = 0x01;
        /// The last command failed, see the error register.
        const ERROR = 0x02;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status({=u8:#04x})", self.bits());
    }
}

/// Value of the error register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    /// No error.
    Ok,
    /// Malformed command.
    Syntax,
    /// Device not ready, still calibrating.
    NotReady,
    /// Channel index out of range.
    Index,
    /// Parameter out of range.
    Param,
    /// Code this driver does not know.
    Other(u8),
}

impl ErrorCode {
    /// Decodes an error register value.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => ErrorCode::Ok,
            0xF9 => ErrorCode::Syntax,
            0xFC => ErrorCode::NotReady,
            0xFD => ErrorCode::Index,
            0xFE => ErrorCode::Param,
            other => ErrorCode::Other(other),
        }
    }

    /// Register value for this code.
    pub const fn as_raw(self) -> u8 {
        match self {
            ErrorCode::Ok => 0x00,
            ErrorCode::Syntax => 0xF9,
            ErrorCode::NotReady => 0xFC,
            ErrorCode::Index => 0xFD,
            ErrorCode::Param => 0xFE,
            ErrorCode::Other(raw) => raw,
        }
    }

    /// Returns true for [`ErrorCode::Ok`].
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, ErrorCode::Ok)
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorCode::Ok => write!(f, "ok"),
            ErrorCode::Syntax => write!(f, "syntax error"),
            ErrorCode::NotReady => write!(f, "device not ready"),
            ErrorCode::Index => write!(f, "index out of range"),
            ErrorCode::Param => write!(f, "parameter out of range"),
            ErrorCode::Other(raw) => write!(f, "unknown error 0x{:02X}", raw),
        }
    }
}

/// Last value successfully read from the device.
///
/// Holds nothing until the first good read. A failed refresh keeps the previous
/// value and flags it as stale until the next good read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LastKnown<T: Copy> {
    value: Option<T>,
    stale: bool,
}

impl<T: Copy> LastKnown<T> {
    /// Creates an empty entry.
    pub const fn new() -> Self {
        Self {
            value: None,
            stale: false,
        }
    }

    /// Last good value, if any.
    #[inline]
    pub fn value(&self) -> Option<T> {
        self.value
    }

    /// Returns true if a value has ever been stored.
    #[inline]
    pub fn is_known(&self) -> bool {
        self.value.is_some()
    }

    /// Returns true if the most recent refresh attempt failed.
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Stores a fresh value.
    pub fn update(&mut self, value: T) {
        self.value = Some(value);
        self.stale = false;
    }

    /// Flags the current value as stale without discarding it.
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }
}

impl<T: Copy> Default for LastKnown<T> {
    fn default() -> Self {
        Self::new()
    }
}
