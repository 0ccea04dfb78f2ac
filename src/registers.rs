//! DimmerLink register map.
//!
//! Every register the device exposes is described once in [`REGISTER_MAP`]:
//! its bus address, how many bytes it spans, whether it may be written, and how
//! its raw bytes are interpreted. Everything else in the crate looks registers up
//! through [`Register::info`] instead of carrying loose address constants.

/// A named register on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Device status bitfield.
    Status,
    /// Command register (write-only).
    Command,
    /// Last error code.
    Error,
    /// Firmware version.
    Version,
    /// Brightness level of dimmer channel 0.
    Level,
    /// Dimming curve of dimmer channel 0.
    Curve,
    /// Fade time of dimmer channel 0.
    FadeTime,
    /// Measured mains frequency.
    AcFrequency,
    /// Measured mains half-period, spans two bytes.
    AcPeriod,
    /// Calibration-done flag.
    Calibration,
    /// Device bus address.
    I2cAddress,
}

/// Whether a register may be read, written, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    /// Read-only.
    Read,
    /// Write-only.
    Write,
    /// Read and write.
    ReadWrite,
}

impl Access {
    /// Returns true if reads are permitted.
    pub const fn readable(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    /// Returns true if writes are permitted.
    pub const fn writable(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

/// How the raw bytes of a register are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Encoding {
    /// Bitfield, see [`Status`](crate::Status).
    StatusBits,
    /// Command code, see [`Command`](crate::Command).
    CommandCode,
    /// Error code, see [`ErrorCode`](crate::ErrorCode).
    ErrorCode,
    /// Plain unsigned byte.
    Raw,
    /// Percentage, 0-100.
    Percent,
    /// Curve code, see [`DimmingCurve`](crate::DimmingCurve).
    CurveCode,
    /// Multiples of 100 ms.
    Centiseconds100,
    /// Hertz.
    Hertz,
    /// Unsigned 16-bit little-endian value.
    U16Le,
    /// Boolean flag, 1 means set.
    Flag,
}

/// Static description of one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterInfo {
    /// Register this entry describes.
    pub register: Register,
    /// Bus address of the first byte.
    pub address: u8,
    /// Number of consecutive bytes.
    pub width: u8,
    /// Permitted access.
    pub access: Access,
    /// Interpretation of the raw bytes.
    pub encoding: Encoding,
}

impl RegisterInfo {
    const fn new(
        register: Register,
        address: u8,
        width: u8,
        access: Access,
        encoding: Encoding,
    ) -> Self {
        Self {
            register,
            address,
            width,
            access,
            encoding,
        }
    }
}

/// The full register map, ordered by [`Register`] discriminant.
pub const REGISTER_MAP: [RegisterInfo; 11] = [
    RegisterInfo::new(Register::Status, 0x00, 1, Access::Read, Encoding::StatusBits),
    RegisterInfo::new(Register::Command, 0x01, 1, Access::Write, Encoding::CommandCode),
    RegisterInfo::new(Register::Error, 0x02, 1, Access::Read, Encoding::ErrorCode),
    RegisterInfo::new(Register::Version, 0x03, 1, Access::Read, Encoding::Raw),
    RegisterInfo::new(Register::Level, 0x10, 1, Access::ReadWrite, Encoding::Percent),
    RegisterInfo::new(Register::Curve, 0x11, 1, Access::ReadWrite, Encoding::CurveCode),
    RegisterInfo::new(
        Register::FadeTime,
        0x18,
        1,
        Access::ReadWrite,
        Encoding::Centiseconds100,
    ),
    RegisterInfo::new(Register::AcFrequency, 0x20, 1, Access::Read, Encoding::Hertz),
    RegisterInfo::new(Register::AcPeriod, 0x21, 2, Access::Read, Encoding::U16Le),
    RegisterInfo::new(Register::Calibration, 0x23, 1, Access::Read, Encoding::Flag),
    RegisterInfo::new(Register::I2cAddress, 0x30, 1, Access::ReadWrite, Encoding::Raw),
];

impl Register {
    /// Returns the table entry for this register.
    #[inline]
    pub const fn info(self) -> RegisterInfo {
        REGISTER_MAP[self as usize]
    }

    /// Bus address of the register's first byte.
    #[inline]
    pub const fn address(self) -> u8 {
        self.info().address
    }

    /// Number of bytes the register spans.
    #[inline]
    pub const fn width(self) -> u8 {
        self.info().width
    }

    /// Permitted access.
    #[inline]
    pub const fn access(self) -> Access {
        self.info().access
    }

    /// Looks up the register whose first byte lives at `address`.
    pub fn from_address(address: u8) -> Option<Register> {
        REGISTER_MAP
            .iter()
            .find(|info| info.address == address)
            .map(|info| info.register)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_discriminant() {
        for (index, info) in REGISTER_MAP.iter().enumerate() {
            assert_eq!(info.register as usize, index);
        }
    }

    #[test]
    fn addresses_match_device_datasheet() {
        assert_eq!(Register::Status.address(), 0x00);
        assert_eq!(Register::Command.address(), 0x01);
        assert_eq!(Register::Level.address(), 0x10);
        assert_eq!(Register::FadeTime.address(), 0x18);
        assert_eq!(Register::AcPeriod.address(), 0x21);
        assert_eq!(Register::Calibration.address(), 0x23);
        assert_eq!(Register::I2cAddress.address(), 0x30);
    }

    #[test]
    fn ac_period_spans_two_bytes() {
        assert_eq!(Register::AcPeriod.width(), 2);
        assert_eq!(Register::from_address(0x22), None);
    }

    #[test]
    fn command_register_is_write_only() {
        assert!(!Register::Command.access().readable());
        assert!(Register::Command.access().writable());
        assert!(!Register::Version.access().writable());
    }
}
