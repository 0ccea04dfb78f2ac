//! Codes accepted by the command register.

/// One-shot device commands.
///
/// Commands are fire-and-forget: the device sends no acknowledgement, so a
/// successful write only means the bus accepted the byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Does nothing.
    Nop = 0x00,
    /// Software reset. The device reboots and is unresponsive for about 3 s.
    Reset = 0x01,
    /// Re-measure the mains frequency and zero-cross timing.
    Recalibrate = 0x02,
    /// Switch the control interface to UART. The device stops answering on I2C.
    SwitchUart = 0x03,
}

impl Command {
    /// Register code for this command.
    #[inline]
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Decodes a command code.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x00 => Some(Command::Nop),
            0x01 => Some(Command::Reset),
            0x02 => Some(Command::Recalibrate),
            0x03 => Some(Command::SwitchUart),
            _ => None,
        }
    }
}
