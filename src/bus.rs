//! Register transport used by the hub.
//!
//! [`RegisterBus`] is the only capability the hub needs from the outside world:
//! read a run of bytes starting at a register address, or write a single byte.
//! [`I2cBus`] provides it on top of any `embedded-hal` I2C controller.

use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Default bus address of a factory-fresh device.
pub const DEFAULT_I2C_ADDRESS: SevenBitAddress = 0x50;

/// Byte-oriented, register-addressed transport.
///
/// Implementations perform exactly one bus transaction per call and never
/// retry. Handle no errors internally: report them so the hub can decide.
pub trait RegisterBus {
    /// Transport error type.
    type Error;

    /// Reads `buffer.len()` consecutive bytes starting at `address`.
    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes one byte to `address`.
    fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    type Error = B::Error;

    #[inline]
    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        B::read(self, address, buffer)
    }

    #[inline]
    fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        B::write(self, address, value)
    }
}

/// [`RegisterBus`] over an `embedded-hal` I2C controller.
///
/// Reads send the register address and read back with a repeated start.
/// Writes send the register address followed by the value.
#[derive(Debug)]
pub struct I2cBus<I> {
    i2c: I,
    device_address: SevenBitAddress,
}

impl<I: I2c> I2cBus<I> {
    /// Creates a transport for a device at [`DEFAULT_I2C_ADDRESS`].
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_I2C_ADDRESS)
    }

    /// Creates a transport for a device at a custom bus address.
    pub fn with_address(i2c: I, device_address: SevenBitAddress) -> Self {
        Self {
            i2c,
            device_address,
        }
    }

    /// Bus address this transport talks to.
    pub fn device_address(&self) -> SevenBitAddress {
        self.device_address
    }

    /// Returns the underlying I2C controller.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cBus<I> {
    type Error = I::Error;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.device_address, &[address], buffer)
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.device_address, &[address, value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
    use heapless::Vec;

    // Records raw I2C frames and answers reads from a fixed pattern.
    struct RecordingI2c {
        frames: Vec<(u8, Vec<u8, 4>), 8>,
        answer: u8,
    }

    impl ErrorType for RecordingI2c {
        type Error = ErrorKind;
    }

    impl I2c for RecordingI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        let frame = Vec::from_slice(bytes).map_err(|_| ErrorKind::Other)?;
                        self.frames
                            .push((address, frame))
                            .map_err(|_| ErrorKind::Other)?;
                    }
                    Operation::Read(buffer) => {
                        for (offset, byte) in buffer.iter_mut().enumerate() {
                            *byte = self.answer.wrapping_add(offset as u8);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn write_sends_register_then_value() {
        let i2c = RecordingI2c {
            frames: Vec::new(),
            answer: 0,
        };
        let mut bus = I2cBus::new(i2c);

        bus.write(0x10, 42).unwrap();

        let i2c = bus.release();
        assert_eq!(i2c.frames.len(), 1);
        assert_eq!(i2c.frames[0].0, DEFAULT_I2C_ADDRESS);
        assert_eq!(&i2c.frames[0].1[..], &[0x10, 42]);
    }

    #[test]
    fn read_addresses_register_then_fills_buffer() {
        let i2c = RecordingI2c {
            frames: Vec::new(),
            answer: 0x3C,
        };
        let mut bus = I2cBus::with_address(i2c, 0x27);

        let mut buffer = [0u8; 2];
        bus.read(0x21, &mut buffer).unwrap();

        assert_eq!(buffer, [0x3C, 0x3D]);
        let i2c = bus.release();
        assert_eq!(i2c.frames[0].0, 0x27);
        assert_eq!(&i2c.frames[0].1[..], &[0x21]);
    }
}
