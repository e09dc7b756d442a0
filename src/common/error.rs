// src/common/error.rs

#[derive(Debug, thiserror::Error)]
pub enum Opt3001Error<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying bus error from the I2C implementation (NACK, arbitration loss, ...).
    #[error("I/O error: {0:?}")]
    Io(E),

    /// The conversion-ready flag did not come up within the single-shot budget.
    /// Every bus transaction succeeded; the device just never finished converting.
    #[error("Timed out waiting for conversion")]
    Timeout,

    /// Identity check failed while constructing the driver. Ids are `None`
    /// when the register could not be read at all.
    #[error("OPT3001 not found (manufacturer id {manufacturer_id:04x?}, device id {device_id:04x?})")]
    DeviceNotFound {
        manufacturer_id: Option<u16>,
        device_id: Option<u16>,
    },

    /// Address is not one of the four strappable OPT3001 addresses.
    #[error("Invalid OPT3001 address: {0:#04x}")]
    InvalidAddress(u8),
}

// Lets `?` lift raw bus errors into the driver error.
impl<E: core::fmt::Debug> From<E> for Opt3001Error<E> {
    fn from(e: E) -> Self {
        Opt3001Error::Io(e)
    }
}

impl<E: core::fmt::Debug> Opt3001Error<E> {
    /// True for bus-level failures.
    #[inline]
    pub fn is_io(&self) -> bool {
        matches!(self, Opt3001Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate std;
    use std::string::ToString;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockBusError;

    #[test]
    fn test_from_bus_error() {
        let err: Opt3001Error<MockBusError> = MockBusError.into();
        assert!(matches!(err, Opt3001Error::Io(MockBusError)));
        assert!(err.is_io());
    }

    #[test]
    fn test_timeout_is_not_io() {
        let err: Opt3001Error<MockBusError> = Opt3001Error::Timeout;
        assert!(!err.is_io());
    }

    #[test]
    fn test_messages() {
        let err: Opt3001Error<()> = Opt3001Error::InvalidAddress(0x50);
        assert_eq!(err.to_string(), "Invalid OPT3001 address: 0x50");

        let err: Opt3001Error<()> = Opt3001Error::DeviceNotFound {
            manufacturer_id: Some(0x1234),
            device_id: None,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("OPT3001 not found"));
        assert!(msg.contains("1234"));
        assert!(msg.contains("None"));
    }
}
