//! Addressed access to a device on an I2C bus.

use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::error::BusError;

/// Largest payload moved in a single bus transaction.
pub const MAX_TRANSFER: usize = 32;

/// An I2C bus bound to one device address.
///
/// All register traffic of the driver goes through this type. Reads longer
/// than [`MAX_TRANSFER`] are split into several read transactions.
pub struct I2cDevice<I2cType> {
    bus: I2cType,
    address: SevenBitAddress,
}

impl<I2cType: I2c<SevenBitAddress>> I2cDevice<I2cType> {
    /// Creates a new [`I2cDevice`] talking to `address` on `bus`.
    pub fn new(bus: I2cType, address: SevenBitAddress) -> Self {
        Self { bus, address }
    }

    /// The 7-bit address of the device.
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Releases the underlying bus.
    pub fn release(self) -> I2cType {
        self.bus
    }

    /// Issues an empty write. Succeeds only if the device acknowledges its address.
    pub async fn ping(&mut self) -> Result<(), BusError<I2cType::Error>> {
        self.write(&[]).await
    }

    /// Writes raw bytes to the device.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), BusError<I2cType::Error>> {
        if bytes.len() > MAX_TRANSFER + 1 {
            return Err(BusError::TooLong(bytes.len()));
        }
        self.bus
            .write(self.address, bytes)
            .await
            .map_err(BusError::Write)
    }

    /// Writes `data` starting at register `reg` in one transaction.
    pub async fn write_register(
        &mut self,
        reg: u8,
        data: &[u8],
    ) -> Result<(), BusError<I2cType::Error>> {
        if data.len() > MAX_TRANSFER {
            return Err(BusError::TooLong(data.len()));
        }
        let mut buf = [0u8; MAX_TRANSFER + 1];
        buf[0] = reg;
        buf[1..=data.len()].copy_from_slice(data);
        self.write(&buf[..=data.len()]).await
    }

    /// Selects register `reg` and reads `buf.len()` bytes from it.
    pub async fn read_register(
        &mut self,
        reg: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError<I2cType::Error>> {
        self.write(&[reg]).await?;
        for chunk in buf.chunks_mut(MAX_TRANSFER) {
            self.bus
                .read(self.address, chunk)
                .await
                .map_err(BusError::Read)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockI2c, Transfer};
    use embassy_futures::block_on;

    #[test]
    fn write_register_prefixes_register() {
        let mut dev = I2cDevice::new(MockI2c::new(), 0x24);
        block_on(dev.write_register(0x1D, &[0x00, 0xFF, 0x0A])).unwrap();
        let bus = dev.release();
        assert_eq!(
            bus.log(),
            &[Transfer::Write(0x24, [0x1D, 0x00, 0xFF, 0x0A].as_slice().into())]
        );
    }

    #[test]
    fn read_register_is_split_into_bus_sized_chunks() {
        let mut bus = MockI2c::new();
        bus.queue_read(&[1u8; 32]);
        bus.queue_read(&[2u8; 8]);
        let mut dev = I2cDevice::new(bus, 0x24);

        let mut buf = [0u8; 40];
        block_on(dev.read_register(0x00, &mut buf)).unwrap();

        assert!(buf[..32].iter().all(|&b| b == 1));
        assert!(buf[32..].iter().all(|&b| b == 2));
        let bus = dev.release();
        assert_eq!(bus.log().len(), 3);
        assert_eq!(bus.log()[1], Transfer::Read(0x24, 32));
        assert_eq!(bus.log()[2], Transfer::Read(0x24, 8));
    }

    #[test]
    fn oversized_write_is_rejected() {
        let mut dev = I2cDevice::new(MockI2c::new(), 0x24);
        let data = [0u8; MAX_TRANSFER + 1];
        let result = block_on(dev.write_register(0x00, &data));
        assert!(matches!(result, Err(BusError::TooLong(33))));
        assert!(dev.release().log().is_empty());
    }

    #[test]
    fn ping_reports_missing_device() {
        let mut bus = MockI2c::new();
        bus.nack_next(1);
        let mut dev = I2cDevice::new(bus, 0x24);
        assert!(matches!(block_on(dev.ping()), Err(BusError::Write(_))));
        assert!(block_on(dev.ping()).is_ok());
    }
}
