//! Host-side stand-ins for the bus, pins and delay used by the unit tests.

use core::cell::RefCell;
use core::convert::Infallible;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource, Operation};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::i2c::{self, I2c, SevenBitAddress};

/// One recorded bus transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    Write(SevenBitAddress, Vec<u8>),
    Read(SevenBitAddress, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl i2c::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

/// A scripted I2C bus. Reads are served from a queue, missing data reads as zeros.
#[derive(Default)]
pub struct MockI2c {
    log: Vec<Transfer>,
    reads: VecDeque<Vec<u8>>,
    nacks: usize,
}

impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_read(&mut self, data: &[u8]) {
        self.reads.push_back(data.into());
    }

    /// Fails the next `count` transactions with a NACK.
    pub fn nack_next(&mut self, count: usize) {
        self.nacks = count;
    }

    pub fn log(&self) -> &[Transfer] {
        &self.log
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.log
            .iter()
            .filter_map(|t| match t {
                Transfer::Write(_, bytes) => Some(bytes.clone()),
                Transfer::Read(..) => None,
            })
            .collect()
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = MockError;
}

impl I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.nacks > 0 {
            self.nacks -= 1;
            return Err(MockError);
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.log.push(Transfer::Write(address, bytes.to_vec()));
                }
                Operation::Read(buf) => {
                    self.log.push(Transfer::Read(address, buf.len()));
                    buf.fill(0);
                    if let Some(data) = self.reads.pop_front() {
                        let len = data.len().min(buf.len());
                        buf[..len].copy_from_slice(&data[..len]);
                    }
                }
            }
        }
        Ok(())
    }
}

/// An output pin recording every level it was driven to.
#[derive(Clone, Default)]
pub struct MockOutput {
    levels: Rc<RefCell<Vec<bool>>>,
}

impl MockOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }
}

impl digital::ErrorType for MockOutput {
    type Error = Infallible;
}

impl OutputPin for MockOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

#[derive(Default)]
struct InputState {
    low: bool,
    falling_edges: usize,
}

/// An interrupt line. Edges are consumed by `wait_for_falling_edge`; with none
/// pending the wait never completes.
#[derive(Clone, Default)]
pub struct MockInput {
    state: Rc<RefCell<InputState>>,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_low(&self, low: bool) {
        self.state.borrow_mut().low = low;
    }

    pub fn fire(&self) {
        self.state.borrow_mut().falling_edges += 1;
    }
}

impl digital::ErrorType for MockInput {
    type Error = Infallible;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.state.borrow().low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state.borrow().low)
    }
}

impl Wait for MockInput {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        if self.state.borrow().low {
            core::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        if !self.state.borrow().low {
            core::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        core::future::pending::<()>().await;
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        let fired = {
            let mut state = self.state.borrow_mut();
            if state.falling_edges > 0 {
                state.falling_edges -= 1;
                true
            } else {
                false
            }
        };
        if !fired {
            core::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.wait_for_falling_edge().await
    }
}

/// A delay that returns immediately and records the requested durations in microseconds.
#[derive(Clone, Default)]
pub struct MockDelay {
    waits_us: Rc<RefCell<Vec<u32>>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits_ms(&self) -> Vec<u32> {
        self.waits_us.borrow().iter().map(|us| us / 1000).collect()
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.waits_us.borrow_mut().push(ns / 1000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.waits_us.borrow_mut().push(us);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waits_us.borrow_mut().push(ms.saturating_mul(1000));
    }
}
