//! Error types for the Cypress touch driver.

use core::fmt::{self, Debug};

use crate::config::PinRole;
use crate::registers::BootloaderData;
use crate::touch::DriverState;

/// An error related to I2C communication.
pub enum BusError<TI2CERR> {
    /// An error occurred during a `write` operation.
    Write(TI2CERR),
    /// An error occurred during a `read` operation.
    Read(TI2CERR),
    /// The payload does not fit into a single bus transaction.
    TooLong(usize),
}

impl<TI2CERR: Debug> Debug for BusError<TI2CERR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write(err) => write!(f, "Write({err:?})"),
            Self::Read(err) => write!(f, "Read({err:?})"),
            Self::TooLong(len) => write!(f, "TooLong({len})"),
        }
    }
}

/// An error related to GPIO pin operations.
pub enum PinError<TPINERR> {
    /// An error occurred while driving an output pin.
    Output(PinRole, TPINERR),
    /// An error occurred on the interrupt pin.
    Input(TPINERR),
}

impl<TPINERR: Debug> Debug for PinError<TPINERR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output(role, err) => write!(f, "Output({role:?}, {err:?})"),
            Self::Input(err) => write!(f, "Input({err:?})"),
        }
    }
}

/// The main error type for the Cypress touch driver.
pub enum Error<TI2CERR, TPINERR> {
    /// An I2C-related error.
    Bus(BusError<TI2CERR>),
    /// A pin-related error.
    Pin(PinError<TPINERR>),
    /// The controller did not acknowledge its address after reset.
    NotResponding,
    /// The controller stayed in bootloader mode after the exit command.
    BootloaderExit(BootloaderData),
    /// The system information block reported no TTSP version.
    InvalidSysInfo,
    /// A touch report carried an unsupported number of fingers.
    InvalidTouchCount(u8),
    /// The driver has not been (successfully) initialized.
    NotReady(DriverState),
}

impl<TI2CERR: Debug, TPINERR: Debug> Debug for Error<TI2CERR, TPINERR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "Bus({err:?})"),
            Self::Pin(err) => write!(f, "Pin({err:?})"),
            Self::NotResponding => write!(f, "NotResponding"),
            Self::BootloaderExit(data) => write!(f, "BootloaderExit({data:?})"),
            Self::InvalidSysInfo => write!(f, "InvalidSysInfo"),
            Self::InvalidTouchCount(count) => write!(f, "InvalidTouchCount({count})"),
            Self::NotReady(state) => write!(f, "NotReady({state:?})"),
        }
    }
}

impl<TI2CERR, TPINERR> From<BusError<TI2CERR>> for Error<TI2CERR, TPINERR> {
    fn from(bus_err: BusError<TI2CERR>) -> Self {
        Error::Bus(bus_err)
    }
}

impl<TI2CERR, TPINERR> From<PinError<TPINERR>> for Error<TI2CERR, TPINERR> {
    fn from(pin_err: PinError<TPINERR>) -> Self {
        Error::Pin(pin_err)
    }
}
