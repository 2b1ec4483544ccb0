//! Register map and data blocks of the TTSP host interface.

/// Host mode register. Every data block is read starting here.
pub const REG_BASE: u8 = 0x00;
/// First of the three scan interval registers.
pub const REG_ACT_INTRVL: u8 = 0x1D;
/// Undocumented register written once during setup.
pub const REG_DIST: u8 = 0x1E;

/// Host mode: full-rate touch scanning, touch data readable at [`REG_BASE`].
pub const MODE_OPERATE: u8 = 0x00;
/// Host mode: restart the controller firmware.
pub const MODE_SOFT_RESET: u8 = 0x01;
/// Host mode: stop scanning until the next reset.
pub const MODE_DEEP_SLEEP: u8 = 0x02;
/// Host mode: slow scanning, wakes up on touch.
pub const MODE_LOW_POWER: u8 = 0x04;
/// Host mode: expose the [`SysInfo`] block at [`REG_BASE`].
pub const MODE_SYSINFO: u8 = 0x10;
/// Bits of the host mode register that select the mode.
pub const MODE_MASK: u8 = MODE_SYSINFO | MODE_LOW_POWER | MODE_DEEP_SLEEP | MODE_SOFT_RESET;

/// Toggled by the host to acknowledge a read.
pub const HANDSHAKE_BIT: u8 = 0x80;

pub const DIST_DEFAULT: u8 = 0xF8;

/// File offset, command, exit-bootloader opcode and the eight default keys.
pub const EXIT_BOOTLOADER_CMD: [u8; 11] = [0x00, 0xFF, 0xA5, 0, 1, 2, 3, 4, 5, 6, 7];

const BL_STATUS_BOOTLOADER_MODE: u8 = 0x10;

fn be16(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

/// Bootloader register block, read from [`REG_BASE`] while the bootloader runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootloaderData {
    pub file: u8,
    pub status: u8,
    pub error: u8,
    pub bootloader_version: u16,
    pub bootloader_driver_version: u16,
    pub ttsp_version: u16,
    pub app_id: u16,
    pub app_version: u16,
    pub customer_id: [u8; 3],
}

impl BootloaderData {
    pub const LEN: usize = 16;

    pub fn from_bytes(b: &[u8; Self::LEN]) -> Self {
        Self {
            file: b[0],
            status: b[1],
            error: b[2],
            bootloader_version: be16(b[3], b[4]),
            bootloader_driver_version: be16(b[5], b[6]),
            ttsp_version: be16(b[7], b[8]),
            app_id: be16(b[9], b[10]),
            app_version: be16(b[11], b[12]),
            customer_id: [b[13], b[14], b[15]],
        }
    }

    /// Whether the controller is still running its bootloader.
    pub fn in_bootloader(&self) -> bool {
        self.status & BL_STATUS_BOOTLOADER_MODE != 0
    }
}

/// System information block, read from [`REG_BASE`] in sysinfo mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SysInfo {
    pub host_mode: u8,
    pub mfg_status: u8,
    pub mfg_command: u8,
    pub customer_id: [u8; 3],
    pub uid: [u8; 8],
    pub bootloader_version: u16,
    pub ttsp_version: u16,
    pub app_id: u16,
    pub app_version: u16,
    pub scan_type: u8,
    pub active_interval: u8,
    pub touch_timeout: u8,
    pub low_power_interval: u8,
}

impl SysInfo {
    pub const LEN: usize = 32;

    pub fn from_bytes(b: &[u8; Self::LEN]) -> Self {
        let mut uid = [0u8; 8];
        uid.copy_from_slice(&b[7..15]);
        Self {
            host_mode: b[0],
            mfg_status: b[1],
            mfg_command: b[2],
            customer_id: [b[3], b[4], b[5]],
            uid,
            bootloader_version: be16(b[15], b[16]),
            ttsp_version: be16(b[17], b[18]),
            app_id: be16(b[19], b[20]),
            app_version: be16(b[21], b[22]),
            scan_type: b[28],
            active_interval: b[29],
            touch_timeout: b[30],
            low_power_interval: b[31],
        }
    }

    /// A controller that left its bootloader correctly reports a TTSP version.
    pub fn is_valid(&self) -> bool {
        self.ttsp_version != 0
    }
}

/// One raw contact as reported by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawPoint {
    pub x: u16,
    pub y: u16,
    /// Contact pressure.
    pub z: u8,
}

/// Touch data block, read from [`REG_BASE`] in operate mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchReport {
    /// Number of valid entries in `points`, as reported (may exceed 2).
    pub fingers: u8,
    pub points: [RawPoint; 2],
    /// Touch identifiers of both contacts, one per nibble.
    pub touch_ids: u8,
}

impl TouchReport {
    pub const LEN: usize = SysInfo::LEN;

    pub fn from_bytes(b: &[u8; Self::LEN]) -> Self {
        Self {
            fingers: b[2] & 0x0F,
            points: [
                RawPoint {
                    x: be16(b[3], b[4]),
                    y: be16(b[5], b[6]),
                    z: b[7],
                },
                RawPoint {
                    x: be16(b[9], b[10]),
                    y: be16(b[11], b[12]),
                    z: b[13],
                },
            ],
            touch_ids: b[8],
        }
    }
}

/// Operating mode of the controller as seen in the host mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    /// Full-rate scanning.
    Operate,
    /// Reduced scan rate; wakes up on touch.
    LowPower,
    /// Scanning stopped. Needs a reset to wake up.
    DeepSleep,
}

impl PowerMode {
    /// Decodes the host mode register, ignoring the handshake bit.
    ///
    /// Returns `None` while the controller is in sysinfo or soft-reset mode,
    /// or reports a combination of mode bits that names no power mode.
    pub fn from_register(value: u8) -> Option<Self> {
        match value & MODE_MASK {
            MODE_OPERATE => Some(PowerMode::Operate),
            MODE_LOW_POWER => Some(PowerMode::LowPower),
            MODE_DEEP_SLEEP => Some(PowerMode::DeepSleep),
            _ => None,
        }
    }

    /// The value written to the host mode register to enter this mode.
    pub fn register_value(self) -> u8 {
        match self {
            PowerMode::Operate => MODE_OPERATE,
            PowerMode::LowPower => MODE_LOW_POWER,
            PowerMode::DeepSleep => MODE_DEEP_SLEEP,
        }
    }
}
