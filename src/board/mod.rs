//! Board identity, probed from the most specific source available:
//! the Raspberry Pi firmware revision code, then SMBIOS/DMI, then the
//! flattened device tree.

pub mod dmi;
pub mod dt;
pub mod rpi;

use tracing::debug;

use crate::error::ScanError;
use crate::fields::FieldList;
use crate::sysfs::SysPaths;

pub use dmi::DmiBoard;
pub use dt::DtBoard;
pub use rpi::RpiBoard;

pub enum Board {
    Rpi(RpiBoard),
    Dmi(DmiBoard),
    DeviceTree(DtBoard),
}

impl Board {
    /// Probes the live system.
    pub fn detect() -> Result<Self, ScanError> {
        Self::detect_with(SysPaths::default())
    }

    pub fn detect_with(paths: SysPaths) -> Result<Self, ScanError> {
        if rpi::probe(&paths) {
            debug!("board source: raspberry pi revision code");
            Ok(Board::Rpi(RpiBoard::new(paths)))
        } else if dmi::probe(&paths) {
            debug!("board source: dmi");
            Ok(Board::Dmi(DmiBoard::new(&paths)))
        } else if dt::probe(&paths) {
            debug!("board source: device tree");
            Ok(Board::DeviceTree(DtBoard::new(&paths)))
        } else {
            Err(ScanError::NoBoard)
        }
    }

    /// Which source identified the board.
    pub fn source(&self) -> &'static str {
        match self {
            Board::Rpi(_) => "raspberry-pi",
            Board::Dmi(_) => "dmi",
            Board::DeviceTree(_) => "device-tree",
        }
    }

    pub fn desc(&self) -> &str {
        match self {
            Board::Rpi(b) => b.desc(),
            Board::Dmi(b) => b.desc(),
            Board::DeviceTree(b) => b.desc(),
        }
    }

    pub fn serial(&self) -> Option<&str> {
        match self {
            Board::Rpi(b) => b.serial(),
            Board::Dmi(b) => Some(b.serial()).filter(|s| !s.is_empty()),
            Board::DeviceTree(b) => Some(b.serial()).filter(|s| !s.is_empty()),
        }
    }

    pub fn fields(&self) -> FieldList<'_> {
        match self {
            Board::Rpi(b) => b.fields(),
            Board::Dmi(b) => b.fields(),
            Board::DeviceTree(b) => b.fields(),
        }
    }
}
