//! Board identification from the SMBIOS/DMI id directory.

use tracing::debug;

use super::rpi::UNKNOWN;
use crate::fields::FieldList;
use crate::sysfs::SysPaths;

/// True when the kernel exported a DMI id directory.
pub(crate) fn probe(paths: &SysPaths) -> bool {
    paths.dmi.is_dir()
}

pub struct DmiBoard {
    desc: String,
    name: String,
    vendor: String,
    version: String,
    serial: String,
    bios_vendor: String,
    bios_version: String,
    bios_date: String,
}

impl DmiBoard {
    pub fn new(paths: &SysPaths) -> Self {
        let entry = |name: &str| {
            paths
                .dmi_string(name)
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        let name = entry("board_name");
        let vendor = entry("board_vendor");
        // serial is root-readable only on most systems
        let serial = paths.dmi_string("board_serial").unwrap_or_default();
        let desc = format!("{} {}", vendor, name);
        debug!("dmi board: {}", desc);
        DmiBoard {
            desc,
            name,
            vendor,
            version: entry("board_version"),
            serial,
            bios_vendor: entry("bios_vendor"),
            bios_version: entry("bios_version"),
            bios_date: entry("bios_date"),
        }
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn bios_vendor(&self) -> &str {
        &self.bios_vendor
    }

    pub fn bios_version(&self) -> &str {
        &self.bios_version
    }

    pub fn bios_date(&self) -> &str {
        &self.bios_date
    }

    pub fn fields(&self) -> FieldList<'_> {
        let mut list = FieldList::new();
        list.upsert_static("summary.board_desc", "Board", self.desc());
        list.upsert_static("board.name", "Board Name", self.desc());
        list.upsert_static("board.vendor", "Board Vendor", self.vendor());
        list.upsert_static("board.version", "Board Version", self.version());
        list.upsert_static("board.serial", "Serial Number", self.serial());
        list.upsert_static("board.bios_vendor", "BIOS Vendor", self.bios_vendor());
        list.upsert_static("board.bios_version", "BIOS Version", self.bios_version());
        list.upsert_static("board.bios_date", "BIOS Date", self.bios_date());
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths_in(dir: &TempDir) -> SysPaths {
        SysPaths {
            cpuinfo: dir.path().join("cpuinfo"),
            sys_cpu: dir.path().join("cpu"),
            dmi: dir.path().join("dmi"),
            device_tree: dir.path().join("dt"),
            thermal_zone: dir.path().join("thermal"),
        }
    }

    #[test]
    fn test_desc_is_vendor_then_name() {
        let dir = TempDir::new().unwrap();
        let p = paths_in(&dir);
        fs::create_dir_all(&p.dmi).unwrap();
        fs::write(p.dmi.join("board_vendor"), "ASUSTeK COMPUTER INC.\n").unwrap();
        fs::write(p.dmi.join("board_name"), "PRIME B450-PLUS\n").unwrap();
        let b = DmiBoard::new(&p);
        assert_eq!(b.desc(), "ASUSTeK COMPUTER INC. PRIME B450-PLUS");
        assert!(probe(&p));
    }

    #[test]
    fn test_missing_entries_are_unknown_except_serial() {
        let dir = TempDir::new().unwrap();
        let p = paths_in(&dir);
        fs::create_dir_all(&p.dmi).unwrap();
        let b = DmiBoard::new(&p);
        assert_eq!(b.desc(), "(Unknown) (Unknown)");
        assert_eq!(b.bios_vendor(), "(Unknown)");
        assert_eq!(b.serial(), "");
    }

    #[test]
    fn test_probe_requires_directory() {
        let dir = TempDir::new().unwrap();
        assert!(!probe(&paths_in(&dir)));
    }
}
