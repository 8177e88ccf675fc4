//! Board identification from flattened device-tree properties, the
//! last-resort source for ARM boards without a recognized revision
//! code or DMI.

use tracing::debug;

use super::rpi::UNKNOWN;
use crate::fields::FieldList;
use crate::sysfs::SysPaths;

/// True when the device tree exposes a model string.
pub(crate) fn probe(paths: &SysPaths) -> bool {
    paths.dt_string("model").is_some()
}

pub struct DtBoard {
    model: String,
    serial: String,
}

impl DtBoard {
    pub fn new(paths: &SysPaths) -> Self {
        let model = paths
            .dt_string("model")
            .unwrap_or_else(|| UNKNOWN.to_string());
        let serial = paths.dt_string("serial-number").unwrap_or_default();
        debug!("device-tree board: {}", model);
        DtBoard { model, serial }
    }

    pub fn desc(&self) -> &str {
        &self.model
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn fields(&self) -> FieldList<'_> {
        let mut list = FieldList::new();
        list.upsert_static("summary.board_desc", "Board", self.desc());
        list.upsert_static("board.name", "Board Name", self.desc());
        list.upsert_static("board.serial", "Serial Number", self.serial());
        list
    }
}
