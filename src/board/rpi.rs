//! Raspberry Pi board identification.
//!
//! The firmware exposes a revision code through `/proc/cpuinfo`; the
//! static table below (from <http://elinux.org/RPi_HardwareHistory>)
//! maps it to the marketing model, PCB revision, introduction quarter,
//! memory spec and manufacturer. Codes the table does not know fall
//! back to the unknown entry and the device-tree model string.

use std::rc::Rc;

use tracing::debug;

use crate::fields::FieldList;
use crate::scanner::{key_matches, KvScanner};
use crate::sysfs::SysPaths;

pub(crate) const UNKNOWN: &str = "(Unknown)";

struct RpiRevision {
    code: &'static str,
    intro: &'static str,
    model: &'static str,
    pcb: &'static str,
    mem: &'static str,
    mfg: &'static str,
    soc: Option<&'static str>,
}

macro_rules! rev {
    ($code:expr, $intro:expr, $model:expr, $pcb:expr, $mem:expr, $mfg:expr, $soc:expr) => {
        RpiRevision {
            code: $code,
            intro: $intro,
            model: $model,
            pcb: $pcb,
            mem: $mem,
            mfg: $mfg,
            soc: $soc,
        }
    };
}

/// Index 0 is the fallback entry for unrecognized codes.
#[rustfmt::skip]
static RPI_REVISIONS: &[RpiRevision] = &[
    rev!("",        UNKNOWN,    UNKNOWN,               UNKNOWN, UNKNOWN,       UNKNOWN,          None),
    rev!("Beta",    "Q1 2012",  "B (Beta)",            UNKNOWN, "256MB",       "(Beta board)",   None),
    rev!("0002",    "Q1 2012",  "B",                   "1.0",   "256MB",       UNKNOWN,          Some("BCM2835")),
    rev!("0003",    "Q3 2012",  "B (ECN0001)",         "1.0",   "256MB",       "(Fuses mod and D14 removed)", None),
    rev!("0004",    "Q3 2012",  "B",                   "2.0",   "256MB",       "Sony",           None),
    rev!("0005",    "Q4 2012",  "B",                   "2.0",   "256MB",       "Qisda",          None),
    rev!("0006",    "Q4 2012",  "B",                   "2.0",   "256MB",       "Egoman",         None),
    rev!("0007",    "Q1 2013",  "A",                   "2.0",   "256MB",       "Egoman",         None),
    rev!("0008",    "Q1 2013",  "A",                   "2.0",   "256MB",       "Sony",           None),
    rev!("0009",    "Q1 2013",  "A",                   "2.0",   "256MB",       "Qisda",          None),
    rev!("000d",    "Q4 2012",  "B",                   "2.0",   "512MB",       "Egoman",         None),
    rev!("000e",    "Q4 2012",  "B",                   "2.0",   "512MB",       "Sony",           None),
    rev!("000f",    "Q4 2012",  "B",                   "2.0",   "512MB",       "Qisda",          None),
    rev!("0010",    "Q3 2014",  "B+",                  "1.0",   "512MB",       "Sony",           None),
    rev!("0011",    "Q2 2014",  "Compute Module 1",    "1.0",   "512MB",       "Sony",           None),
    rev!("0012",    "Q4 2014",  "A+",                  "1.1",   "256MB",       "Sony",           None),
    rev!("0013",    "Q1 2015",  "B+",                  "1.2",   "512MB",       UNKNOWN,          None),
    rev!("0014",    "Q2 2014",  "Compute Module 1",    "1.0",   "512MB",       "Embest",         None),
    rev!("0015",    UNKNOWN,    "A+",                  "1.1",   "256MB/512MB", "Embest",         None),
    rev!("a01040",  UNKNOWN,    "2 Model B",           "1.0",   "1GB",         "Sony",           Some("BCM2836?")),
    rev!("a01041",  "Q1 2015",  "2 Model B",           "1.1",   "1GB",         "Sony",           Some("BCM2836?")),
    rev!("a21041",  "Q1 2015",  "2 Model B",           "1.1",   "1GB",         "Embest",         Some("BCM2836?")),
    rev!("a22042",  "Q3 2016",  "2 Model B",           "1.2",   "1GB",         "Embest",         Some("BCM2837")),
    rev!("900021",  "Q3 2016",  "A+",                  "1.1",   "512MB",       "Sony",           None),
    rev!("900032",  "Q2 2016?", "B+",                  "1.2",   "512MB",       "Sony",           None),
    rev!("900092",  "Q4 2015",  "Zero",                "1.2",   "512MB",       "Sony",           None),
    rev!("900093",  "Q2 2016",  "Zero",                "1.3",   "512MB",       "Sony",           None),
    rev!("920093",  "Q4 2016?", "Zero",                "1.3",   "512MB",       "Embest",         None),
    rev!("9000c1",  "Q1 2017",  "Zero W",              "1.1",   "512MB",       "Sony",           None),
    rev!("a02082",  "Q1 2016",  "3 Model B",           "1.2",   "1GB",         "Sony",           Some("BCM2837")),
    rev!("a020a0",  "Q1 2017",  "Compute Module 3 or CM3 Lite", "1.0", "1GB",  "Sony",           None),
    rev!("a22082",  "Q1 2016",  "3 Model B",           "1.2",   "1GB",         "Embest",         Some("BCM2709")),
    rev!("a32082",  "Q4 2016",  "3 Model B",           "1.2",   "1GB",         "Sony Japan",     None),
];

/// Table index for a revision code; an unmatched code hits the
/// fallback entry. The `1000` overvolt prefix is ignored here.
fn lookup(code: &str) -> usize {
    let code = code.strip_prefix("1000").unwrap_or(code);
    RPI_REVISIONS
        .iter()
        .position(|r| !r.code.is_empty() && r.code == code)
        .unwrap_or(0)
}

/// True when cpuinfo carries the firmware `Revision` line.
pub(crate) fn probe(paths: &SysPaths) -> bool {
    let Some(text) = crate::sysfs::read_text(&paths.cpuinfo) else {
        return false;
    };
    KvScanner::new(&text).any(|(key, _)| key_matches(&key, "Revision"))
}

pub struct RpiBoard {
    desc: String,
    dt_model: Option<String>,
    /// `Hardware` line from cpuinfo.
    soc: Option<String>,
    revision: Option<String>,
    serial: Option<String>,
    overvolt: bool,
    info: &'static RpiRevision,
    paths: SysPaths,
}

impl RpiBoard {
    pub fn new(paths: SysPaths) -> Self {
        let text = crate::sysfs::read_text(&paths.cpuinfo).unwrap_or_default();
        Self::from_cpuinfo(&text, paths)
    }

    pub fn from_cpuinfo(text: &str, paths: SysPaths) -> Self {
        let mut revision = None;
        let mut serial = None;
        let mut soc = None;
        for (key, value) in KvScanner::new(text) {
            if key_matches(&key, "Revision") {
                revision = Some(value);
            } else if key_matches(&key, "Serial") {
                serial = Some(value);
            } else if key_matches(&key, "Hardware") {
                soc = Some(value);
            }
        }

        let i = revision.as_deref().map(lookup).unwrap_or(0);
        let overvolt = revision
            .as_deref()
            .map(|r| r.starts_with("1000"))
            .unwrap_or(false);
        let dt_model = paths.dt_string("model");
        let info = &RPI_REVISIONS[i];

        let desc = if i != 0 {
            format!("Raspberry Pi {} Rev {}", info.model, info.pcb)
        } else {
            dt_model.clone().unwrap_or_else(|| UNKNOWN.to_string())
        };
        debug!("raspberry pi: code {:?} -> {}", revision, desc);

        RpiBoard {
            desc,
            dt_model,
            soc,
            revision,
            serial,
            overvolt,
            info,
            paths,
        }
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn rcode(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    pub fn dt_model(&self) -> Option<&str> {
        self.dt_model.as_deref()
    }

    pub fn model(&self) -> &str {
        self.info.model
    }

    pub fn pcb_rev(&self) -> &str {
        self.info.pcb
    }

    pub fn intro(&self) -> &str {
        self.info.intro
    }

    pub fn mfg_by(&self) -> &str {
        self.info.mfg
    }

    pub fn mem_spec(&self) -> &str {
        self.info.mem
    }

    /// SoC name; the table's spec value wins over the kernel-reported
    /// `Hardware` string.
    pub fn soc(&self) -> Option<&str> {
        self.info.soc.or(self.soc.as_deref())
    }

    /// Firmware flags the board as having run overvolted (revision
    /// code carried the `1000` prefix).
    pub fn overvolt(&self) -> bool {
        self.overvolt
    }

    /// Live SoC temperature in degrees C, 0.0 if unavailable.
    pub fn soc_temp_c(&self) -> f32 {
        self.paths.soc_temp_c()
    }

    pub fn fields(&self) -> FieldList<'_> {
        let mut list = FieldList::new();
        list.upsert_static("summary.board_desc", "Board", self.desc());
        list.upsert_static("board.name", "Board Name", self.desc());
        list.upsert_static("board.rcode", "Revision Code", self.rcode().unwrap_or(""));
        list.upsert_static("board.serial", "Serial Number", self.serial().unwrap_or(""));
        list.upsert_static("board.model", "Model", self.model());
        list.upsert_static("board.pcb", "PCB Revision", self.pcb_rev());
        list.upsert_static("board.intro", "Introduced", self.intro());
        list.upsert_static("board.mfg", "Manufactured By", self.mfg_by());
        list.upsert_static("board.mem_spec", "Memory (spec)", self.mem_spec());
        list.upsert_static("board.soc", "SoC", self.soc().unwrap_or(UNKNOWN));
        list.upsert_static(
            "board.overvolt",
            "Overvolted",
            if self.overvolt() { "Yes" } else { "No" },
        );
        list.upsert(
            "board.soc_temp",
            true,
            "SoC Temperature",
            Rc::new(move || Some(format!("{:.1} C", self.soc_temp_c()))),
        );
        list
    }
}
