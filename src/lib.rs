//! boardscan - board and CPU identification for Linux systems.
//!
//! Everything is read from `/proc` and `/sys` in one synchronous pass:
//! `/proc/cpuinfo` for the CPU (per-core records aggregated through a
//! string-interning table), then the best available board identity
//! source (Raspberry Pi revision code, DMI, device tree). Inspectors
//! expose typed accessors plus a generic tagged field list for display.

pub mod board;
pub mod config;
pub mod cpu;
pub mod error;
pub mod fields;
pub mod intern;
pub mod report;
pub mod scanner;
pub mod sysfs;

pub use board::Board;
pub use config::Config;
pub use cpu::Processor;
pub use error::ScanError;
pub use report::Report;
pub use sysfs::SysPaths;
