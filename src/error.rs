//! Library error type.
//!
//! Almost everything in the scan pipeline degrades to empty/zero
//! values; construction fails only when an inspector found nothing at
//! all to inspect.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// `/proc/cpuinfo` was unreadable or contained no core records.
    #[error("no processor cores found in cpuinfo")]
    NoCores,

    /// None of the board identity sources exist on this system.
    #[error("no board identity source found (tried Raspberry Pi cpuinfo, DMI, device tree)")]
    NoBoard,

    /// Built for an architecture the inspectors do not cover.
    #[error("unsupported CPU architecture")]
    UnsupportedArch,
}
