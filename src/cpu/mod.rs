//! CPU inspectors.
//!
//! One inspector variant per supported architecture, selected at
//! detection time. Both scan `/proc/cpuinfo` once at construction,
//! aggregate per-core values through interned string tables, and
//! expose the same accessor set plus a tagged field list.

pub mod arm;
pub mod arm_data;
pub mod x86;
pub mod x86_data;

use crate::error::ScanError;
use crate::fields::FieldList;
use crate::sysfs::SysPaths;

pub use arm::ArmProc;
pub use x86::X86Proc;

/// The architecture-specific CPU inspector behind one interface.
pub enum Processor {
    Arm(ArmProc),
    X86(X86Proc),
}

impl Processor {
    /// Scans the CPU for the architecture this binary was built for.
    pub fn detect() -> Result<Self, ScanError> {
        Self::detect_with(SysPaths::default())
    }

    pub fn detect_with(paths: SysPaths) -> Result<Self, ScanError> {
        #[cfg(any(target_arch = "arm", target_arch = "aarch64"))]
        {
            return Ok(Processor::Arm(ArmProc::scan(paths)?));
        }
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            return Ok(Processor::X86(X86Proc::scan(paths)?));
        }
        #[allow(unreachable_code)]
        Err(ScanError::UnsupportedArch)
    }

    /// SoC name (ARM `Hardware` line) or x86 model name; empty when
    /// the kernel did not report one.
    pub fn name(&self) -> &str {
        match self {
            Processor::Arm(p) => p.name(),
            Processor::X86(p) => p.name(),
        }
    }

    /// Aggregate description: grouped names, then grouped max
    /// frequencies.
    pub fn desc(&self) -> &str {
        match self {
            Processor::Arm(p) => p.desc(),
            Processor::X86(p) => p.desc(),
        }
    }

    /// Number of logical cores/threads scanned.
    pub fn threads(&self) -> usize {
        match self {
            Processor::Arm(p) => p.cores(),
            Processor::X86(p) => p.threads(),
        }
    }

    /// Physical core count (same as threads on ARM).
    pub fn cores(&self) -> usize {
        match self {
            Processor::Arm(p) => p.cores(),
            Processor::X86(p) => p.cores(),
        }
    }

    /// Physical package count (1-ish on ARM SBCs).
    pub fn packages(&self) -> usize {
        match self {
            Processor::Arm(_) => 1,
            Processor::X86(p) => p.packages(),
        }
    }

    /// Highest max frequency across cores, in kHz.
    pub fn max_khz(&self) -> u32 {
        match self {
            Processor::Arm(p) => p.max_khz(),
            Processor::X86(p) => p.max_khz(),
        }
    }

    /// Kernel id of the i-th scanned core/thread.
    pub fn core_id(&self, i: usize) -> u32 {
        match self {
            Processor::Arm(p) => p.core_id(i),
            Processor::X86(p) => p.thread_id(i),
        }
    }

    pub fn core_khz_min(&self, i: usize) -> u32 {
        match self {
            Processor::Arm(p) => p.core_khz_min(i),
            Processor::X86(p) => p.thread_khz_min(i),
        }
    }

    pub fn core_khz_max(&self, i: usize) -> u32 {
        match self {
            Processor::Arm(p) => p.core_khz_max(i),
            Processor::X86(p) => p.thread_khz_max(i),
        }
    }

    /// Live value; re-reads the cpufreq file on every call.
    pub fn core_khz_cur(&self, i: usize) -> u32 {
        match self {
            Processor::Arm(p) => p.core_khz_cur(i),
            Processor::X86(p) => p.thread_khz_cur(i),
        }
    }

    /// How many cores/threads report `flag`; 0 when absent.
    pub fn has_flag(&self, flag: &str) -> u32 {
        match self {
            Processor::Arm(p) => p.has_flag(flag),
            Processor::X86(p) => p.has_flag(flag),
        }
    }

    /// Human meaning of a flag name, if known.
    pub fn flag_meaning(&self, flag: &str) -> Option<&'static str> {
        match self {
            Processor::Arm(_) => arm_data::flag_meaning(flag),
            Processor::X86(_) => x86_data::flag_meaning(flag),
        }
    }

    /// Every flag name this inspector knows about: the static table
    /// plus any flags discovered during the scan.
    pub fn all_flags(&self) -> &[String] {
        match self {
            Processor::Arm(p) => p.all_flags(),
            Processor::X86(p) => p.all_flags(),
        }
    }

    pub fn fields(&self) -> FieldList<'_> {
        match self {
            Processor::Arm(p) => p.fields(),
            Processor::X86(p) => p.fields(),
        }
    }
}

/// Whole-word search for `flag` inside a space-separated flag string.
/// A plain substring search would match `sse` inside `ssse3`; the
/// match must be bounded by start/space on the left and space/end on
/// the right.
pub(crate) fn flag_present(list: &str, flag: &str) -> bool {
    if flag.is_empty() || flag.contains(' ') {
        return false;
    }
    list.split(' ').any(|tok| tok == flag)
}

/// Integer parse with C `strtol(s, _, 0)` semantics: `0x` prefix means
/// hex, otherwise decimal; garbage parses as 0.
pub(crate) fn parse_int_auto(s: &str) -> i64 {
    let t = s.trim();
    let (digits, radix) = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (t, 10),
    };
    let end = digits
        .char_indices()
        .take_while(|(_, c)| c.is_digit(radix))
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    i64::from_str_radix(&digits[..end], radix).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_word_boundaries() {
        assert!(flag_present("sse sse2 avx", "sse"));
        assert!(flag_present("sse sse2 avx", "sse2"));
        assert!(flag_present("sse sse2 avx", "avx"));
        assert!(!flag_present("ssse3", "sse"));
        assert!(!flag_present("sse2", "sse"));
        assert!(!flag_present("fpu vme", "fp"));
    }

    #[test]
    fn test_flag_present_rejects_bad_needles() {
        assert!(!flag_present("sse sse2", ""));
        assert!(!flag_present("sse sse2", "sse sse2"));
    }

    #[test]
    fn test_parse_int_auto() {
        assert_eq!(parse_int_auto("0x41"), 0x41);
        assert_eq!(parse_int_auto("0xd03"), 0xd03);
        assert_eq!(parse_int_auto("7"), 7);
        assert_eq!(parse_int_auto(" 4 "), 4);
        assert_eq!(parse_int_auto("junk"), 0);
        assert_eq!(parse_int_auto("0x"), 0);
    }
}
