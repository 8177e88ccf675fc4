//! Static reference tables for ARM CPUs.
//!
//! Flag meanings collected from the kernel sources
//! (arch/arm/kernel/setup.c, arch/arm64/kernel/cpuinfo.c); implementer
//! and part codes from the ARM MIDR register documentation. The part
//! table is only valid for implementer 0x41 (ARM Ltd designs).

use super::parse_int_auto;

/// `(flag, meaning)`; flags the kernel reports but nobody has
/// documented yet carry an empty meaning.
pub const FLAG_MEANINGS: &[(&str, &str)] = &[
    // arm/hw_cap
    ("swp", "SWP instruction (atomic read-modify-write)"),
    ("half", "Half-word loads and stores"),
    ("thumb", "Thumb (16-bit instruction set)"),
    ("26bit", "26-Bit Model (Processor status register folded into program counter)"),
    ("fastmult", "32x32->64-bit multiplication"),
    ("fpa", "Floating point accelerator"),
    ("vfp", "VFP (early SIMD vector floating point instructions)"),
    ("edsp", "DSP extensions (the 'e' variant of the ARM9 CPUs, and all others above)"),
    ("java", "Jazelle (Java bytecode accelerator)"),
    ("iwmmxt", "SIMD instructions similar to Intel MMX"),
    ("crunch", "MaverickCrunch coprocessor (if kernel support enabled)"),
    ("thumbee", "ThumbEE"),
    ("neon", "Advanced SIMD/NEON on AArch32"),
    ("evtstrm", "kernel event stream using generic architected timer"),
    ("vfpv3", "VFP version 3"),
    ("vfpv3d16", "VFP version 3 with 16 D-registers"),
    ("vfpv4", "VFP version 4 with fast context switching"),
    ("vfpd32", "VFP with 32 D-registers"),
    ("tls", "TLS register"),
    ("idiva", "SDIV and UDIV hardware division in ARM mode"),
    ("idivt", "SDIV and UDIV hardware division in Thumb mode"),
    ("lpae", "40-bit Large Physical Address Extension"),
    // arm/hw_cap2
    ("pmull", "64x64->128-bit F2m multiplication (arch>8)"),
    ("aes", "Crypto:AES (arch>8)"),
    ("sha1", "Crypto:SHA1 (arch>8)"),
    ("sha2", "Crypto:SHA2 (arch>8)"),
    ("crc32", "CRC32 checksum instructions (arch>8)"),
    // arm64/hw_cap
    ("fp", ""),
    ("asimd", "Advanced SIMD/NEON on AArch64 (arch>8)"),
    ("atomics", ""),
    ("fphp", ""),
    ("asimdhp", ""),
    ("cpuid", ""),
    ("asimdrdm", ""),
    ("jscvt", ""),
    ("fcma", ""),
    ("lrcpc", ""),
];

const IMPLEMENTERS: &[(&str, &str)] = &[
    ("0x41", "ARM"),
    ("0x44", "Intel (formerly DEC) StrongARM"),
    ("0x54", "Texas Instruments"),
    ("0x56", "Marvell"),
    ("0x69", "Intel XScale"),
];

/// Part codes for implementer 0x41 only.
const ARM_PARTS: &[(&str, &str)] = &[
    ("0x920", "ARM920"),
    ("0x926", "ARM926"),
    ("0x946", "ARM946"),
    ("0x966", "ARM966"),
    ("0xb02", "ARM11 MPCore"),
    ("0xb36", "ARM1136"),
    ("0xb56", "ARM1156"),
    ("0xb76", "ARM1176"),
    ("0xc05", "Cortex-A5"),
    ("0xc07", "Cortex-A7 MPCore"),
    ("0xc08", "Cortex-A8"),
    ("0xc09", "Cortex-A9"),
    ("0xc0e", "Cortex-A17 MPCore"),
    ("0xc0f", "Cortex-A15"),
    ("0xd01", "Cortex-A32"),
    ("0xd03", "Cortex-A53"),
    ("0xd04", "Cortex-A35"),
    ("0xd07", "Cortex-A57 MPCore"),
    ("0xd08", "Cortex-A72"),
    ("0xd09", "Cortex-A73"),
];

pub fn flag_meaning(flag: &str) -> Option<&'static str> {
    FLAG_MEANINGS
        .iter()
        .find(|(name, _)| *name == flag)
        .map(|(_, meaning)| *meaning)
}

pub fn known_flags() -> impl Iterator<Item = &'static str> {
    FLAG_MEANINGS.iter().map(|(name, _)| *name)
}

pub fn implementer_name(code: &str) -> Option<&'static str> {
    IMPLEMENTERS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

pub fn part_name(code: &str) -> Option<&'static str> {
    ARM_PARTS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Human-readable chip name from the raw cpuinfo codes.
///
/// Variant and revision render as r{variant}p{revision}. When neither
/// the implementer nor the part decodes, the raw codes are shown in
/// brackets after the kernel-reported model name. A record with none
/// of the ARM codes (non-ARM arch) falls back to the model name alone.
pub fn decoded_name(
    imp: Option<&str>,
    arch: Option<&str>,
    part: Option<&str>,
    var: Option<&str>,
    rev: Option<&str>,
    model_name: Option<&str>,
) -> Option<String> {
    match (imp, arch, part, rev) {
        (Some(imp), Some(arch), Some(part), Some(rev)) => {
            let r = parse_int_auto(var.unwrap_or("0"));
            let p = parse_int_auto(rev);
            let imp_name = implementer_name(imp);
            let part_desc = if imp == "0x41" { part_name(part) } else { None };
            if imp_name.is_some() || part_desc.is_some() {
                Some(format!(
                    "{} {} r{}p{} (arch:{})",
                    imp_name.unwrap_or(imp),
                    part_desc.unwrap_or(part),
                    r,
                    p,
                    arch
                ))
            } else {
                Some(format!(
                    "{} [imp:{} part:{} r{}p{} arch:{}]",
                    model_name.unwrap_or(""),
                    imp,
                    part,
                    r,
                    p,
                    arch
                ))
            }
        }
        _ => model_name.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implementer_lookup() {
        assert_eq!(implementer_name("0x41"), Some("ARM"));
        assert_eq!(implementer_name("0x56"), Some("Marvell"));
        assert_eq!(implementer_name("0x54"), Some("Texas Instruments"));
        assert_eq!(implementer_name("0xff"), None);
    }

    #[test]
    fn test_decoded_name_known_part() {
        let name = decoded_name(
            Some("0x41"),
            Some("8"),
            Some("0xd03"),
            Some("0x0"),
            Some("4"),
            Some("ARMv8 Processor rev 4 (v8l)"),
        );
        assert_eq!(name.unwrap(), "ARM Cortex-A53 r0p4 (arch:8)");
    }

    #[test]
    fn test_decoded_name_unknown_codes_fall_back_to_brackets() {
        let name = decoded_name(
            Some("0x99"),
            Some("7"),
            Some("0xabc"),
            Some("0x1"),
            Some("2"),
            Some("Mystery CPU"),
        );
        assert_eq!(name.unwrap(), "Mystery CPU [imp:0x99 part:0xabc r1p2 arch:7]");
    }

    #[test]
    fn test_decoded_name_part_table_only_for_arm() {
        // 0x56 implementer is known, so no brackets, but the ARM part
        // table must not be consulted.
        let name = decoded_name(
            Some("0x56"),
            Some("7"),
            Some("0xd03"),
            Some("0x0"),
            Some("1"),
            None,
        );
        assert_eq!(name.unwrap(), "Marvell 0xd03 r0p1 (arch:7)");
    }

    #[test]
    fn test_decoded_name_non_arm_uses_model_name() {
        assert_eq!(
            decoded_name(None, None, None, None, None, Some("Some CPU")).unwrap(),
            "Some CPU"
        );
        assert!(decoded_name(None, None, None, None, None, None).is_none());
    }

    #[test]
    fn test_flag_meaning_lookup() {
        assert_eq!(flag_meaning("neon"), Some("Advanced SIMD/NEON on AArch32"));
        assert_eq!(flag_meaning("fp"), Some(""));
        assert_eq!(flag_meaning("not-a-flag"), None);
    }
}
