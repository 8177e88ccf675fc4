//! ARM CPU inspector.
//!
//! Scans `/proc/cpuinfo` once at construction, building one record per
//! core and interning per-core values so identical ones aggregate into
//! "Nx value" summaries. Handles the three cpuinfo layouts ARM kernels
//! have shipped: one block per core, a single block with no
//! `processor:` line, and de-duplicated shared fields printed only on
//! one core.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use super::{arm_data, flag_present};
use crate::error::ScanError;
use crate::fields::FieldList;
use crate::intern::StringTable;
use crate::scanner::{key_matches, KvScanner};
use crate::sysfs::SysPaths;

pub struct ArmCore {
    pub(crate) id: u32,
    pub(crate) khz_min: u32,
    pub(crate) khz_max: u32,
    khz_cur: Cell<u32>,
    pub(crate) model_name: Option<Rc<str>>,
    pub(crate) flags: Option<Rc<str>>,
    pub(crate) implementer: Option<Rc<str>>,
    pub(crate) architecture: Option<Rc<str>>,
    pub(crate) variant: Option<Rc<str>>,
    pub(crate) part: Option<Rc<str>>,
    pub(crate) revision: Option<Rc<str>>,
    pub(crate) decoded_name: Option<Rc<str>>,
}

impl ArmCore {
    fn new(id: u32) -> Self {
        ArmCore {
            id,
            khz_min: 0,
            khz_max: 0,
            khz_cur: Cell::new(0),
            model_name: None,
            flags: None,
            implementer: None,
            architecture: None,
            variant: None,
            part: None,
            revision: None,
            decoded_name: None,
        }
    }
}

pub struct ArmProc {
    model_name: StringTable,
    flags: StringTable,
    implementer: StringTable,
    architecture: StringTable,
    variant: StringTable,
    part: StringTable,
    revision: StringTable,
    max_freq: StringTable,
    decoded: StringTable,

    soc_name: String,
    desc: String,
    max_khz: u32,
    cores: Vec<ArmCore>,
    known_flags: Vec<String>,
    paths: SysPaths,
}

impl ArmProc {
    /// Scans the live system. Fails only if no cores were found.
    pub fn scan(paths: SysPaths) -> Result<Self, ScanError> {
        let text =
            crate::sysfs::read_text(&paths.cpuinfo).ok_or(ScanError::NoCores)?;
        Self::from_cpuinfo(&text, paths)
    }

    /// Scans from an in-memory cpuinfo blob; frequency reads still go
    /// through `paths`.
    pub fn from_cpuinfo(text: &str, paths: SysPaths) -> Result<Self, ScanError> {
        let mut p = ArmProc {
            model_name: StringTable::new(),
            flags: StringTable::new(),
            implementer: StringTable::new(),
            architecture: StringTable::new(),
            variant: StringTable::new(),
            part: StringTable::new(),
            revision: StringTable::new(),
            max_freq: StringTable::new(),
            decoded: StringTable::new(),
            soc_name: String::new(),
            desc: String::new(),
            max_khz: 0,
            cores: Vec::new(),
            known_flags: arm_data::known_flags().map(str::to_string).collect(),
            paths,
        };
        p.parse(text)?;
        p.reconstruct_deduplicated();
        p.read_frequencies();
        p.decode_names();
        p.desc = p.gen_desc();
        p.discover_flags();
        debug!("ARM scan: {} cores, soc '{}'", p.cores.len(), p.soc_name);
        Ok(p)
    }

    fn parse(&mut self, text: &str) -> Result<(), ScanError> {
        // Fallback whole-processor name from a capital-P `Processor`
        // line, committed to a core only if it never saw `model name`.
        let mut rep_pname = String::new();

        let commit_pname =
            |core: Option<&mut ArmCore>, pname: &str, table: &mut StringTable| {
                if let Some(c) = core {
                    if c.model_name.is_none() && !pname.is_empty() {
                        c.model_name = Some(table.add(pname));
                    }
                }
            };

        for (key, value) in KvScanner::new(text) {
            if key_matches(&key, "processor") {
                commit_pname(self.cores.last_mut(), &rep_pname, &mut self.model_name);
                let id = super::parse_int_auto(&value) as u32;
                self.cores.push(ArmCore::new(id));
                continue;
            }
            if key_matches(&key, "Processor") {
                rep_pname = value;
                continue;
            }
            if key_matches(&key, "Hardware") {
                self.soc_name = value;
                continue;
            }

            // Some kernels print a single block with no processor
            // line at all; the first core-scoped key implies core 0.
            if self.cores.is_empty()
                && (key_matches(&key, "model name")
                    || key_matches(&key, "Features")
                    || key_matches(&key, "flags"))
            {
                self.cores.push(ArmCore::new(0));
            }

            let Some(core) = self.cores.last_mut() else {
                continue;
            };
            if key_matches(&key, "model name") {
                core.model_name = Some(self.model_name.add(&value));
            } else if key_matches(&key, "Features") || key_matches(&key, "flags") {
                core.flags = Some(self.flags.add(&value));
            } else if key_matches(&key, "CPU implementer") {
                core.implementer = Some(self.implementer.add(&value));
            } else if key_matches(&key, "CPU architecture") {
                core.architecture = Some(self.architecture.add(&value));
            } else if key_matches(&key, "CPU variant") {
                core.variant = Some(self.variant.add(&value));
            } else if key_matches(&key, "CPU part") {
                core.part = Some(self.part.add(&value));
            } else if key_matches(&key, "CPU revision") {
                core.revision = Some(self.revision.add(&value));
            }
        }
        commit_pname(self.cores.last_mut(), &rep_pname, &mut self.model_name);

        if self.cores.is_empty() {
            return Err(ScanError::NoCores);
        }
        Ok(())
    }

    /// Some kernels print shared fields only once instead of per-core.
    /// Walk from the last core backward; cores missing a field inherit
    /// it from the nearest later core that has one, going through the
    /// intern tables so aggregation counts stay correct.
    fn reconstruct_deduplicated(&mut self) {
        let mut di = self.cores.len() - 1;
        for i in (0..self.cores.len()).rev() {
            if self.cores[i].flags.is_some() {
                di = i;
                continue;
            }
            macro_rules! inherit {
                ($field:ident, $table:ident) => {
                    if self.cores[i].$field.is_none() {
                        if let Some(v) = self.cores[di].$field.clone() {
                            self.cores[i].$field = Some(self.$table.add(&v));
                        }
                    }
                };
            }
            inherit!(flags, flags);
            inherit!(implementer, implementer);
            inherit!(architecture, architecture);
            inherit!(variant, variant);
            inherit!(part, part);
            inherit!(revision, revision);
        }
    }

    fn read_frequencies(&mut self) {
        for core in &mut self.cores {
            core.khz_cur
                .set(self.paths.cpu_freq_khz(core.id, "scaling_cur_freq"));
            core.khz_min = self.paths.cpu_freq_khz(core.id, "scaling_min_freq");
            core.khz_max = self.paths.cpu_freq_khz(core.id, "scaling_max_freq");
            self.max_freq.add(&core.khz_max.to_string());
            if core.khz_max > self.max_khz {
                self.max_khz = core.khz_max;
            }
        }
    }

    fn decode_names(&mut self) {
        for core in &mut self.cores {
            let decoded = arm_data::decoded_name(
                core.implementer.as_deref(),
                core.architecture.as_deref(),
                core.part.as_deref(),
                core.variant.as_deref(),
                core.revision.as_deref(),
                core.model_name.as_deref(),
            );
            if let Some(name) = decoded {
                core.decoded_name = Some(self.decoded.add(&name));
            }
        }
    }

    /// "Nx name + Nx name; Nx freq MHz + ..." aggregate summary.
    fn gen_desc(&self) -> String {
        let names = if self.decoded.is_empty() {
            &self.model_name
        } else {
            &self.decoded
        };
        let name_part: Vec<String> = names
            .iter()
            .map(|(s, n)| format!("{}x {}", n, s))
            .collect();
        let freq_part: Vec<String> = self
            .max_freq
            .iter()
            .map(|(s, n)| {
                let mhz = s.parse::<f64>().unwrap_or(0.0) / 1000.0;
                format!("{}x {:.2} MHz", n, mhz)
            })
            .collect();
        format!("{}; {}", name_part.join(" + "), freq_part.join(" + "))
    }

    /// Flags seen on any core but absent from the static table are
    /// appended to the known-flags list (with no meaning), so flag
    /// enumeration stays complete even for future kernels.
    fn discover_flags(&mut self) {
        let mut found: Vec<String> = Vec::new();
        for (s, _) in self.flags.iter() {
            for tok in s.split(' ').filter(|t| !t.is_empty()) {
                if !self.known_flags.iter().any(|k| k == tok)
                    && !found.iter().any(|k| k == tok)
                {
                    found.push(tok.to_string());
                }
            }
        }
        if !found.is_empty() {
            debug!("discovered {} unknown ARM flags: {:?}", found.len(), found);
        }
        self.known_flags.extend(found);
    }

    /// SoC name from the `Hardware` line; empty if not reported.
    pub fn name(&self) -> &str {
        &self.soc_name
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn cores(&self) -> usize {
        self.cores.len()
    }

    pub fn max_khz(&self) -> u32 {
        self.max_khz
    }

    pub fn core_id(&self, core: usize) -> u32 {
        self.cores.get(core).map(|c| c.id).unwrap_or(0)
    }

    pub fn core_khz_min(&self, core: usize) -> u32 {
        self.cores.get(core).map(|c| c.khz_min).unwrap_or(0)
    }

    pub fn core_khz_max(&self, core: usize) -> u32 {
        self.cores.get(core).map(|c| c.khz_max).unwrap_or(0)
    }

    /// Live value; re-reads the cpufreq file on every call.
    pub fn core_khz_cur(&self, core: usize) -> u32 {
        let Some(c) = self.cores.get(core) else {
            return 0;
        };
        c.khz_cur
            .set(self.paths.cpu_freq_khz(c.id, "scaling_cur_freq"));
        c.khz_cur.get()
    }

    /// Number of cores reporting `flag` (whole-word match); 0 when
    /// absent.
    pub fn has_flag(&self, flag: &str) -> u32 {
        self.flags
            .iter()
            .filter(|(s, _)| flag_present(s, flag))
            .map(|(_, n)| n)
            .sum()
    }

    pub fn all_flags(&self) -> &[String] {
        &self.known_flags
    }

    pub fn fields(&self) -> FieldList<'_> {
        let mut list = FieldList::new();
        list.upsert_static("summary.proc_desc", "Processor", self.desc());
        list.upsert_static("cpu.name", "Processor Name", self.name());
        list.upsert_static("cpu.desc", "Processor Description", self.desc());
        list.upsert_static("cpu.count", "Cores", self.cores().to_string());
        for (i, core) in self.cores.iter().enumerate() {
            list.upsert(
                &format!("cpu.core{}.khz_cur", core.id),
                true,
                &format!("Core {} Current Frequency", core.id),
                Rc::new(move || {
                    Some(format!("{:.2} MHz", self.core_khz_cur(i) as f64 / 1000.0))
                }),
            );
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_paths() -> SysPaths {
        // nonexistent roots: every frequency reads as 0
        SysPaths {
            cpuinfo: "/nonexistent/cpuinfo".into(),
            sys_cpu: "/nonexistent/cpu".into(),
            dmi: "/nonexistent/dmi".into(),
            device_tree: "/nonexistent/dt".into(),
            thermal_zone: "/nonexistent/thermal".into(),
        }
    }

    const PI3_CPUINFO: &str = "\
processor\t: 0
model name\t: ARMv7 Processor rev 4 (v7l)
Features\t: half thumb fastmult vfp edsp neon vfpv3 tls vfpv4 idiva idivt
CPU implementer\t: 0x41
CPU architecture: 7
CPU variant\t: 0x0
CPU part\t: 0xd03
CPU revision\t: 4

processor\t: 1
model name\t: ARMv7 Processor rev 4 (v7l)
Features\t: half thumb fastmult vfp edsp neon vfpv3 tls vfpv4 idiva idivt
CPU implementer\t: 0x41
CPU architecture: 7
CPU variant\t: 0x0
CPU part\t: 0xd03
CPU revision\t: 4

Hardware\t: BCM2709
Revision\t: a02082
Serial\t\t: 00000000deadbeef
";

    #[test]
    fn test_core_per_processor_line() {
        let p = ArmProc::from_cpuinfo(PI3_CPUINFO, test_paths()).unwrap();
        assert_eq!(p.cores(), 2);
        assert_eq!(p.core_id(0), 0);
        assert_eq!(p.core_id(1), 1);
        assert_eq!(p.name(), "BCM2709");
    }

    #[test]
    fn test_identical_cores_share_interned_values() {
        let p = ArmProc::from_cpuinfo(PI3_CPUINFO, test_paths()).unwrap();
        let a = p.cores[0].flags.as_ref().unwrap();
        let b = p.cores[1].flags.as_ref().unwrap();
        assert!(Rc::ptr_eq(a, b));
        assert_eq!(p.flags.ref_count(&a.to_string()), 2);
    }

    #[test]
    fn test_decoded_name_and_desc() {
        let p = ArmProc::from_cpuinfo(PI3_CPUINFO, test_paths()).unwrap();
        assert_eq!(
            p.cores[0].decoded_name.as_deref(),
            Some("ARM Cortex-A53 r0p4 (arch:7)")
        );
        // identical cores and identical (zero) max frequencies group
        assert_eq!(p.desc(), "2x ARM Cortex-A53 r0p4 (arch:7); 2x 0.00 MHz");
    }

    #[test]
    fn test_no_processor_line_synthesizes_core_zero() {
        let text = "\
model name\t: ARMv6-compatible processor rev 7 (v6l)
Features\t: half thumb fastmult vfp edsp java tls
CPU implementer\t: 0x41
CPU architecture: 7
CPU variant\t: 0x0
CPU part\t: 0xb76
CPU revision\t: 7
Hardware\t: BCM2708
";
        let p = ArmProc::from_cpuinfo(text, test_paths()).unwrap();
        assert_eq!(p.cores(), 1);
        assert_eq!(p.core_id(0), 0);
        assert_eq!(
            p.cores[0].decoded_name.as_deref(),
            Some("ARM ARM1176 r0p7 (arch:7)")
        );
    }

    #[test]
    fn test_deduplicated_fields_are_reconstructed() {
        // shared fields printed only on the last core
        let text = "\
processor\t: 0
processor\t: 1
processor\t: 2
processor\t: 3
Features\t: fp asimd evtstrm crc32
CPU implementer\t: 0x41
CPU architecture: 8
CPU variant\t: 0x0
CPU part\t: 0xd03
CPU revision\t: 4
Hardware\t: sun50iw1p1
";
        let p = ArmProc::from_cpuinfo(text, test_paths()).unwrap();
        assert_eq!(p.cores(), 4);
        let donor = p.cores[3].flags.as_ref().unwrap();
        for i in 0..3 {
            let inherited = p.cores[i].flags.as_ref().unwrap();
            assert!(Rc::ptr_eq(donor, inherited));
        }
        assert_eq!(p.flags.ref_count(&donor.to_string()), 4);
        assert_eq!(p.has_flag("asimd"), 4);
    }

    #[test]
    fn test_capital_processor_fallback_name() {
        let text = "\
Processor\t: ARMv6-compatible processor rev 7 (v6l)
processor\t: 0
Features\t: half thumb fastmult vfp edsp java tls
Hardware\t: BCM2708
";
        let p = ArmProc::from_cpuinfo(text, test_paths()).unwrap();
        assert_eq!(
            p.cores[0].model_name.as_deref(),
            Some("ARMv6-compatible processor rev 7 (v6l)")
        );
    }

    #[test]
    fn test_mixed_cores_join_with_plus() {
        let text = "\
processor\t: 0
model name\t: Fast Core
Features\t: fp asimd
CPU implementer\t: 0x41
CPU architecture: 8
CPU variant\t: 0x0
CPU part\t: 0xd08
CPU revision\t: 3

processor\t: 1
model name\t: Little Core
Features\t: fp asimd
CPU implementer\t: 0x41
CPU architecture: 8
CPU variant\t: 0x0
CPU part\t: 0xd03
CPU revision\t: 4
";
        let p = ArmProc::from_cpuinfo(text, test_paths()).unwrap();
        assert_eq!(
            p.desc(),
            "1x ARM Cortex-A72 r0p3 (arch:8) + 1x ARM Cortex-A53 r0p4 (arch:8); 2x 0.00 MHz"
        );
    }

    #[test]
    fn test_unknown_flags_are_discovered() {
        let text = "\
processor\t: 0
Features\t: fp asimd futureflag
";
        let p = ArmProc::from_cpuinfo(text, test_paths()).unwrap();
        assert!(p.all_flags().iter().any(|f| f == "futureflag"));
        assert!(arm_data::flag_meaning("futureflag").is_none());
        assert_eq!(p.has_flag("futureflag"), 1);
    }

    #[test]
    fn test_empty_cpuinfo_fails() {
        assert!(matches!(
            ArmProc::from_cpuinfo("", test_paths()),
            Err(ScanError::NoCores)
        ));
    }

    #[test]
    fn test_frequencies_from_sysfs() {
        use std::fs;
        let dir = tempfile::TempDir::new().unwrap();
        let mut paths = test_paths();
        paths.sys_cpu = dir.path().to_path_buf();
        for cpu in 0..2 {
            let d = dir.path().join(format!("cpu{}/cpufreq", cpu));
            fs::create_dir_all(&d).unwrap();
            fs::write(d.join("scaling_min_freq"), "600000").unwrap();
            fs::write(d.join("scaling_max_freq"), "1200000").unwrap();
            fs::write(d.join("scaling_cur_freq"), "600000").unwrap();
        }
        let text = "processor: 0\nprocessor: 1\nFeatures: fp\n";
        let p = ArmProc::from_cpuinfo(text, paths).unwrap();
        assert_eq!(p.core_khz_max(0), 1_200_000);
        assert_eq!(p.max_khz(), 1_200_000);
        assert_eq!(p.core_khz_cur(1), 600_000);
        assert!(p.desc().ends_with("2x 1200.00 MHz"));
    }
}
