//! x86 CPU inspector.
//!
//! Same scan pattern as the ARM inspector, plus physical-package and
//! core topology from `physical id` / `core id`, and three flag
//! categories (`flags`, `bugs`, `power management`) merged into one
//! per-flag table with `bug:` / `pm:` prefixes. On kernels too old to
//! print a `bugs:` line, the bug list is synthesized from the legacy
//! boolean bug lines and the workaround flags older kernels reported
//! as features.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use super::{flag_present, parse_int_auto, x86_data};
use crate::error::ScanError;
use crate::fields::FieldList;
use crate::intern::StringTable;
use crate::scanner::{key_matches, KvScanner};
use crate::sysfs::SysPaths;

/// Feature flags older kernels listed in `flags:` but that are really
/// bug workarounds; they get promoted into the synthesized bug list.
const PROMOTED_BUG_FLAGS: &[&str] = &[
    "fxsave_leak",
    "clflush_monitor",
    "11ap",
    "tlb_mmatch",
    "apic_c1e",
];

pub struct X86Thread {
    pub(crate) id: u32,
    pub(crate) core: u32,
    pub(crate) package: u32,
    pub(crate) khz_min: u32,
    pub(crate) khz_max: u32,
    khz_cur: Cell<u32>,
    pub(crate) model_name: Option<Rc<str>>,
    pub(crate) flags: Option<Rc<str>>,
    pub(crate) bug_flags: Option<Rc<str>>,
    pub(crate) pm_flags: Option<Rc<str>>,
    pub(crate) physical_id: Option<Rc<str>>,
    pub(crate) core_id: Option<Rc<str>>,
    bug_fdiv: bool,
    bug_hlt: bool,
    bug_f00f: bool,
    bug_coma: bool,
}

impl X86Thread {
    fn new(id: u32) -> Self {
        X86Thread {
            id,
            core: 0,
            package: 0,
            khz_min: 0,
            khz_max: 0,
            khz_cur: Cell::new(0),
            model_name: None,
            flags: None,
            bug_flags: None,
            pm_flags: None,
            physical_id: None,
            core_id: None,
            bug_fdiv: false,
            bug_hlt: false,
            bug_f00f: false,
            bug_coma: false,
        }
    }
}

pub struct X86Proc {
    model_name: StringTable,
    flags: StringTable,
    bug_flags: StringTable,
    pm_flags: StringTable,
    max_freq: StringTable,
    physical_id: StringTable,
    core_id: StringTable,
    /// Every individual flag with its category prefix, weighted by
    /// how many threads report it.
    each_flag: StringTable,

    cpu_name: String,
    desc: String,
    max_khz: u32,
    threads: Vec<X86Thread>,
    core_count: usize,
    package_count: usize,
    known_flags: Vec<String>,
    paths: SysPaths,
}

impl X86Proc {
    /// Scans the live system. Fails only if no threads were found.
    pub fn scan(paths: SysPaths) -> Result<Self, ScanError> {
        let text =
            crate::sysfs::read_text(&paths.cpuinfo).ok_or(ScanError::NoCores)?;
        Self::from_cpuinfo(&text, paths)
    }

    pub fn from_cpuinfo(text: &str, paths: SysPaths) -> Result<Self, ScanError> {
        let mut p = X86Proc {
            model_name: StringTable::new(),
            flags: StringTable::new(),
            bug_flags: StringTable::new(),
            pm_flags: StringTable::new(),
            max_freq: StringTable::new(),
            physical_id: StringTable::new(),
            core_id: StringTable::new(),
            each_flag: StringTable::new(),
            cpu_name: String::new(),
            desc: String::new(),
            max_khz: 0,
            threads: Vec::new(),
            core_count: 0,
            package_count: 0,
            known_flags: x86_data::known_flags().map(str::to_string).collect(),
            paths,
        };
        p.parse(text)?;
        p.reconstruct_deduplicated();
        p.count_topology();
        p.synthesize_legacy_bugs();
        p.read_frequencies();
        p.desc = p.gen_desc();
        p.cpu_name = if p.model_name.len() == 1 {
            p.model_name.iter().next().map(|(s, _)| s.to_string()).unwrap_or_default()
        } else {
            String::new()
        };
        p.process_flags();
        debug!(
            "x86 scan: {} threads, {} cores, {} packages",
            p.threads.len(),
            p.core_count,
            p.package_count
        );
        Ok(p)
    }

    fn parse(&mut self, text: &str) -> Result<(), ScanError> {
        let mut rep_pname = String::new();

        let commit_pname =
            |thread: Option<&mut X86Thread>, pname: &str, table: &mut StringTable| {
                if let Some(t) = thread {
                    if t.model_name.is_none() && !pname.is_empty() {
                        t.model_name = Some(table.add(pname));
                    }
                }
            };

        for (key, value) in KvScanner::new(text) {
            if key_matches(&key, "Processor") {
                rep_pname = value;
                continue;
            }
            if key_matches(&key, "processor") {
                commit_pname(self.threads.last_mut(), &rep_pname, &mut self.model_name);
                let id = parse_int_auto(&value) as u32;
                self.threads.push(X86Thread::new(id));
                continue;
            }

            // cpuinfo without a `processor : n` line means a single
            // thread
            if self.threads.is_empty()
                && (key_matches(&key, "model name") || key_matches(&key, "flags"))
            {
                self.threads.push(X86Thread::new(0));
            }

            let Some(t) = self.threads.last_mut() else {
                continue;
            };
            if key_matches(&key, "model name") {
                t.model_name = Some(self.model_name.add(&value));
            } else if key_matches(&key, "physical id") {
                t.physical_id = Some(self.physical_id.add(&value));
            } else if key_matches(&key, "core id") {
                t.core_id = Some(self.core_id.add(&value));
            } else if key_matches(&key, "flags") {
                t.flags = Some(self.flags.add(&value));
            } else if key_matches(&key, "bugs") {
                t.bug_flags = Some(self.bug_flags.add(&value));
            } else if key_matches(&key, "power management") {
                t.pm_flags = Some(self.pm_flags.add(&value));
            } else if key_matches(&key, "fdiv_bug") {
                t.bug_fdiv = value.starts_with("yes");
            } else if key_matches(&key, "hlt_bug") {
                t.bug_hlt = value.starts_with("yes");
            } else if key_matches(&key, "f00f_bug") {
                t.bug_f00f = value.starts_with("yes");
            } else if key_matches(&key, "coma_bug") {
                t.bug_coma = value.starts_with("yes");
            }
        }
        commit_pname(self.threads.last_mut(), &rep_pname, &mut self.model_name);

        if self.threads.is_empty() {
            return Err(ScanError::NoCores);
        }
        Ok(())
    }

    /// Re-duplicates shared fields on kernels that print them only
    /// once; missing fields inherit from the nearest later thread
    /// that has them.
    fn reconstruct_deduplicated(&mut self) {
        let mut di = self.threads.len() - 1;
        for i in (0..self.threads.len()).rev() {
            if self.threads[i].flags.is_some() {
                di = i;
                continue;
            }
            macro_rules! inherit {
                ($field:ident, $table:ident) => {
                    if self.threads[i].$field.is_none() {
                        if let Some(v) = self.threads[di].$field.clone() {
                            self.threads[i].$field = Some(self.$table.add(&v));
                        }
                    }
                };
            }
            inherit!(flags, flags);
            inherit!(bug_flags, bug_flags);
            inherit!(pm_flags, pm_flags);
        }
    }

    fn count_topology(&mut self) {
        for t in &mut self.threads {
            t.core = t
                .core_id
                .as_deref()
                .map(|s| parse_int_auto(s) as u32)
                .unwrap_or(t.id);
            t.package = t
                .physical_id
                .as_deref()
                .map(|s| parse_int_auto(s) as u32)
                .unwrap_or(0);
        }
        self.core_count = if self.core_id.is_empty() {
            self.threads.len()
        } else {
            self.core_id.len()
        };
        self.package_count = if self.physical_id.is_empty() {
            self.threads.len()
        } else {
            self.physical_id.len()
        };
    }

    /// Builds a `bugs` string for threads on kernels that never
    /// printed one, from the legacy boolean lines plus the workaround
    /// flags that were reported as features.
    fn synthesize_legacy_bugs(&mut self) {
        for i in 0..self.threads.len() {
            if self.threads[i].bug_flags.is_some() {
                continue;
            }
            let mut bugs: Vec<&str> = Vec::new();
            if self.threads[i].bug_fdiv {
                bugs.push("fdiv");
            }
            if self.threads[i].bug_hlt {
                bugs.push("_hlt");
            }
            if self.threads[i].bug_f00f {
                bugs.push("f00f");
            }
            if self.threads[i].bug_coma {
                bugs.push("coma");
            }
            if let Some(flags) = self.threads[i].flags.as_deref() {
                for promoted in PROMOTED_BUG_FLAGS {
                    if flag_present(flags, promoted) {
                        bugs.push(promoted);
                    }
                }
            }
            if !bugs.is_empty() {
                let joined = bugs.join(" ");
                self.threads[i].bug_flags = Some(self.bug_flags.add(&joined));
            }
        }
    }

    fn read_frequencies(&mut self) {
        for t in &mut self.threads {
            t.khz_cur
                .set(self.paths.cpu_freq_khz(t.id, "scaling_cur_freq"));
            t.khz_min = self.paths.cpu_freq_khz(t.id, "scaling_min_freq");
            t.khz_max = self.paths.cpu_freq_khz(t.id, "scaling_max_freq");
            self.max_freq.add(&t.khz_max.to_string());
            if t.khz_max > self.max_khz {
                self.max_khz = t.khz_max;
            }
        }
    }

    fn gen_desc(&self) -> String {
        let single_model = self.model_name.len() == 1;
        let name_part: Vec<String> = self
            .model_name
            .iter()
            .map(|(s, n)| {
                if single_model {
                    s.to_string()
                } else {
                    format!("{}x {}", n, s)
                }
            })
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

    /// Merges the three flag categories into the per-flag table with
    /// category prefixes, each entry weighted by its source string's
    /// ref-count; flags missing from the static table are appended to
    /// the known-flags list.
    fn process_flags(&mut self) {
        let sets: [(&StringTable, &str); 3] = [
            (&self.flags, ""),
            (&self.bug_flags, "bug:"),
            (&self.pm_flags, "pm:"),
        ];
        let mut merged: Vec<(String, u32)> = Vec::new();
        let mut discovered: Vec<String> = Vec::new();
        for (table, prefix) in sets {
            for (s, refs) in table.iter() {
                for tok in s.split(' ').filter(|t| !t.is_empty()) {
                    let flag = format!("{}{}", prefix, tok);
                    if !self.known_flags.iter().any(|k| *k == flag)
                        && !discovered.iter().any(|k| *k == flag)
                    {
                        discovered.push(flag.clone());
                    }
                    merged.push((flag, refs));
                }
            }
        }
        for (flag, refs) in merged {
            self.each_flag.add_weighted(&flag, refs);
        }
        if !discovered.is_empty() {
            debug!(
                "discovered {} unknown x86 flags: {:?}",
                discovered.len(),
                discovered
            );
        }
        self.known_flags.extend(discovered);
    }

    /// Model name when all threads agree on one, empty otherwise.
    pub fn name(&self) -> &str {
        &self.cpu_name
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn threads(&self) -> usize {
        self.threads.len()
    }

    pub fn cores(&self) -> usize {
        self.core_count
    }

    pub fn packages(&self) -> usize {
        self.package_count
    }

    pub fn max_khz(&self) -> u32 {
        self.max_khz
    }

    pub fn thread_id(&self, thread: usize) -> u32 {
        self.threads.get(thread).map(|t| t.id).unwrap_or(0)
    }

    /// Core id of a thread (its own id when the kernel reported none).
    pub fn thread_core(&self, thread: usize) -> u32 {
        self.threads.get(thread).map(|t| t.core).unwrap_or(0)
    }

    /// Physical package id of a thread.
    pub fn thread_package(&self, thread: usize) -> u32 {
        self.threads.get(thread).map(|t| t.package).unwrap_or(0)
    }

    pub fn thread_khz_min(&self, thread: usize) -> u32 {
        self.threads.get(thread).map(|t| t.khz_min).unwrap_or(0)
    }

    pub fn thread_khz_max(&self, thread: usize) -> u32 {
        self.threads.get(thread).map(|t| t.khz_max).unwrap_or(0)
    }

    /// Live value; re-reads the cpufreq file on every call.
    pub fn thread_khz_cur(&self, thread: usize) -> u32 {
        let Some(t) = self.threads.get(thread) else {
            return 0;
        };
        t.khz_cur
            .set(self.paths.cpu_freq_khz(t.id, "scaling_cur_freq"));
        t.khz_cur.get()
    }

    /// Number of threads reporting `flag` (with its category prefix);
    /// 0 when absent.
    pub fn has_flag(&self, flag: &str) -> u32 {
        self.each_flag.ref_count(flag)
    }

    pub fn all_flags(&self) -> &[String] {
        &self.known_flags
    }

    pub fn fields(&self) -> FieldList<'_> {
        let mut list = FieldList::new();
        list.upsert_static("summary.proc_desc", "Processor", self.desc());
        list.upsert_static("cpu.name", "Processor Name", self.name());
        list.upsert_static("cpu.desc", "Processor Description", self.desc());
        list.upsert_static("cpu.physical_count", "Count", self.packages().to_string());
        list.upsert_static("cpu.core_count", "Cores", self.cores().to_string());
        list.upsert_static("cpu.count", "Threads", self.threads().to_string());
        for (i, t) in self.threads.iter().enumerate() {
            list.upsert(
                &format!("cpu.thread{}.khz_cur", t.id),
                true,
                &format!("Thread {} Current Frequency", t.id),
                Rc::new(move || {
                    Some(format!("{:.2} MHz", self.thread_khz_cur(i) as f64 / 1000.0))
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
        SysPaths {
            cpuinfo: "/nonexistent/cpuinfo".into(),
            sys_cpu: "/nonexistent/cpu".into(),
            dmi: "/nonexistent/dmi".into(),
            device_tree: "/nonexistent/dt".into(),
            thermal_zone: "/nonexistent/thermal".into(),
        }
    }

    const TWO_THREAD_CPUINFO: &str = "\
processor\t: 0
model name\t: Intel(R) Core(TM) i3-4130 CPU @ 3.40GHz
physical id\t: 0
core id\t\t: 0
flags\t\t: fpu vme sse sse2 ht
bugs\t\t:
power management:

processor\t: 1
model name\t: Intel(R) Core(TM) i3-4130 CPU @ 3.40GHz
physical id\t: 0
core id\t\t: 0
flags\t\t: fpu vme sse sse2 ht
bugs\t\t:
power management:
";

    #[test]
    fn test_thread_core_package_counts() {
        let p = X86Proc::from_cpuinfo(TWO_THREAD_CPUINFO, test_paths()).unwrap();
        assert_eq!(p.threads(), 2);
        // both threads share core 0 on package 0
        assert_eq!(p.cores(), 1);
        assert_eq!(p.packages(), 1);
        assert_eq!(p.thread_id(1), 1);
        assert_eq!(p.thread_core(1), 0);
        assert_eq!(p.thread_package(1), 0);
    }

    #[test]
    fn test_single_model_name_has_no_count_prefix() {
        let p = X86Proc::from_cpuinfo(TWO_THREAD_CPUINFO, test_paths()).unwrap();
        assert_eq!(p.name(), "Intel(R) Core(TM) i3-4130 CPU @ 3.40GHz");
        assert!(p
            .desc()
            .starts_with("Intel(R) Core(TM) i3-4130 CPU @ 3.40GHz; "));
    }

    #[test]
    fn test_flag_counts_are_per_thread() {
        let p = X86Proc::from_cpuinfo(TWO_THREAD_CPUINFO, test_paths()).unwrap();
        assert_eq!(p.has_flag("sse2"), 2);
        assert_eq!(p.has_flag("sse"), 2);
        assert_eq!(p.has_flag("avx"), 0);
    }

    #[test]
    fn test_counts_fall_back_to_thread_count() {
        let text = "\
processor: 0
model name: Old CPU
flags: fpu tsc
processor: 1
model name: Old CPU
flags: fpu tsc
";
        let p = X86Proc::from_cpuinfo(text, test_paths()).unwrap();
        assert_eq!(p.cores(), 2);
        assert_eq!(p.packages(), 2);
    }

    #[test]
    fn test_legacy_bug_synthesis() {
        let text = "\
processor: 0
model name: Pentium 75 - 200
fdiv_bug: yes
hlt_bug: no
f00f_bug: yes
coma_bug: no
flags: fpu tsc 11ap
";
        let p = X86Proc::from_cpuinfo(text, test_paths()).unwrap();
        assert_eq!(
            p.threads[0].bug_flags.as_deref(),
            Some("fdiv f00f 11ap")
        );
        assert_eq!(p.has_flag("bug:fdiv"), 1);
        assert_eq!(p.has_flag("bug:f00f"), 1);
        assert_eq!(p.has_flag("bug:11ap"), 1);
        assert_eq!(p.has_flag("bug:coma"), 0);
    }

    #[test]
    fn test_modern_bugs_line_used_directly() {
        let text = "\
processor: 0
model name: AMD Ryzen 5 3600
flags: fpu sse sse2
bugs: sysret_ss_attrs spectre_v1 spectre_v2
power management: ts ttp
";
        let p = X86Proc::from_cpuinfo(text, test_paths()).unwrap();
        assert_eq!(p.has_flag("bug:sysret_ss_attrs"), 1);
        assert_eq!(p.has_flag("pm:ts"), 1);
        // spectre flags postdate the static table; discovered at scan
        assert_eq!(p.has_flag("bug:spectre_v1"), 1);
        assert!(p.all_flags().iter().any(|f| f == "bug:spectre_v1"));
    }

    #[test]
    fn test_no_processor_line_single_thread() {
        let text = "model name: Some 486\nflags: fpu\n";
        let p = X86Proc::from_cpuinfo(text, test_paths()).unwrap();
        assert_eq!(p.threads(), 1);
        assert_eq!(p.thread_id(0), 0);
    }

    #[test]
    fn test_deduplicated_flag_reconstruction() {
        let text = "\
processor: 0
model name: CPU
processor: 1
model name: CPU
flags: fpu sse
bugs: null_seg
";
        let p = X86Proc::from_cpuinfo(text, test_paths()).unwrap();
        let a = p.threads[0].flags.as_ref().unwrap();
        let b = p.threads[1].flags.as_ref().unwrap();
        assert!(Rc::ptr_eq(a, b));
        assert_eq!(p.has_flag("sse"), 2);
        assert_eq!(p.has_flag("bug:null_seg"), 2);
    }

    #[test]
    fn test_empty_cpuinfo_fails() {
        assert!(matches!(
            X86Proc::from_cpuinfo("\n\n", test_paths()),
            Err(ScanError::NoCores)
        ));
    }

    #[test]
    fn test_mixed_models_grouped_with_counts() {
        let text = "\
processor: 0
model name: P-Core
flags: fpu
processor: 1
model name: P-Core
flags: fpu
processor: 2
model name: E-Core
flags: fpu
";
        let p = X86Proc::from_cpuinfo(text, test_paths()).unwrap();
        assert_eq!(p.name(), "");
        assert!(p.desc().starts_with("2x P-Core + 1x E-Core; "));
    }
}
