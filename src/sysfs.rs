//! Blocking readers for the pseudo-files the inspectors consume.
//!
//! Every read is a single synchronous pass with no retry; a missing
//! file is "no data" and comes back as `None` / `0`. `SysPaths`
//! bundles the filesystem roots so tests can point the inspectors at
//! a tempdir instead of the live system.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem roots for everything boardscan reads.
#[derive(Debug, Clone)]
pub struct SysPaths {
    /// `/proc/cpuinfo`
    pub cpuinfo: PathBuf,
    /// `/sys/devices/system/cpu`
    pub sys_cpu: PathBuf,
    /// `/sys/class/dmi/id`
    pub dmi: PathBuf,
    /// `/proc/device-tree`
    pub device_tree: PathBuf,
    /// `/sys/class/thermal/thermal_zone0`
    pub thermal_zone: PathBuf,
}

impl Default for SysPaths {
    fn default() -> Self {
        SysPaths {
            cpuinfo: PathBuf::from("/proc/cpuinfo"),
            sys_cpu: PathBuf::from("/sys/devices/system/cpu"),
            dmi: PathBuf::from("/sys/class/dmi/id"),
            device_tree: PathBuf::from("/proc/device-tree"),
            thermal_zone: PathBuf::from("/sys/class/thermal/thermal_zone0"),
        }
    }
}

impl SysPaths {
    /// One cpufreq value in kHz for a logical cpu; 0 if the file is
    /// missing or unparsable. `leaf` is e.g. `"scaling_cur_freq"`.
    pub fn cpu_freq_khz(&self, cpu: u32, leaf: &str) -> u32 {
        let path = self
            .sys_cpu
            .join(format!("cpu{}", cpu))
            .join("cpufreq")
            .join(leaf);
        read_text(&path)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }

    /// One DMI id string, newlines folded to spaces.
    pub fn dmi_string(&self, name: &str) -> Option<String> {
        read_text(&self.dmi.join(name)).map(|s| flatten(&s))
    }

    /// One device-tree string property. These are NUL-terminated
    /// blobs; trailing NULs are dropped and newlines folded to spaces.
    pub fn dt_string(&self, name: &str) -> Option<String> {
        let raw = fs::read(self.device_tree.join(name)).ok()?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let s = String::from_utf8_lossy(&raw[..end]).into_owned();
        Some(flatten(&s))
    }

    /// SoC temperature in degrees C from thermal_zone0 (reported in
    /// millidegrees); 0.0 if unavailable.
    pub fn soc_temp_c(&self) -> f32 {
        read_text(&self.thermal_zone.join("temp"))
            .and_then(|s| s.trim().parse::<i32>().ok())
            .map(|milli| milli as f32 / 1000.0)
            .unwrap_or(0.0)
    }
}

/// Reads a whole text file; `None` on any error.
pub fn read_text(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) => {
            debug!("read {} failed: {}", path.display(), e);
            None
        }
    }
}

fn flatten(s: &str) -> String {
    s.replace('\n', " ").trim_end().to_string()
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
    fn test_cpu_freq_khz_reads_value() {
        let dir = TempDir::new().unwrap();
        let p = paths_in(&dir);
        let freq_dir = p.sys_cpu.join("cpu0").join("cpufreq");
        fs::create_dir_all(&freq_dir).unwrap();
        fs::write(freq_dir.join("scaling_max_freq"), "1200000\n").unwrap();
        assert_eq!(p.cpu_freq_khz(0, "scaling_max_freq"), 1_200_000);
    }

    #[test]
    fn test_cpu_freq_khz_missing_is_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(paths_in(&dir).cpu_freq_khz(3, "scaling_cur_freq"), 0);
    }

    #[test]
    fn test_dmi_string_folds_newlines() {
        let dir = TempDir::new().unwrap();
        let p = paths_in(&dir);
        fs::create_dir_all(&p.dmi).unwrap();
        fs::write(p.dmi.join("board_vendor"), "ASUSTeK\n").unwrap();
        assert_eq!(p.dmi_string("board_vendor").unwrap(), "ASUSTeK");
        assert!(p.dmi_string("board_name").is_none());
    }

    #[test]
    fn test_dt_string_strips_nul() {
        let dir = TempDir::new().unwrap();
        let p = paths_in(&dir);
        fs::create_dir_all(&p.device_tree).unwrap();
        fs::write(p.device_tree.join("model"), b"Raspberry Pi 3 Model B Rev 1.2\0").unwrap();
        assert_eq!(
            p.dt_string("model").unwrap(),
            "Raspberry Pi 3 Model B Rev 1.2"
        );
    }

    #[test]
    fn test_soc_temp_millidegrees() {
        let dir = TempDir::new().unwrap();
        let p = paths_in(&dir);
        fs::create_dir_all(&p.thermal_zone).unwrap();
        fs::write(p.thermal_zone.join("temp"), "48312\n").unwrap();
        assert!((p.soc_temp_c() - 48.312).abs() < 0.001);
    }

    #[test]
    fn test_soc_temp_missing_is_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(paths_in(&dir).soc_temp_c(), 0.0);
    }
}
