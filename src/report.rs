//! Machine-readable snapshot of one scan, for `--json` output.

use serde::Serialize;

use crate::board::Board;
use crate::cpu::Processor;

#[derive(Debug, Serialize)]
pub struct Report {
    pub board: BoardReport,
    pub cpu: CpuReport,
}

#[derive(Debug, Serialize)]
pub struct BoardReport {
    /// Which probe identified the board.
    pub source: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    pub fields: Vec<ReportField>,
}

#[derive(Debug, Serialize)]
pub struct CpuReport {
    pub name: String,
    pub description: String,
    pub threads: usize,
    pub cores: usize,
    pub packages: usize,
    pub core_list: Vec<CoreReport>,
    /// Flags at least one core reports, with per-flag core counts.
    pub flags: Vec<FlagReport>,
}

#[derive(Debug, Serialize)]
pub struct CoreReport {
    pub id: u32,
    pub khz_min: u32,
    pub khz_max: u32,
    pub khz_cur: u32,
}

#[derive(Debug, Serialize)]
pub struct FlagReport {
    pub flag: String,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportField {
    pub tag: String,
    pub name: String,
    pub value: String,
}

impl Report {
    /// Values are captured at call time; live fields are read once.
    pub fn new(cpu: &Processor, board: &Board, show_serial: bool) -> Self {
        Report {
            board: BoardReport::new(board, show_serial),
            cpu: CpuReport::new(cpu),
        }
    }
}

impl BoardReport {
    fn new(board: &Board, show_serial: bool) -> Self {
        let fields = board
            .fields()
            .iter()
            .filter(|f| show_serial || !f.tag().ends_with(".serial"))
            .map(|f| ReportField {
                tag: f.tag().to_string(),
                name: f.name().to_string(),
                value: f.value().unwrap_or_default(),
            })
            .collect();
        BoardReport {
            source: board.source().to_string(),
            description: board.desc().to_string(),
            serial: if show_serial {
                board.serial().map(str::to_string)
            } else {
                None
            },
            fields,
        }
    }
}

impl CpuReport {
    fn new(cpu: &Processor) -> Self {
        let core_list = (0..cpu.threads())
            .map(|i| CoreReport {
                id: cpu.core_id(i),
                khz_min: cpu.core_khz_min(i),
                khz_max: cpu.core_khz_max(i),
                khz_cur: cpu.core_khz_cur(i),
            })
            .collect();
        let flags = cpu
            .all_flags()
            .iter()
            .filter_map(|flag| {
                let count = cpu.has_flag(flag);
                (count > 0).then(|| FlagReport {
                    flag: flag.clone(),
                    count,
                    meaning: cpu
                        .flag_meaning(flag)
                        .filter(|m| !m.is_empty())
                        .map(str::to_string),
                })
            })
            .collect();
        CpuReport {
            name: cpu.name().to_string(),
            description: cpu.desc().to_string(),
            threads: cpu.threads(),
            cores: cpu.cores(),
            packages: cpu.packages(),
            core_list,
            flags,
        }
    }
}
