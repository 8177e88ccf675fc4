//! boardscan - identify the board and CPU of a Linux system
//!
//! Reads `/proc/cpuinfo`, cpufreq sysfs, and the best available board
//! identity source (Raspberry Pi revision code, DMI, device tree), and
//! renders them as a text summary, detail tables, or JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

use boardscan::{Board, Config, Processor, Report};

/// boardscan - board and CPU identification
#[derive(Parser)]
#[command(name = "boardscan")]
#[command(version)]
#[command(about = "Identify the board and CPU of a Linux system")]
struct Cli {
    /// Include serial numbers in output (also settable in config)
    #[arg(long, global = true)]
    show_serial: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Board and CPU summary (default)
    Report {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Per-core frequency table
    Cpu,

    /// Board identity details
    Board,

    /// CPU feature flags with per-core counts and meanings
    Flags {
        /// Include flags no core reports
        #[arg(long)]
        all: bool,
    },

    /// Dump the combined board + CPU field list
    Fields,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;
    let show_serial = cli.show_serial || config.display.show_serial;

    match cli.command.unwrap_or(Commands::Report { json: false }) {
        Commands::Report { json } => cmd_report(json, show_serial),
        Commands::Cpu => cmd_cpu(),
        Commands::Board => cmd_board(show_serial),
        Commands::Flags { all } => cmd_flags(all),
        Commands::Fields => cmd_fields(show_serial),
    }
}

fn detect() -> Result<(Processor, Board)> {
    let cpu = Processor::detect().context("CPU scan failed")?;
    let board = Board::detect().context("Board detection failed")?;
    Ok((cpu, board))
}

fn cmd_report(json: bool, show_serial: bool) -> Result<()> {
    let (cpu, board) = detect()?;

    if json {
        let report = Report::new(&cpu, &board, show_serial);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{:>12} {}", "Board:".bright_cyan(), board.desc());
    if show_serial {
        if let Some(serial) = board.serial() {
            println!("{:>12} {}", "Serial:".bright_cyan(), serial);
        }
    }
    println!("{:>12} {}", "Processor:".bright_cyan(), cpu.desc());
    println!(
        "{:>12} {} threads, {} cores, {} packages",
        "Topology:".bright_cyan(),
        cpu.threads(),
        cpu.cores(),
        cpu.packages()
    );
    Ok(())
}

fn cmd_cpu() -> Result<()> {
    let cpu = Processor::detect().context("CPU scan failed")?;
    println!("{}", cpu.desc().bold());
    println!(
        "{:>6} {:>12} {:>12} {:>12}",
        "core".bright_cyan(),
        "min kHz".bright_cyan(),
        "cur kHz".bright_cyan(),
        "max kHz".bright_cyan()
    );
    for i in 0..cpu.threads() {
        println!(
            "{:>6} {:>12} {:>12} {:>12}",
            cpu.core_id(i),
            cpu.core_khz_min(i),
            cpu.core_khz_cur(i),
            cpu.core_khz_max(i)
        );
    }
    Ok(())
}

fn cmd_board(show_serial: bool) -> Result<()> {
    let board = Board::detect().context("Board detection failed")?;
    println!("{} ({})", board.desc().bold(), board.source());
    for field in board.fields().iter() {
        if field.tag().starts_with("summary.") {
            continue;
        }
        if !show_serial && field.tag().ends_with(".serial") {
            continue;
        }
        println!(
            "{:>18}: {}",
            field.name().bright_cyan(),
            field.value().unwrap_or_default()
        );
    }
    Ok(())
}

fn cmd_flags(all: bool) -> Result<()> {
    let cpu = Processor::detect().context("CPU scan failed")?;
    for flag in cpu.all_flags() {
        let count = cpu.has_flag(flag);
        if count == 0 && !all {
            continue;
        }
        let count_col = if count > 0 {
            format!("{}x", count).bright_green()
        } else {
            "-".dimmed()
        };
        let meaning = cpu.flag_meaning(flag).unwrap_or("");
        println!("{:>5} {:<20} {}", count_col, flag, meaning.dimmed());
    }
    Ok(())
}

fn cmd_fields(show_serial: bool) -> Result<()> {
    let (cpu, board) = detect()?;
    let combined = board.fields().copy_and_chain(&cpu.fields());
    for field in combined.iter() {
        if !show_serial && field.tag().ends_with(".serial") {
            continue;
        }
        let live = if field.is_live() { "*" } else { " " };
        println!(
            "{} {:<24} {:<28} {}",
            live.bright_yellow(),
            field.tag().dimmed(),
            field.name(),
            field.value().unwrap_or_default()
        );
    }
    Ok(())
}
