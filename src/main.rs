//! Oxidized-PPC - PowerPC decoder and memory demo
//!
//! Decodes instruction words given on the command line (or a built-in
//! sample), stores them in guest memory and fetches them back through the
//! instruction TLB.
//!
//! Usage: `oxidized-ppc [--config <path>] [word...]`

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use op_core::config::Config;
use op_core::{ppu_debug, ppu_trace};
use op_debug::{DisassembledInstruction, PpuDisassembler};
use op_memory::MemorySystem;
use op_ppu::PpuDecoder;

/// addi r3, r0, 5 / add r3, r0, r3 / b 0
const SAMPLE_PROGRAM: [u32; 3] = [0x38600005, 0x7C601A14, 0x48000000];

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    words: Vec<u32>,
}

fn parse_word(arg: &str) -> Result<u32> {
    let digits = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .unwrap_or(arg);
    u32::from_str_radix(digits, 16).with_context(|| format!("Invalid instruction word: {}", arg))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--config" {
            let Some(path) = args.next() else {
                bail!("--config needs a path");
            };
            parsed.config = Some(PathBuf::from(path));
        } else {
            parsed.words.push(parse_word(&arg)?);
        }
    }

    if parsed.words.is_empty() {
        parsed.words = SAMPLE_PROGRAM.to_vec();
    }
    Ok(parsed)
}

/// Load an explicit config file, or the user config with defaults as fallback
fn load_config(path: Option<&Path>) -> op_core::Result<Config> {
    match path {
        Some(path) => Ok(Config::load_from(path)?),
        None => Ok(Config::load().unwrap_or_default()),
    }
}

/// Store `words` from address 0, then fetch and disassemble them
fn run(
    config: &Config,
    words: &[u32],
) -> op_core::Result<(MemorySystem, Vec<DisassembledInstruction>)> {
    let mut mem = MemorySystem::from_config(&config.memory)?;

    for (i, &word) in words.iter().enumerate() {
        mem.write32(i as u64 * 4, word);
    }

    let listing = (0..words.len() as u64)
        .map(|i| {
            let addr = i * 4;
            let word = mem.fetch32(addr);
            ppu_trace!("Fetched 0x{:08X} from 0x{:x}", word, addr);
            PpuDisassembler::disassemble(addr, word)
        })
        .collect();

    Ok((mem, listing))
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    op_core::logging::init(&config);

    tracing::info!("Starting Oxidized-PPC");

    println!("=== Decode ===");
    for &word in &args.words {
        let inst = PpuDecoder::decode(word);
        if !inst.is_known() {
            ppu_debug!("No decode table entry for 0x{:08X}", word);
        }
        println!(
            "0x{:08X}: {} (fmt={})",
            word,
            PpuDecoder::instruction_name(&inst),
            inst.form
        );
    }

    let (mem, listing) = run(&config, &args.words).context("Failed to run guest program")?;

    println!();
    println!("=== Fetch and disassemble ===");
    for line in &listing {
        println!("{:08X}: {}", line.address, line);
    }

    println!();
    println!("TLB hits: {}, misses: {}", mem.tlb_hits(), mem.tlb_misses());
    println!(
        "Valid entries: ITLB {}, DTLB {}",
        mem.itlb().valid_count(),
        mem.dtlb().valid_count()
    );

    tracing::info!("Done");
    Ok(())
}
