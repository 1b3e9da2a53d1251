//! Parse .img file utility
//! Loads a UV-K5 .img file and displays decoded channels and settings

use std::env;
use uvk5_rs::core::{Duplex, Memory};
use uvk5_rs::drivers::uvk5::channel::{CHANNEL_BASE, CHANNEL_SIZE};
use uvk5_rs::drivers::uvk5::MEM_SIZE;
use uvk5_rs::drivers::{CloneModeRadio, Radio, UVK5Radio};
use uvk5_rs::formats::load_img_sized;
use uvk5_rs::memmap::MemoryMap;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.img> [channel | first-last | settings]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} radio.img              # Show all non-empty channels", args[0]);
        eprintln!("  {} radio.img 40           # Show channel 40 with raw bytes", args[0]);
        eprintln!("  {} radio.img 195-214      # Show channels 195-214", args[0]);
        eprintln!("  {} radio.img settings     # Show device settings", args[0]);
        std::process::exit(1);
    }

    let img_file = &args[1];
    let filter = args.get(2).map(|s| s.as_str());

    println!("Loading .img file: {}", img_file);
    let (mmap, metadata) = load_img_sized(img_file, MEM_SIZE)?;
    println!("Radio: {} {}", metadata.vendor, metadata.model);
    println!("Firmware: {}", metadata.firmware().unwrap_or("unknown"));
    println!("Written by version: {}", metadata.tool_version);
    println!("Memory map size: {} bytes\n", mmap.len());

    let mut radio = UVK5Radio::new();
    if let Some(firmware) = metadata.firmware() {
        radio.set_firmware_version(firmware);
    }
    radio.process_mmap(mmap.clone())?;

    match filter {
        None => {
            println!("=== All Non-Empty Channels ===\n");
            let memories = radio.get_memories()?;
            println!("Found {} non-empty channels\n", memories.len());
            for mem in &memories {
                print_memory(mem);
            }
        }
        Some("settings") => {
            for group in radio.get_settings()? {
                println!("=== {} ===", group.label);
                for setting in &group.settings {
                    println!("  {:<40} {}", setting.label, setting.value);
                }
                println!();
            }
        }
        Some(range) if range.contains('-') => {
            let (start, end) = range
                .split_once('-')
                .ok_or_else(|| anyhow::anyhow!("Bad range: {}", range))?;
            let start: u32 = start.parse()?;
            let end: u32 = end.parse()?;

            println!("=== Channels {} to {} ===\n", start, end);
            for num in start..=end {
                let mem = radio.get_memory(num)?;
                if mem.empty {
                    println!("Channel #{}: <empty>\n", num);
                } else {
                    print_memory(&mem);
                }
            }
        }
        Some(num_str) => {
            let num: u32 = num_str.parse()?;
            println!("=== Channel #{} ===\n", num);

            let mem = radio.get_memory(num)?;
            if mem.empty {
                println!("Channel #{}: <empty>", num);
            } else {
                print_memory(&mem);
            }
            print_raw_record(&mmap, num)?;
        }
    }

    Ok(())
}

fn print_memory(mem: &Memory) {
    println!("Channel #{}: \"{}\"", mem.number, mem.name);
    println!("  Frequency:    {} MHz", mem.freq_str());
    println!("  Mode:         {}", mem.mode);
    if mem.duplex != Duplex::None {
        println!(
            "  Duplex:       {} {:.4} MHz (TX {})",
            mem.duplex.as_str(),
            mem.offset as f64 / 1_000_000.0,
            Memory::format_freq(mem.tx_freq())
        );
    }
    if !mem.tx_tone.is_none() {
        println!("  TX tone:      {}", mem.tx_tone);
    }
    if !mem.rx_tone.is_none() {
        println!("  RX tone:      {}", mem.rx_tone);
    }
    println!("  Power:        {}", mem.power);
    println!("  Tuning Step:  {} kHz", mem.tuning_step.khz());
    println!(
        "  Extras:       BCLO={} Reverse={} PTT-ID={} DTMF decode={} Scrambler={}",
        mem.bclo, mem.reverse, mem.ptt_id, mem.dtmf_decode, mem.scrambler
    );
    println!();
}

fn print_raw_record(mmap: &MemoryMap, number: u32) -> anyhow::Result<()> {
    let offset = CHANNEL_BASE + (number as usize - 1) * CHANNEL_SIZE;
    println!("  Raw record at 0x{:04X}:", offset);
    print!("{}", mmap.printable(offset, offset + CHANNEL_SIZE)?);
    println!();
    Ok(())
}
