//! Radio upload utility
//! Writes the programmable part of a saved .img file back to a UV-K5

use std::env;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};
use uvk5_rs::drivers::uvk5::{MEM_SIZE, PROG_SIZE};
use uvk5_rs::drivers::{CloneModeRadio, Radio, StatusCallback, UVK5Radio};
use uvk5_rs::formats::load_img_sized;
use uvk5_rs::serial::{SerialConfig, SerialPort};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <port> <input.img>", args[0]);
        eprintln!("Example: {} /dev/ttyUSB0 uvk5-backup.img", args[0]);
        std::process::exit(1);
    }

    let port_name = &args[1];
    let img_file = &args[2];

    let (mmap, metadata) = load_img_sized(img_file, MEM_SIZE)?;
    tracing::info!(
        "Loaded {} ({} {}, firmware {})",
        img_file,
        metadata.vendor,
        metadata.model,
        metadata.firmware().unwrap_or("unknown")
    );

    let mut radio = UVK5Radio::new();
    radio.process_mmap(mmap.clone())?;

    let mut port = SerialPort::open(port_name, SerialConfig::uvk5())?;
    port.clear_all()?;

    tracing::info!("Uploading {} bytes to {}...", PROG_SIZE, radio.get_name());
    let progress: StatusCallback = Box::new(|current, total, message| {
        if current % 0x400 == 0 || current == total {
            tracing::info!("[{}/{}] {}", current, total, message);
        }
    });
    radio.sync_out(&mut port, &mmap, Some(progress)).await?;

    println!("\n=== Upload Complete ===");
    println!("Firmware: {}", radio.firmware_version());
    println!("The radio has been reset.");

    Ok(())
}
