//! Radio memory dump utility
//! Downloads the full image from a UV-K5 and saves it as a .img file plus a hex dump

use std::env;
use std::fs;
use std::path::Path;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};
use uvk5_rs::drivers::uvk5::{MODEL, VENDOR};
use uvk5_rs::drivers::{CloneModeRadio, Radio, StatusCallback, UVK5Radio};
use uvk5_rs::formats::{save_img, Metadata};
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
        eprintln!("Usage: {} <port> <output.img>", args[0]);
        eprintln!("Example: {} /dev/ttyUSB0 uvk5-backup.img", args[0]);
        eprintln!("\nA hex dump is written next to the image as <output>.hex");
        std::process::exit(1);
    }

    let port_name = &args[1];
    let img_path = Path::new(&args[2]);

    tracing::info!("Radio Memory Dump Utility");
    tracing::info!("Port: {}", port_name);

    let mut port = SerialPort::open(port_name, SerialConfig::uvk5())?;
    port.clear_all()?;

    let mut radio = UVK5Radio::new();
    tracing::info!("Downloading {} from radio...", radio.get_name());

    let progress: StatusCallback = Box::new(|current, total, message| {
        if current % 0x400 == 0 || current == total {
            tracing::info!("[{}/{}] {}", current, total, message);
        }
    });
    let mmap = radio.sync_in(&mut port, Some(progress)).await?;

    let metadata = Metadata::for_radio(VENDOR, MODEL, radio.firmware_version());
    save_img(img_path, &mmap, &metadata)?;
    tracing::info!("Saved image to: {}", img_path.display());

    let hex_path = img_path.with_extension("hex");
    fs::write(&hex_path, mmap.printable(0, mmap.len())?)?;
    tracing::info!("Saved hex dump to: {}", hex_path.display());

    println!("\n=== Download Complete ===");
    println!("Firmware:   {}", radio.firmware_version());
    println!("Image:      {} ({} bytes)", img_path.display(), mmap.len());
    println!("Hex dump:   {}", hex_path.display());

    Ok(())
}
