// Quansheng UV-K5 driver

pub mod channel;
pub mod protocol;
pub mod settings;

pub use protocol::DeviceProtocol;
pub use settings::Settings;

use crate::core::{Memory, Mode, PowerLevel, RadioFeatures, RadioSettingGroup, TuningStep};
use crate::drivers::traits::{CloneModeRadio, Radio, RadioError, RadioResult, StatusCallback};
use crate::memmap::MemoryMap;
use crate::serial::{BlockProtocol, Transport};
use std::time::Duration;
use tracing::info;

pub const VENDOR: &str = "Quansheng";
pub const MODEL: &str = "UV-K5";

/// Full EEPROM image
pub const MEM_SIZE: usize = 0x2000;
/// Leading part of the image that is written back on upload
pub const PROG_SIZE: usize = 0x1D00;
pub const MEM_BLOCK: usize = 0x80;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Identify, then read the whole image block by block
pub async fn download_image<T: Transport>(
    port: &mut T,
    timeout: Duration,
    status_fn: Option<&StatusCallback>,
) -> RadioResult<(String, MemoryMap)> {
    let mut device = DeviceProtocol::new(port, timeout);
    let firmware = device.identify().await?;

    let plan = BlockProtocol::new(MEM_BLOCK, MEM_SIZE);
    let mut image = Vec::with_capacity(MEM_SIZE);

    for (i, (offset, len)) in plan.blocks().enumerate() {
        let block = device.read_block(offset as u16, len as u8).await?;
        image.extend_from_slice(&block);
        plan.report(status_fn, "Downloading", i);
    }

    info!("Downloaded {} bytes from {} {}", image.len(), VENDOR, MODEL);
    Ok((firmware, MemoryMap::new(image)))
}

/// Identify, write the programmable part of `image`, then reset the radio.
///
/// A rejected block stops the upload and no reset is sent.
pub async fn upload_image<T: Transport>(
    port: &mut T,
    timeout: Duration,
    image: &MemoryMap,
    status_fn: Option<&StatusCallback>,
) -> RadioResult<String> {
    if image.len() < PROG_SIZE {
        return Err(RadioError::Radio(format!(
            "Image is {} bytes, need at least {}",
            image.len(),
            PROG_SIZE
        )));
    }

    let mut device = DeviceProtocol::new(port, timeout);
    let firmware = device.identify().await?;

    let plan = BlockProtocol::new(MEM_BLOCK, PROG_SIZE);
    for (i, (offset, len)) in plan.blocks().enumerate() {
        let data = image.get(offset, Some(len))?;
        if !device.write_block(offset as u16, data).await? {
            return Err(RadioError::Protocol(format!(
                "Radio rejected block write at 0x{:04X}",
                offset
            )));
        }
        plan.report(status_fn, "Uploading", i);
    }

    device.reset().await?;
    info!("Uploaded {} bytes to {} {}", PROG_SIZE, VENDOR, MODEL);
    Ok(firmware)
}

/// Quansheng UV-K5 clone-mode radio
pub struct UVK5Radio {
    mmap: Option<MemoryMap>,
    firmware: String,
    timeout: Duration,
}

impl UVK5Radio {
    pub fn new() -> Self {
        Self {
            mmap: None,
            firmware: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Firmware string reported by the last identify, empty before any sync
    pub fn firmware_version(&self) -> &str {
        &self.firmware
    }

    /// Remember a firmware string, e.g. one read back from image metadata
    pub fn set_firmware_version(&mut self, firmware: impl Into<String>) {
        self.firmware = firmware.into();
    }

    pub fn mmap(&self) -> Option<&MemoryMap> {
        self.mmap.as_ref()
    }

    fn image(&self) -> RadioResult<&MemoryMap> {
        self.mmap
            .as_ref()
            .ok_or_else(|| RadioError::Radio("No memory map loaded".to_string()))
    }

    fn image_mut(&mut self) -> RadioResult<&mut MemoryMap> {
        self.mmap
            .as_mut()
            .ok_or_else(|| RadioError::Radio("No memory map loaded".to_string()))
    }

    /// Decode the settings block
    pub fn settings(&self) -> RadioResult<Settings> {
        Settings::decode(self.image()?)
    }

    /// Encode a settings block into the loaded image
    pub fn set_typed_settings(&mut self, settings: &Settings) -> RadioResult<()> {
        let mut updated = self.image()?.clone();
        settings.encode(&mut updated)?;
        self.mmap = Some(updated);
        Ok(())
    }
}

impl Default for UVK5Radio {
    fn default() -> Self {
        Self::new()
    }
}

impl Radio for UVK5Radio {
    fn vendor(&self) -> &str {
        VENDOR
    }

    fn model(&self) -> &str {
        MODEL
    }

    fn get_features(&self) -> RadioFeatures {
        RadioFeatures {
            has_bank: false,
            has_rx_dtcs: true,
            has_ctone: true,
            has_settings: true,
            has_name: true,
            can_delete: true,
            valid_modes: vec![Mode::Fm, Mode::Nfm, Mode::Am],
            valid_tuning_steps: TuningStep::ALL.to_vec(),
            valid_bands: vec![(18_000_000, 620_000_000), (840_000_000, 1_300_000_000)],
            valid_power_levels: vec![PowerLevel::High, PowerLevel::Med, PowerLevel::Low],
            valid_name_length: channel::NAME_SIZE,
            memory_bounds: (1, channel::CHANNEL_COUNT as u32),
            ..RadioFeatures::default()
        }
    }

    fn get_memory(&self, number: u32) -> RadioResult<Memory> {
        channel::read_channel(self.image()?, number)
    }

    fn set_memory(&mut self, memory: &Memory) -> RadioResult<()> {
        channel::write_channel(self.image_mut()?, memory)
    }

    fn get_settings(&self) -> RadioResult<Vec<RadioSettingGroup>> {
        Ok(self.settings()?.to_groups(&self.firmware))
    }

    fn set_settings(&mut self, groups: &[RadioSettingGroup]) -> RadioResult<()> {
        let mut settings = self.settings()?;
        settings.apply(groups)?;
        self.set_typed_settings(&settings)
    }
}

impl CloneModeRadio for UVK5Radio {
    fn get_memsize(&self) -> usize {
        MEM_SIZE
    }

    async fn sync_in<T: Transport>(
        &mut self,
        port: &mut T,
        status_fn: Option<StatusCallback>,
    ) -> RadioResult<MemoryMap> {
        let (firmware, mmap) = download_image(port, self.timeout, status_fn.as_ref()).await?;
        self.firmware = firmware;
        self.mmap = Some(mmap.clone());
        Ok(mmap)
    }

    async fn sync_out<T: Transport>(
        &mut self,
        port: &mut T,
        mmap: &MemoryMap,
        status_fn: Option<StatusCallback>,
    ) -> RadioResult<()> {
        self.firmware = upload_image(port, self.timeout, mmap, status_fn.as_ref()).await?;
        Ok(())
    }

    fn process_mmap(&mut self, mmap: MemoryMap) -> RadioResult<()> {
        if mmap.len() != MEM_SIZE {
            return Err(RadioError::Radio(format!(
                "Invalid memory size: expected {}, got {}",
                MEM_SIZE,
                mmap.len()
            )));
        }
        self.mmap = Some(mmap);
        Ok(())
    }

    fn match_model(data: &[u8], filename: &str) -> bool {
        filename.to_lowercase().ends_with(".img") && data.len() == MEM_SIZE
    }
}
