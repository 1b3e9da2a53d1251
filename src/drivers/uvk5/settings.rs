// Device-wide settings block of the UV-K5 image

use crate::core::settings::wrong_type;
use crate::core::{
    AlarmMode, BandSelect, BatterySave, ChannelDisplay, EndOfTalk, FreqLock, KeypadTone, Language,
    PowerOnDisplay, RadioSetting, RadioSettingGroup, RepeaterTail, ScanResume, SettingError,
    SettingValue,
};
use crate::drivers::{RadioError, RadioResult};
use crate::memmap::MemoryMap;
use tracing::{debug, warn};

pub const FM_BASE: usize = 0x0640;
pub const FM_CHANNELS: usize = 20;
/// FM broadcast presets are stored in 100 kHz units
const FM_UNIT_KHZ: u32 = 100;
const FM_MIN_KHZ: u32 = 64_000;
const FM_MAX_KHZ: u32 = 108_000;

/// Shown in place of the firmware version until one has been read
pub const FIRMWARE_UNKNOWN: &str =
    "To get the firmware version please download the image from the radio first";

const CALL_CHANNEL: usize = 0x0E70;
const SQUELCH: usize = 0x0E71;
const MAX_TALK_TIME: usize = 0x0E72;
const NOAA_AUTOSCAN: usize = 0x0E73;
const VOX_LEVEL: usize = 0x0E76;
const MIC_GAIN: usize = 0x0E77;
const CHANNEL_DISPLAY_MODE: usize = 0x0E79;
const CROSSBAND: usize = 0x0E7A;
const BATTERY_SAVE: usize = 0x0E7B;
const DUAL_WATCH: usize = 0x0E7C;
const TAIL_NOTE_ELIMINATION: usize = 0x0E7D;
const VFO_OPEN: usize = 0x0E7E;

const BEEP_CONTROL: usize = 0x0E90;
const SCAN_RESUME_MODE: usize = 0x0E95;
const AUTO_KEYPAD_LOCK: usize = 0x0E96;
const POWER_ON_DISPMODE: usize = 0x0E97;
const PASSWORD: usize = 0x0E98;

const KEYPAD_TONE: usize = 0x0EA0;
const LANGUAGE: usize = 0x0EA1;

const ALARM_MODE: usize = 0x0EA8;
const REMINDING_OF_END_TALK: usize = 0x0EA9;
const REPEATER_TAIL_ELIMINATION: usize = 0x0EAA;

const LOGO_LINE1: usize = 0x0EB0;
const LOGO_LINE2: usize = 0x0EC0;
const LOGO_FIELD: usize = 16;
pub const LOGO_LEN: usize = 12;

const INT_FLOCK: usize = 0x0F40;
const INT_350TX: usize = 0x0F41;
const INT_UNKNOWN1: usize = 0x0F42;
const INT_200TX: usize = 0x0F43;
const INT_500TX: usize = 0x0F44;
const INT_350EN: usize = 0x0F45;
const INT_SCREEN: usize = 0x0F46;

pub const CALL_CHANNEL_MAX: u8 = 200;
pub const SQUELCH_MAX: u8 = 9;
pub const TALK_TIME_MAX: u8 = 10;
pub const VOX_MAX: u8 = 10;
pub const MIC_GAIN_MAX: u8 = 4;

/// Factory unlock flags at 0x0F40
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnlockSettings {
    pub flock: FreqLock,
    pub tx_350: bool,
    pub unknown1: bool,
    pub tx_200: bool,
    pub tx_500: bool,
    pub en_350: bool,
    pub screen: bool,
}

/// Decoded settings block.
///
/// Raw bytes outside a field's range decode to a fixed fallback, so any image
/// yields a value that encodes again. Values shown 1-based (call channel, VOX)
/// are stored 0-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub call_channel: u8,
    pub squelch: u8,
    pub max_talk_time: u8,
    pub noaa_autoscan: bool,
    pub vox_level: u8,
    pub mic_gain: u8,
    pub channel_display: ChannelDisplay,
    pub crossband: BandSelect,
    pub battery_save: BatterySave,
    pub dual_watch: BandSelect,
    pub tail_note_elimination: bool,
    pub vfo_open: bool,
    pub beep_control: bool,
    pub scan_resume: ScanResume,
    pub auto_keypad_lock: bool,
    pub power_on_display: PowerOnDisplay,
    pub password: [u8; 4],
    pub keypad_tone: KeypadTone,
    pub language: Language,
    pub alarm_mode: AlarmMode,
    pub end_of_talk: EndOfTalk,
    pub repeater_tail: RepeaterTail,
    pub logo_line1: String,
    pub logo_line2: String,
    pub unlock: UnlockSettings,
    /// FM broadcast presets in kHz
    pub fm_channels: Vec<Option<u32>>,
}

fn decode_call_channel(b: u8) -> u8 {
    match b as u16 + 1 {
        c if c > CALL_CHANNEL_MAX as u16 => 1,
        c => c as u8,
    }
}

fn decode_squelch(b: u8) -> u8 {
    if b > SQUELCH_MAX {
        1
    } else {
        b
    }
}

fn decode_vox(b: u8) -> u8 {
    (b as u16 + 1).min(VOX_MAX as u16) as u8
}

fn pick<E: Default>(raw: u8, from_index: fn(usize) -> Option<E>) -> E {
    from_index(raw as usize).unwrap_or_else(|| {
        debug!("setting index {} out of range, using default", raw);
        E::default()
    })
}

/// FM preset slot in kHz. Unused, out of band or corrupt slots read as `None`.
fn decode_fm(slot: usize, raw: u16) -> Option<u32> {
    match raw {
        0 | 0xFFFF => None,
        units => {
            let khz = units as u32 * FM_UNIT_KHZ;
            if (FM_MIN_KHZ..=FM_MAX_KHZ).contains(&khz) {
                Some(khz)
            } else {
                warn!("FM preset {} holds {} kHz, treating it as unused", slot + 1, khz);
                None
            }
        }
    }
}

/// Logo text: pad bytes and spaces trimmed from both ends, at most 12
/// characters. Anything else outside printable ASCII reads as `?`.
pub fn decode_logo(field: &[u8]) -> String {
    let is_pad = |b: &u8| matches!(*b, b' ' | 0x00 | 0xFF);
    let start = field.iter().position(|b| !is_pad(b)).unwrap_or(field.len());
    let end = field.iter().rposition(|b| !is_pad(b)).map_or(start, |i| i + 1);

    field[start..end]
        .iter()
        .map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { '?' })
        .take(LOGO_LEN)
        .collect()
}

/// Logo field: 12 characters padded with 0x00, then four 0xFF bytes
pub fn encode_logo(text: &str) -> RadioResult<[u8; LOGO_FIELD]> {
    check_logo(text)?;

    let mut field = [0x00u8; LOGO_FIELD];
    field[LOGO_LEN..].fill(0xFF);
    for (slot, b) in field.iter_mut().zip(text.trim_end_matches(' ').bytes()) {
        *slot = b;
    }
    Ok(field)
}

fn check_logo(text: &str) -> RadioResult<()> {
    if text.chars().count() > LOGO_LEN {
        return Err(SettingError::TooLong {
            name: "logo".to_string(),
            max_len: LOGO_LEN,
        }
        .into());
    }
    if let Some(c) = text.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(RadioError::Encoding(format!(
            "logo {:?} contains unsupported character {:?}",
            text, c
        )));
    }
    Ok(())
}

fn store(mmap: &mut MemoryMap, at: usize, raw: u8) -> RadioResult<()> {
    if mmap.get_byte(at)? != raw {
        debug!("settings byte 0x{:04X} := 0x{:02X}", at, raw);
        mmap.set_byte(at, raw)?;
    }
    Ok(())
}

fn store_bool(mmap: &mut MemoryMap, at: usize, on: bool) -> RadioResult<()> {
    store(mmap, at, on as u8)
}

fn store_index(mmap: &mut MemoryMap, at: usize, index: usize) -> RadioResult<()> {
    store(mmap, at, index as u8)
}

fn in_range(name: &str, value: u8, min: u8, max: u8) -> RadioResult<()> {
    if value < min || value > max {
        return Err(SettingError::OutOfRange {
            name: name.to_string(),
            value: value as i64,
            min: min as i64,
            max: max as i64,
        }
        .into());
    }
    Ok(())
}

fn check_fm(khz: u32) -> RadioResult<()> {
    if khz % FM_UNIT_KHZ != 0 || !(FM_MIN_KHZ..=FM_MAX_KHZ).contains(&khz) {
        return Err(RadioError::Encoding(format!(
            "FM preset {} kHz must be a 100 kHz step between {} and {} kHz",
            khz, FM_MIN_KHZ, FM_MAX_KHZ
        )));
    }
    Ok(())
}

impl Settings {
    pub fn decode(mmap: &MemoryMap) -> RadioResult<Self> {
        let byte = |at: usize| mmap.get_byte(at);
        let on = |at: usize| -> RadioResult<bool> { Ok(mmap.get_byte(at)? > 0) };

        let mut password = [0u8; 4];
        password.copy_from_slice(mmap.get(PASSWORD, Some(4))?);

        let mut fm_channels = Vec::with_capacity(FM_CHANNELS);
        for i in 0..FM_CHANNELS {
            fm_channels.push(decode_fm(i, mmap.read_u16_le(FM_BASE + i * 2)?));
        }

        Ok(Self {
            call_channel: decode_call_channel(byte(CALL_CHANNEL)?),
            squelch: decode_squelch(byte(SQUELCH)?),
            max_talk_time: byte(MAX_TALK_TIME)?.min(TALK_TIME_MAX),
            noaa_autoscan: on(NOAA_AUTOSCAN)?,
            vox_level: decode_vox(byte(VOX_LEVEL)?),
            mic_gain: byte(MIC_GAIN)?.min(MIC_GAIN_MAX),
            channel_display: pick(byte(CHANNEL_DISPLAY_MODE)?, ChannelDisplay::from_index),
            crossband: pick(byte(CROSSBAND)?, BandSelect::from_index),
            battery_save: pick(byte(BATTERY_SAVE)?, BatterySave::from_index),
            dual_watch: pick(byte(DUAL_WATCH)?, BandSelect::from_index),
            tail_note_elimination: on(TAIL_NOTE_ELIMINATION)?,
            vfo_open: on(VFO_OPEN)?,
            beep_control: on(BEEP_CONTROL)?,
            scan_resume: pick(byte(SCAN_RESUME_MODE)?, ScanResume::from_index),
            auto_keypad_lock: on(AUTO_KEYPAD_LOCK)?,
            power_on_display: pick(byte(POWER_ON_DISPMODE)?, PowerOnDisplay::from_index),
            password,
            keypad_tone: pick(byte(KEYPAD_TONE)?, KeypadTone::from_index),
            language: pick(byte(LANGUAGE)?, Language::from_index),
            alarm_mode: pick(byte(ALARM_MODE)?, AlarmMode::from_index),
            end_of_talk: pick(byte(REMINDING_OF_END_TALK)?, EndOfTalk::from_index),
            repeater_tail: pick(byte(REPEATER_TAIL_ELIMINATION)?, RepeaterTail::from_index),
            logo_line1: decode_logo(mmap.get(LOGO_LINE1, Some(LOGO_FIELD))?),
            logo_line2: decode_logo(mmap.get(LOGO_LINE2, Some(LOGO_FIELD))?),
            unlock: UnlockSettings {
                flock: pick(byte(INT_FLOCK)?, FreqLock::from_index),
                tx_350: on(INT_350TX)?,
                unknown1: on(INT_UNKNOWN1)?,
                tx_200: on(INT_200TX)?,
                tx_500: on(INT_500TX)?,
                en_350: on(INT_350EN)?,
                screen: on(INT_SCREEN)?,
            },
            fm_channels,
        })
    }

    /// Check every field fits the image before anything is written
    pub fn validate(&self) -> RadioResult<()> {
        in_range("call_channel", self.call_channel, 1, CALL_CHANNEL_MAX)?;
        in_range("squelch", self.squelch, 0, SQUELCH_MAX)?;
        in_range("tot", self.max_talk_time, 0, TALK_TIME_MAX)?;
        in_range("vox_level", self.vox_level, 1, VOX_MAX)?;
        in_range("mic_gain", self.mic_gain, 0, MIC_GAIN_MAX)?;
        check_logo(&self.logo_line1)?;
        check_logo(&self.logo_line2)?;

        if self.fm_channels.len() > FM_CHANNELS {
            return Err(RadioError::Encoding(format!(
                "{} FM presets given, the radio has {}",
                self.fm_channels.len(),
                FM_CHANNELS
            )));
        }
        for khz in self.fm_channels.iter().flatten() {
            check_fm(*khz)?;
        }
        Ok(())
    }

    /// Write every field into the image as its canonical byte, so stored
    /// values the radio would misread are replaced. Unused FM slots that
    /// already hold 0x0000 or 0xFFFF are left as they are.
    pub fn encode(&self, mmap: &mut MemoryMap) -> RadioResult<()> {
        self.validate()?;

        store(mmap, CALL_CHANNEL, self.call_channel - 1)?;
        store(mmap, SQUELCH, self.squelch)?;
        store(mmap, MAX_TALK_TIME, self.max_talk_time)?;
        store_bool(mmap, NOAA_AUTOSCAN, self.noaa_autoscan)?;
        store(mmap, VOX_LEVEL, self.vox_level - 1)?;
        store(mmap, MIC_GAIN, self.mic_gain)?;

        store_index(mmap, CHANNEL_DISPLAY_MODE, self.channel_display.to_index())?;
        store_index(mmap, CROSSBAND, self.crossband.to_index())?;
        store_index(mmap, BATTERY_SAVE, self.battery_save.to_index())?;
        store_index(mmap, DUAL_WATCH, self.dual_watch.to_index())?;
        store_bool(mmap, TAIL_NOTE_ELIMINATION, self.tail_note_elimination)?;
        store_bool(mmap, VFO_OPEN, self.vfo_open)?;

        store_bool(mmap, BEEP_CONTROL, self.beep_control)?;
        store_index(mmap, SCAN_RESUME_MODE, self.scan_resume.to_index())?;
        store_bool(mmap, AUTO_KEYPAD_LOCK, self.auto_keypad_lock)?;
        store_index(mmap, POWER_ON_DISPMODE, self.power_on_display.to_index())?;
        mmap.set_bytes(PASSWORD, &self.password)?;

        store_index(mmap, KEYPAD_TONE, self.keypad_tone.to_index())?;
        store_index(mmap, LANGUAGE, self.language.to_index())?;
        store_index(mmap, ALARM_MODE, self.alarm_mode.to_index())?;
        store_index(mmap, REMINDING_OF_END_TALK, self.end_of_talk.to_index())?;
        store_index(mmap, REPEATER_TAIL_ELIMINATION, self.repeater_tail.to_index())?;

        mmap.set_bytes(LOGO_LINE1, &encode_logo(&self.logo_line1)?)?;
        mmap.set_bytes(LOGO_LINE2, &encode_logo(&self.logo_line2)?)?;

        let unlock = &self.unlock;
        store_index(mmap, INT_FLOCK, unlock.flock.to_index())?;
        store_bool(mmap, INT_350TX, unlock.tx_350)?;
        store_bool(mmap, INT_UNKNOWN1, unlock.unknown1)?;
        store_bool(mmap, INT_200TX, unlock.tx_200)?;
        store_bool(mmap, INT_500TX, unlock.tx_500)?;
        store_bool(mmap, INT_350EN, unlock.en_350)?;
        store_bool(mmap, INT_SCREEN, unlock.screen)?;

        for (i, preset) in self.fm_channels.iter().enumerate() {
            let at = FM_BASE + i * 2;
            match preset {
                Some(khz) => mmap.write_u16_le(at, (khz / FM_UNIT_KHZ) as u16)?,
                None => {
                    if !matches!(mmap.read_u16_le(at)?, 0 | 0xFFFF) {
                        mmap.write_u16_le(at, 0xFFFF)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Present the settings as editable groups. An empty `firmware` means no
    /// identify has run yet.
    pub fn to_groups(&self, firmware: &str) -> Vec<RadioSettingGroup> {
        let firmware = if firmware.is_empty() {
            FIRMWARE_UNKNOWN
        } else {
            firmware
        };

        let int = |value: u8, min: u8, max: u8| SettingValue::Int {
            value: value as i64,
            min: min as i64,
            max: max as i64,
        };
        let logo = |value: &str| SettingValue::Str {
            value: value.to_string(),
            max_len: LOGO_LEN,
        };

        let mut basic = RadioSettingGroup::new("basic", "Basic Settings");
        basic.push(RadioSetting::new(
            "call_channel",
            "One key call channel",
            int(self.call_channel, 1, CALL_CHANNEL_MAX),
        ));
        basic.push(RadioSetting::new("squelch", "Squelch", int(self.squelch, 0, SQUELCH_MAX)));
        basic.push(RadioSetting::new(
            "tot",
            "Max talk time [min]",
            int(self.max_talk_time, 0, TALK_TIME_MAX),
        ));
        basic.push(RadioSetting::new(
            "noaa_autoscan",
            "NOAA Autoscan",
            SettingValue::Bool(self.noaa_autoscan),
        ));
        basic.push(RadioSetting::new("vox_level", "VOX Level", int(self.vox_level, 1, VOX_MAX)));
        basic.push(RadioSetting::new("mic_gain", "Mic Gain", int(self.mic_gain, 0, MIC_GAIN_MAX)));
        basic.push(RadioSetting::new(
            "channel_display_mode",
            "Channel display mode",
            SettingValue::list(self.channel_display.label(), ChannelDisplay::options()),
        ));
        basic.push(RadioSetting::new(
            "crossband",
            "Cross-band receiving/transmitting",
            SettingValue::list(self.crossband.label(), BandSelect::options()),
        ));
        basic.push(RadioSetting::new(
            "battery_save",
            "Battery Save",
            SettingValue::list(self.battery_save.label(), BatterySave::options()),
        ));
        basic.push(RadioSetting::new(
            "dualwatch",
            "Dual Watch",
            SettingValue::list(self.dual_watch.label(), BandSelect::options()),
        ));
        basic.push(RadioSetting::new(
            "tail_note_elimination",
            "Tail tone elimination",
            SettingValue::Bool(self.tail_note_elimination),
        ));
        basic.push(RadioSetting::new("vfo_open", "VFO open", SettingValue::Bool(self.vfo_open)));
        basic.push(RadioSetting::new(
            "beep_control",
            "Beep control",
            SettingValue::Bool(self.beep_control),
        ));
        basic.push(RadioSetting::new(
            "scan_resume_mode",
            "Scan resume mode",
            SettingValue::list(self.scan_resume.label(), ScanResume::options()),
        ));
        basic.push(RadioSetting::new(
            "auto_keypad_lock",
            "Auto keypad lock",
            SettingValue::Bool(self.auto_keypad_lock),
        ));
        basic.push(RadioSetting::new(
            "welcome_mode",
            "Power on display mode",
            SettingValue::list(self.power_on_display.label(), PowerOnDisplay::options()),
        ));
        basic.push(RadioSetting::new(
            "keypad_tone",
            "Keypad tone",
            SettingValue::list(self.keypad_tone.label(), KeypadTone::options()),
        ));
        basic.push(RadioSetting::new(
            "language",
            "Language",
            SettingValue::list(self.language.label(), Language::options()),
        ));
        basic.push(RadioSetting::new(
            "alarm_mode",
            "Alarm mode",
            SettingValue::list(self.alarm_mode.label(), AlarmMode::options()),
        ));
        basic.push(RadioSetting::new(
            "reminding_of_end_talk",
            "Reminding of end of talk",
            SettingValue::list(self.end_of_talk.label(), EndOfTalk::options()),
        ));
        basic.push(RadioSetting::new(
            "repeater_tail_elimination",
            "Repeater tail tone elimination",
            SettingValue::list(self.repeater_tail.label(), RepeaterTail::options()),
        ));
        basic.push(RadioSetting::new(
            "logo1",
            "Logo string 1 (12 characters)",
            logo(&self.logo_line1),
        ));
        basic.push(RadioSetting::new(
            "logo2",
            "Logo string 2 (12 characters)",
            logo(&self.logo_line2),
        ));

        let unlock_flags = &self.unlock;
        let mut unlock = RadioSettingGroup::new("unlock", "Unlock Settings");
        unlock.push(RadioSetting::new(
            "flock",
            "F-LOCK",
            SettingValue::list(unlock_flags.flock.label(), FreqLock::options()),
        ));
        for (name, label, on) in [
            ("350tx", "350TX", unlock_flags.tx_350),
            ("unknown1", "UNKNOWN1", unlock_flags.unknown1),
            ("200tx", "200TX", unlock_flags.tx_200),
            ("500tx", "500TX", unlock_flags.tx_500),
            ("350en", "350EN", unlock_flags.en_350),
            ("screen", "SCREEN", unlock_flags.screen),
        ] {
            unlock.push(RadioSetting::new(name, label, SettingValue::Bool(on)));
        }

        let mut fmradio = RadioSettingGroup::new("fmradio", "FM Radio");
        for (i, preset) in self.fm_channels.iter().enumerate() {
            fmradio.push(RadioSetting::new(
                format!("fm_{}", i + 1),
                format!("FM preset {} [kHz, 0 = unused]", i + 1),
                SettingValue::Int {
                    value: preset.unwrap_or(0) as i64,
                    min: 0,
                    max: FM_MAX_KHZ as i64,
                },
            ));
        }

        let mut roinfo = RadioSettingGroup::new("roinfo", "Information (read-only)");
        roinfo.push(
            RadioSetting::new(
                "fw_ver",
                "Firmware Version",
                SettingValue::Str {
                    value: firmware.to_string(),
                    max_len: 128,
                },
            )
            .read_only(),
        );
        roinfo.push(
            RadioSetting::new(
                "driver_ver",
                "Driver version",
                SettingValue::Str {
                    value: crate::VERSION.to_string(),
                    max_len: 16,
                },
            )
            .read_only(),
        );

        vec![basic, unlock, fmradio, roinfo]
    }

    /// Take edited values back by setting name.
    ///
    /// Read-only and unknown settings are skipped. The first bad value aborts
    /// with nothing applied.
    pub fn apply(&mut self, groups: &[RadioSettingGroup]) -> RadioResult<()> {
        let mut next = self.clone();
        for setting in groups.iter().flat_map(|g| g.settings.iter()) {
            if setting.read_only {
                continue;
            }
            next.apply_one(setting)?;
        }
        *self = next;
        Ok(())
    }

    fn apply_one(&mut self, setting: &RadioSetting) -> RadioResult<()> {
        let s = setting;
        match s.name.as_str() {
            "call_channel" => self.call_channel = int_in(s, 1, CALL_CHANNEL_MAX)?,
            "squelch" => self.squelch = int_in(s, 0, SQUELCH_MAX)?,
            "tot" => self.max_talk_time = int_in(s, 0, TALK_TIME_MAX)?,
            "noaa_autoscan" => self.noaa_autoscan = flag(s)?,
            "vox_level" => self.vox_level = int_in(s, 1, VOX_MAX)?,
            "mic_gain" => self.mic_gain = int_in(s, 0, MIC_GAIN_MAX)?,
            "channel_display_mode" => self.channel_display = choice(s, ChannelDisplay::from_label)?,
            "crossband" => self.crossband = choice(s, BandSelect::from_label)?,
            "battery_save" => self.battery_save = choice(s, BatterySave::from_label)?,
            "dualwatch" => self.dual_watch = choice(s, BandSelect::from_label)?,
            "tail_note_elimination" => self.tail_note_elimination = flag(s)?,
            "vfo_open" => self.vfo_open = flag(s)?,
            "beep_control" => self.beep_control = flag(s)?,
            "scan_resume_mode" => self.scan_resume = choice(s, ScanResume::from_label)?,
            "auto_keypad_lock" => self.auto_keypad_lock = flag(s)?,
            "welcome_mode" => self.power_on_display = choice(s, PowerOnDisplay::from_label)?,
            "keypad_tone" => self.keypad_tone = choice(s, KeypadTone::from_label)?,
            "language" => self.language = choice(s, Language::from_label)?,
            "alarm_mode" => self.alarm_mode = choice(s, AlarmMode::from_label)?,
            "reminding_of_end_talk" => self.end_of_talk = choice(s, EndOfTalk::from_label)?,
            "repeater_tail_elimination" => {
                self.repeater_tail = choice(s, RepeaterTail::from_label)?
            }
            "logo1" => self.logo_line1 = logo_text(s)?,
            "logo2" => self.logo_line2 = logo_text(s)?,
            "flock" => self.unlock.flock = choice(s, FreqLock::from_label)?,
            "350tx" => self.unlock.tx_350 = flag(s)?,
            "unknown1" => self.unlock.unknown1 = flag(s)?,
            "200tx" => self.unlock.tx_200 = flag(s)?,
            "500tx" => self.unlock.tx_500 = flag(s)?,
            "350en" => self.unlock.en_350 = flag(s)?,
            "screen" => self.unlock.screen = flag(s)?,
            name => match fm_slot(name) {
                Some(slot) => self.set_fm(slot, s)?,
                None => debug!("ignoring unknown setting {}", name),
            },
        }
        Ok(())
    }

    fn set_fm(&mut self, slot: usize, s: &RadioSetting) -> RadioResult<()> {
        let khz = s
            .value
            .as_int()
            .ok_or_else(|| wrong_type(&s.name, "integer"))?;
        let khz = u32::try_from(khz)
            .map_err(|_| RadioError::Encoding(format!("{}: {} kHz is negative", s.name, khz)))?;

        let preset = match khz {
            0 => None,
            khz => {
                check_fm(khz)?;
                Some(khz)
            }
        };
        if self.fm_channels.len() < FM_CHANNELS {
            self.fm_channels.resize(FM_CHANNELS, None);
        }
        self.fm_channels[slot] = preset;
        Ok(())
    }
}

/// "fm_1" .. "fm_20" to a 0-based slot
fn fm_slot(name: &str) -> Option<usize> {
    name.strip_prefix("fm_")
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| (1..=FM_CHANNELS).contains(n))
        .map(|n| n - 1)
}

fn int_in(s: &RadioSetting, min: u8, max: u8) -> RadioResult<u8> {
    let value = s
        .value
        .as_int()
        .ok_or_else(|| wrong_type(&s.name, "integer"))?;
    if value < min as i64 || value > max as i64 {
        return Err(SettingError::OutOfRange {
            name: s.name.clone(),
            value,
            min: min as i64,
            max: max as i64,
        }
        .into());
    }
    Ok(value as u8)
}

fn flag(s: &RadioSetting) -> RadioResult<bool> {
    Ok(s.value
        .as_bool()
        .ok_or_else(|| wrong_type(&s.name, "boolean"))?)
}

fn choice<E>(s: &RadioSetting, from_label: fn(&str) -> Option<E>) -> RadioResult<E> {
    let label = s.value.as_str().ok_or_else(|| wrong_type(&s.name, "list"))?;
    from_label(label).ok_or_else(|| {
        SettingError::NotAnOption {
            name: s.name.clone(),
            value: label.to_string(),
        }
        .into()
    })
}

fn logo_text(s: &RadioSetting) -> RadioResult<String> {
    let text = s.value.as_str().ok_or_else(|| wrong_type(&s.name, "string"))?;
    let text = text.trim_end_matches([' ', '\0', '\u{FF}']);
    check_logo(text)?;
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::find_setting_mut;

    fn blank_image() -> MemoryMap {
        MemoryMap::filled(0x2000, 0xFF)
    }

    #[test]
    fn test_decode_blank_image_falls_back() {
        let settings = Settings::decode(&blank_image()).unwrap();

        assert_eq!(settings.call_channel, 1);
        assert_eq!(settings.squelch, 1);
        assert_eq!(settings.max_talk_time, 10);
        assert_eq!(settings.vox_level, 10);
        assert_eq!(settings.mic_gain, 4);
        assert_eq!(settings.channel_display, ChannelDisplay::Frequency);
        assert_eq!(settings.battery_save, BatterySave::Off);
        assert_eq!(settings.unlock.flock, FreqLock::Off);
        assert!(settings.noaa_autoscan);
        assert_eq!(settings.logo_line1, "");
        assert_eq!(settings.password, [0xFF; 4]);
        assert_eq!(settings.fm_channels, vec![None; FM_CHANNELS]);
    }

    #[test]
    fn test_decode_values() {
        let mut mmap = MemoryMap::filled(0x2000, 0x00);
        mmap.set_bytes(CALL_CHANNEL, &[4, 5, 3, 1]).unwrap();
        mmap.set_byte(VOX_LEVEL, 0).unwrap();
        mmap.set_byte(DUAL_WATCH, 2).unwrap();
        mmap.set_byte(REPEATER_TAIL_ELIMINATION, 9).unwrap();
        mmap.set_bytes(LOGO_LINE1, b"  HELLO\0\0\0\0\0\xFF\xFF\xFF\xFF").unwrap();
        mmap.write_u16_le(FM_BASE + 2, 1010).unwrap();

        let settings = Settings::decode(&mmap).unwrap();
        assert_eq!(settings.call_channel, 5);
        assert_eq!(settings.squelch, 5);
        assert_eq!(settings.max_talk_time, 3);
        assert!(settings.noaa_autoscan);
        assert_eq!(settings.vox_level, 1);
        assert_eq!(settings.dual_watch, BandSelect::BandB);
        assert_eq!(settings.repeater_tail, RepeaterTail::Ms900);
        assert_eq!(settings.logo_line1, "HELLO");
        assert_eq!(settings.fm_channels[0], None);
        assert_eq!(settings.fm_channels[1], Some(101_000));
    }

    #[test]
    fn test_logo_codec() {
        assert_eq!(
            &encode_logo("UV-K5").unwrap(),
            b"UV-K5\0\0\0\0\0\0\0\xFF\xFF\xFF\xFF"
        );
        assert_eq!(decode_logo(b"ABCDEFGHIJKLMNOP"), "ABCDEFGHIJKL");
        assert!(encode_logo("THIRTEEN CHRS").is_err());
        assert!(encode_logo("\u{1F4FB}").is_err());
    }

    #[test]
    fn test_encode_writes_values_over_blank_bytes() {
        let mut mmap = blank_image();
        let mut settings = Settings::decode(&mmap).unwrap();
        settings.squelch = 1;
        settings.max_talk_time = 10;
        settings.call_channel = 1;
        settings.encode(&mut mmap).unwrap();

        assert_eq!(mmap.get_byte(SQUELCH).unwrap(), 1);
        assert_eq!(mmap.get_byte(MAX_TALK_TIME).unwrap(), 10);
        assert_eq!(mmap.get_byte(CALL_CHANNEL).unwrap(), 0);
        assert_eq!(mmap.get_byte(INT_FLOCK).unwrap(), 0);
        assert_eq!(mmap.read_u16_le(FM_BASE).unwrap(), 0xFFFF);
        assert_eq!(Settings::decode(&mmap).unwrap(), settings);
    }

    #[test]
    fn test_encode_is_stable() {
        let mut mmap = blank_image();
        Settings::decode(&mmap).unwrap().encode(&mut mmap).unwrap();
        let once = mmap.clone();
        Settings::decode(&mmap).unwrap().encode(&mut mmap).unwrap();
        assert_eq!(mmap, once);
    }

    #[test]
    fn test_corrupt_fm_slot_reads_unused() {
        let mut mmap = blank_image();
        mmap.write_u16_le(FM_BASE + 8, 0x1234).unwrap();
        mmap.write_u16_le(FM_BASE + 10, 885).unwrap();

        let mut settings = Settings::decode(&mmap).unwrap();
        assert_eq!(settings.fm_channels[4], None);
        assert_eq!(settings.fm_channels[5], Some(88_500));

        let mut groups = settings.to_groups("fw");
        find_setting_mut(&mut groups, "squelch").unwrap().set_int(3).unwrap();
        settings.apply(&groups).unwrap();
        settings.encode(&mut mmap).unwrap();

        assert_eq!(mmap.get_byte(SQUELCH).unwrap(), 3);
        assert_eq!(mmap.read_u16_le(FM_BASE + 8).unwrap(), 0xFFFF);
        assert_eq!(mmap.read_u16_le(FM_BASE + 10).unwrap(), 885);
    }

    #[test]
    fn test_foreign_logo_bytes_still_encode() {
        let mut mmap = blank_image();
        mmap.set_bytes(LOGO_LINE1, b"\0CAF\xC9\0OK  \xFF\xFF\xFF\xFF\xFF\xFF")
            .unwrap();

        let settings = Settings::decode(&mmap).unwrap();
        assert_eq!(settings.logo_line1, "CAF??OK");
        settings.encode(&mut mmap).unwrap();
        assert_eq!(
            mmap.get(LOGO_LINE1, Some(LOGO_FIELD)).unwrap(),
            b"CAF??OK\0\0\0\0\0\xFF\xFF\xFF\xFF"
        );
    }

    #[test]
    fn test_encode_decode() {
        let mut mmap = blank_image();
        let mut settings = Settings::decode(&mmap).unwrap();
        settings.call_channel = 200;
        settings.squelch = 0;
        settings.vox_level = 3;
        settings.noaa_autoscan = false;
        settings.language = Language::English;
        settings.end_of_talk = EndOfTalk::Roger;
        settings.logo_line2 = "73 DE N0CALL".to_string();
        settings.unlock.tx_350 = false;
        settings.unlock.flock = FreqLock::Ce;
        settings.fm_channels[0] = Some(88_500);

        settings.encode(&mut mmap).unwrap();
        assert_eq!(mmap.get_byte(CALL_CHANNEL).unwrap(), 199);
        assert_eq!(mmap.get_byte(VOX_LEVEL).unwrap(), 2);
        assert_eq!(mmap.get_byte(NOAA_AUTOSCAN).unwrap(), 0);
        assert_eq!(mmap.get_byte(INT_FLOCK).unwrap(), 2);
        assert_eq!(mmap.read_u16_le(FM_BASE).unwrap(), 885);
        assert_eq!(Settings::decode(&mmap).unwrap(), settings);
    }

    #[test]
    fn test_encode_rejects_without_writing() {
        let mut mmap = blank_image();
        let before = mmap.clone();
        let mut settings = Settings::decode(&mmap).unwrap();
        settings.squelch = 0;
        settings.mic_gain = 9;
        assert!(matches!(settings.encode(&mut mmap), Err(RadioError::Encoding(_))));
        assert_eq!(mmap, before);
    }

    #[test]
    fn test_groups() {
        let settings = Settings::decode(&blank_image()).unwrap();
        let groups = settings.to_groups("k5_2.01.26");

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["basic", "unlock", "fmradio", "roinfo"]);
        assert_eq!(groups[0].settings.len(), 23);
        assert_eq!(groups[1].settings.len(), 7);
        assert_eq!(groups[2].settings.len(), FM_CHANNELS);

        let fw = groups[3].get("fw_ver").unwrap();
        assert!(fw.read_only);
        assert_eq!(fw.value.as_str(), Some("k5_2.01.26"));

        let groups = settings.to_groups("");
        let fw = groups[3].get("fw_ver").unwrap();
        assert_eq!(fw.value.as_str(), Some(FIRMWARE_UNKNOWN));
    }

    #[test]
    fn test_apply() {
        let mut settings = Settings::decode(&blank_image()).unwrap();
        let mut groups = settings.to_groups("fw");

        find_setting_mut(&mut groups, "squelch").unwrap().set_int(3).unwrap();
        find_setting_mut(&mut groups, "dualwatch")
            .unwrap()
            .set_str("Band A")
            .unwrap();
        find_setting_mut(&mut groups, "screen").unwrap().set_bool(false).unwrap();
        find_setting_mut(&mut groups, "logo1").unwrap().set_str("HI").unwrap();
        find_setting_mut(&mut groups, "fm_3").unwrap().set_int(101_100).unwrap();
        groups[0].push(RadioSetting::new("no_such", "x", SettingValue::Bool(true)));

        settings.apply(&groups).unwrap();
        assert_eq!(settings.squelch, 3);
        assert_eq!(settings.dual_watch, BandSelect::BandA);
        assert!(!settings.unlock.screen);
        assert_eq!(settings.logo_line1, "HI");
        assert_eq!(settings.fm_channels[2], Some(101_100));
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let settings = Settings::decode(&blank_image()).unwrap();

        let mut groups = settings.to_groups("fw");
        groups[0].settings[1].value = SettingValue::Int {
            value: 12,
            min: 0,
            max: 9,
        };
        let mut copy = settings.clone();
        assert!(copy.apply(&groups).is_err());
        assert_eq!(copy, settings);

        let mut groups = settings.to_groups("fw");
        find_setting_mut(&mut groups, "language").unwrap().value =
            SettingValue::list("Klingon", Language::options());
        assert!(settings.clone().apply(&groups).is_err());

        let mut groups = settings.to_groups("fw");
        find_setting_mut(&mut groups, "fm_1").unwrap().set_int(101_050).unwrap();
        assert!(settings.clone().apply(&groups).is_err());
    }

    #[test]
    fn test_apply_skips_read_only() {
        let mut settings = Settings::decode(&blank_image()).unwrap();
        let before = settings.clone();
        let mut groups = settings.to_groups("fw");
        groups[3].settings[0].value = SettingValue::Str {
            value: "tampered".to_string(),
            max_len: 16,
        };
        settings.apply(&groups).unwrap();
        assert_eq!(settings, before);
    }
}
