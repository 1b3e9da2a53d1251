// Channel records and names in the UV-K5 image
//
// Record layout (16 bytes, little endian):
//   0  u32 freq       10 Hz units
//   4  u32 offset     10 Hz units
//   8  u8  rxcode     tone table index
//   9  u8  txcode
//   10 u8  code_flag  rx type bits 0-1, tx type bits 4-5
//   11 u8  flags1     bit0 minus, bit2 scanlist, bit4 AM
//   12 u8  flags2     bit0 reverse, bit1 NFM, bits 2-3 power, bit4 BCLO
//   13 u8  dtmf_flags bit0 decode, bits 1-2 PTT-ID
//   14 u8  step       bits 1-3 step index
//   15 u8  scrambler  bits 0-3

use crate::bitwise::{
    get_field, get_flag, parse_padded_text, parse_u32_le, parse_u8, set_field, set_flag,
};
use crate::core::{
    dtcs_index, tone_index, Duplex, Memory, Mode, PowerLevel, PttId, Scrambler, Tone, TuningStep,
    DTCS_CODES, TONES,
};
use crate::drivers::{RadioError, RadioResult};
use crate::memmap::MemoryMap;
use nom::IResult;
use tracing::warn;

pub const CHANNEL_BASE: usize = 0x0000;
pub const CHANNEL_SIZE: usize = 16;
pub const CHANNEL_COUNT: usize = 214;

pub const NAME_BASE: usize = 0x0F50;
pub const NAME_SIZE: usize = 16;
/// Only the memory channels have names; the VFO slots after them do not
pub const NAMED_CHANNELS: usize = 200;

const FLAGS1_MINUS: u8 = 0x01;
pub const FLAGS1_SCANLIST: u8 = 0x04;
const FLAGS1_AM: u8 = 0x10;

const FLAGS2_REVERSE: u8 = 0x01;
const FLAGS2_NFM: u8 = 0x02;
const FLAGS2_POWER: u8 = 0x0C;
const FLAGS2_BCLO: u8 = 0x10;

const DTMF_DECODE: u8 = 0x01;
const DTMF_PTTID: u8 = 0x06;

const STEP_MASK: u8 = 0x0E;
const SCRAMBLER_MASK: u8 = 0x0F;

const CODE_RX_MASK: u8 = 0x03;
const CODE_TX_SHIFT: u8 = 4;
/// Bits of code_flag that belong to neither tone type
const CODE_KEEP_MASK: u8 = 0b1100_1100;

const TONE_NONE: u8 = 0;
const TONE_CTCSS: u8 = 1;
const TONE_DCS: u8 = 2;
const TONE_DCS_REVERSED: u8 = 3;

/// One raw 16-byte channel record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChannel {
    pub freq: u32,
    pub offset: u32,
    pub rxcode: u8,
    pub txcode: u8,
    pub code_flag: u8,
    pub flags1: u8,
    pub flags2: u8,
    pub dtmf_flags: u8,
    pub step: u8,
    pub scrambler: u8,
}

impl RawChannel {
    pub const SIZE: usize = CHANNEL_SIZE;

    /// Record written for a deleted channel
    pub fn erased() -> Self {
        Self {
            freq: u32::MAX,
            offset: u32::MAX,
            rxcode: 0xFF,
            txcode: 0xFF,
            code_flag: 0xFF,
            flags1: 0xFF,
            flags2: 0xFF,
            dtmf_flags: 0xFF,
            step: 0xFF,
            scrambler: 0xFF,
        }
    }

    pub fn from_bytes(data: &[u8]) -> RadioResult<Self> {
        if data.len() < Self::SIZE {
            return Err(RadioError::Radio(format!(
                "channel record needs {} bytes, got {}",
                Self::SIZE,
                data.len()
            )));
        }

        parse_raw_channel(data)
            .map(|(_, raw)| raw)
            .map_err(|e| RadioError::Radio(format!("channel record: {}", e)))
    }

    pub fn to_bytes(&self) -> [u8; CHANNEL_SIZE] {
        let mut out = [0u8; CHANNEL_SIZE];
        out[0..4].copy_from_slice(&self.freq.to_le_bytes());
        out[4..8].copy_from_slice(&self.offset.to_le_bytes());
        out[8] = self.rxcode;
        out[9] = self.txcode;
        out[10] = self.code_flag;
        out[11] = self.flags1;
        out[12] = self.flags2;
        out[13] = self.dtmf_flags;
        out[14] = self.step;
        out[15] = self.scrambler;
        out
    }

    /// Both all-zero and all-ones frequencies mark an unused slot
    pub fn is_empty(&self) -> bool {
        self.freq == 0 || self.freq == u32::MAX
    }
}

fn parse_raw_channel(input: &[u8]) -> IResult<&[u8], RawChannel> {
    let (input, freq) = parse_u32_le(input)?;
    let (input, offset) = parse_u32_le(input)?;
    let (input, rxcode) = parse_u8(input)?;
    let (input, txcode) = parse_u8(input)?;
    let (input, code_flag) = parse_u8(input)?;
    let (input, flags1) = parse_u8(input)?;
    let (input, flags2) = parse_u8(input)?;
    let (input, dtmf_flags) = parse_u8(input)?;
    let (input, step) = parse_u8(input)?;
    let (input, scrambler) = parse_u8(input)?;

    Ok((
        input,
        RawChannel {
            freq,
            offset,
            rxcode,
            txcode,
            code_flag,
            flags1,
            flags2,
            dtmf_flags,
            step,
            scrambler,
        },
    ))
}

/// Map (type, index) from the image to a tone. Unknown indices decode as no tone.
pub fn decode_tone(kind: u8, code: u8) -> Tone {
    let index = code as usize;
    let tone = match kind {
        TONE_CTCSS => TONES.get(index).map(|&hz| Tone::Ctcss(hz)),
        TONE_DCS => DTCS_CODES.get(index).map(|&c| Tone::Dcs(c)),
        TONE_DCS_REVERSED => DTCS_CODES.get(index).map(|&c| Tone::DcsReversed(c)),
        _ => Some(Tone::None),
    };

    tone.unwrap_or_else(|| {
        warn!("tone index {} out of range for type {}", code, kind);
        Tone::None
    })
}

/// Map a tone to (type, index). Values outside the radio's tables are rejected.
pub fn encode_tone(tone: &Tone) -> RadioResult<(u8, u8)> {
    let encoded = match *tone {
        Tone::None => Some((TONE_NONE, 0)),
        Tone::Ctcss(hz) => tone_index(hz).map(|i| (TONE_CTCSS, i as u8)),
        Tone::Dcs(code) => dtcs_index(code).map(|i| (TONE_DCS, i as u8)),
        Tone::DcsReversed(code) => dtcs_index(code).map(|i| (TONE_DCS_REVERSED, i as u8)),
    };

    encoded.ok_or_else(|| RadioError::Encoding(format!("unsupported tone {}", tone)))
}

/// Text up to the first pad byte, trailing spaces dropped. Bytes the encoder
/// would refuse read as `?`, so an untouched name always writes back.
pub fn decode_name(field: &[u8]) -> String {
    parse_padded_text(field.len())(field)
        .map(|(_, text)| text.trim_end_matches(' ').to_string())
        .unwrap_or_default()
}

/// Space-padded 16-byte name field. Longer names are cut to fit.
pub fn encode_name(name: &str) -> RadioResult<[u8; NAME_SIZE]> {
    if let Some(c) = name.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(RadioError::Encoding(format!(
            "name {:?} contains unsupported character {:?}",
            name, c
        )));
    }

    let mut field = [b' '; NAME_SIZE];
    for (slot, b) in field.iter_mut().zip(name.bytes()) {
        *slot = b;
    }
    Ok(field)
}

fn hz_to_units(hz: u64, what: &str) -> RadioResult<u32> {
    if hz % 10 != 0 {
        return Err(RadioError::Encoding(format!(
            "{} {} Hz is not a multiple of 10 Hz",
            what, hz
        )));
    }
    u32::try_from(hz / 10)
        .map_err(|_| RadioError::Encoding(format!("{} {} Hz is out of range", what, hz)))
}

/// Turn a raw record into a channel. `index` is 0-based.
pub fn decode_channel(index: usize, raw: &RawChannel, name: &str) -> Memory {
    let mut mem = Memory::new(index as u32 + 1);
    mem.empty = raw.is_empty();

    mem.freq = raw.freq as u64 * 10;
    mem.name = if index >= NAMED_CHANNELS {
        format!("VFO_{}", index + 1 - NAMED_CHANNELS)
    } else {
        name.to_string()
    };

    if raw.offset == 0 {
        mem.duplex = Duplex::None;
        mem.offset = 0;
    } else {
        mem.duplex = if get_flag(raw.flags1, FLAGS1_MINUS) {
            Duplex::Minus
        } else {
            Duplex::Plus
        };
        mem.offset = raw.offset as u64 * 10;
    }

    mem.mode = if get_flag(raw.flags1, FLAGS1_AM) {
        Mode::Am
    } else if get_flag(raw.flags2, FLAGS2_NFM) {
        Mode::Nfm
    } else {
        Mode::Fm
    };

    mem.power = match get_field(raw.flags2, FLAGS2_POWER) {
        2 => PowerLevel::High,
        1 => PowerLevel::Med,
        _ => PowerLevel::Low,
    };

    mem.rx_tone = decode_tone(raw.code_flag & CODE_RX_MASK, raw.rxcode);
    mem.tx_tone = decode_tone((raw.code_flag >> CODE_TX_SHIFT) & CODE_RX_MASK, raw.txcode);

    mem.tuning_step =
        TuningStep::from_index(get_field(raw.step, STEP_MASK) as usize).unwrap_or_default();
    mem.scrambler =
        Scrambler::from_index(get_field(raw.scrambler, SCRAMBLER_MASK) as usize).unwrap_or_default();
    mem.ptt_id = PttId::from_index(get_field(raw.dtmf_flags, DTMF_PTTID) as usize).unwrap_or_default();
    mem.dtmf_decode = get_flag(raw.dtmf_flags, DTMF_DECODE);
    mem.bclo = get_flag(raw.flags2, FLAGS2_BCLO);
    mem.reverse = get_flag(raw.flags2, FLAGS2_REVERSE);

    mem
}

/// Merge a channel into an existing record, keeping every bit it does not own
pub fn encode_channel(mem: &Memory, current: &RawChannel) -> RadioResult<RawChannel> {
    if mem.empty {
        return Ok(RawChannel::erased());
    }

    let mut raw = *current;

    raw.freq = hz_to_units(mem.freq, "frequency")?;
    if raw.is_empty() {
        return Err(RadioError::Encoding(format!(
            "frequency {} Hz cannot be stored",
            mem.freq
        )));
    }

    match mem.duplex {
        Duplex::None => raw.offset = 0,
        Duplex::Plus | Duplex::Minus => {
            raw.offset = hz_to_units(mem.offset, "offset")?;
            raw.flags1 = set_flag(raw.flags1, FLAGS1_MINUS, mem.duplex == Duplex::Minus);
        }
    }

    let (rx_kind, rx_code) = encode_tone(&mem.rx_tone)?;
    let (tx_kind, tx_code) = encode_tone(&mem.tx_tone)?;
    raw.rxcode = rx_code;
    raw.txcode = tx_code;
    raw.code_flag = (raw.code_flag & CODE_KEEP_MASK) | (tx_kind << CODE_TX_SHIFT) | rx_kind;

    raw.flags1 = set_flag(raw.flags1, FLAGS1_AM, mem.mode == Mode::Am);
    raw.flags2 = set_flag(raw.flags2, FLAGS2_NFM, mem.mode == Mode::Nfm);

    let power = match mem.power {
        PowerLevel::High => 2,
        PowerLevel::Med => 1,
        PowerLevel::Low => 0,
    };
    raw.flags2 = set_field(raw.flags2, FLAGS2_POWER, power);
    raw.flags2 = set_flag(raw.flags2, FLAGS2_BCLO, mem.bclo);
    raw.flags2 = set_flag(raw.flags2, FLAGS2_REVERSE, mem.reverse);

    raw.dtmf_flags = set_field(raw.dtmf_flags, DTMF_PTTID, mem.ptt_id.to_index() as u8);
    raw.dtmf_flags = set_flag(raw.dtmf_flags, DTMF_DECODE, mem.dtmf_decode);

    raw.step = set_field(raw.step, STEP_MASK, mem.tuning_step.to_index() as u8);
    raw.scrambler = set_field(raw.scrambler, SCRAMBLER_MASK, mem.scrambler.to_index() as u8);

    Ok(raw)
}

fn index_for(number: u32) -> RadioResult<usize> {
    match number as usize {
        n @ 1..=CHANNEL_COUNT => Ok(n - 1),
        _ => Err(RadioError::InvalidMemory(number)),
    }
}

/// Decode channel `number` (1-based) from the image
pub fn read_channel(mmap: &MemoryMap, number: u32) -> RadioResult<Memory> {
    let index = index_for(number)?;
    let record = mmap.get(CHANNEL_BASE + index * CHANNEL_SIZE, Some(CHANNEL_SIZE))?;
    let raw = RawChannel::from_bytes(record)?;

    let name = if index < NAMED_CHANNELS {
        decode_name(mmap.get(NAME_BASE + index * NAME_SIZE, Some(NAME_SIZE))?)
    } else {
        String::new()
    };

    Ok(decode_channel(index, &raw, &name))
}

/// Encode `mem` into the image. Nothing is written if any field is rejected.
pub fn write_channel(mmap: &mut MemoryMap, mem: &Memory) -> RadioResult<()> {
    let index = index_for(mem.number)?;
    let record_at = CHANNEL_BASE + index * CHANNEL_SIZE;
    let name_at = NAME_BASE + index * NAME_SIZE;

    let current = RawChannel::from_bytes(mmap.get(record_at, Some(CHANNEL_SIZE))?)?;
    let raw = encode_channel(mem, &current)?;

    let name = match (index < NAMED_CHANNELS, mem.empty) {
        (false, _) => None,
        (true, true) => Some([0xFF; NAME_SIZE]),
        (true, false) => Some(encode_name(&mem.name)?),
    };

    mmap.set_bytes(record_at, &raw.to_bytes())?;
    if let Some(field) = name {
        mmap.set_bytes(name_at, &field)?;
    }
    Ok(())
}
