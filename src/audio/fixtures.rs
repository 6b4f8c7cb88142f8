//! Byte-level audio streams built in memory for decoder tests.
//!
//! The MP3 generator emits MPEG-1 Layer III frames at 32 kbps / 32 kHz with
//! no bit reservoir. Every granule of the first channel carries a single
//! count1 spectral line at unit gain; a second channel, when present, is
//! coded silent and uses plain (non-joint) stereo, so it decodes to zeros.

/// Sample rate of the generated MP3 stream
pub const MP3_SAMPLE_RATE: u32 = 32_000;

/// PCM frames produced per MPEG-1 Layer III frame
pub const MP3_SAMPLES_PER_FRAME: usize = 1152;

/// 144 * 32 kbps / 32 kHz, no padding
const MP3_FRAME_BYTES: usize = 144;

/// Unit requantization gain (2^((210 - 210) / 4))
const UNIT_GLOBAL_GAIN: u32 = 210;

/// Count1 table B codeword for the quadruple (1, 0, 0, 0), followed by a
/// positive sign bit
const LINE_ZERO_BITS: (u32, u32) = (0b0111_0, 5);

struct BitWriter {
    bytes: Vec<u8>,
    used: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            used: 0,
        }
    }

    fn put(&mut self, value: u32, width: u32) {
        for shift in (0..width).rev() {
            if self.used % 8 == 0 {
                self.bytes.push(0);
            }
            let bit = ((value >> shift) & 1) as u8;
            if let Some(last) = self.bytes.last_mut() {
                *last |= bit << (7 - self.used % 8);
            }
            self.used += 1;
        }
    }

    fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Build `n_frames` Layer III frames, mono or stereo
pub fn mp3_stream(stereo: bool, n_frames: usize) -> Vec<u8> {
    let channels = if stereo { 2 } else { 1 };
    let mut stream = Vec::with_capacity(n_frames * MP3_FRAME_BYTES);

    for _ in 0..n_frames {
        let mut frame = vec![0xFF, 0xFB, 0x18, if stereo { 0x00 } else { 0xC0 }];

        let mut side_info = BitWriter::new();
        side_info.put(0, 9); // main_data_begin
        side_info.put(0, if stereo { 3 } else { 5 }); // private bits
        side_info.put(0, 4 * channels); // scfsi
        for _granule in 0..2 {
            for channel in 0..channels {
                let part2_3_length = if channel == 0 { LINE_ZERO_BITS.1 } else { 0 };
                side_info.put(part2_3_length, 12);
                side_info.put(0, 9); // big_values
                side_info.put(UNIT_GLOBAL_GAIN, 8);
                side_info.put(0, 4); // scalefac_compress
                side_info.put(0, 1); // window switching off
                side_info.put(0, 15); // table_select x3
                side_info.put(0, 4); // region0_count
                side_info.put(0, 3); // region1_count
                side_info.put(0, 1); // preflag
                side_info.put(0, 1); // scalefac_scale
                side_info.put(1, 1); // count1 table B
            }
        }
        frame.extend(side_info.finish());

        let mut main_data = BitWriter::new();
        for _granule in 0..2 {
            main_data.put(LINE_ZERO_BITS.0, LINE_ZERO_BITS.1);
        }
        frame.extend(main_data.finish());
        frame.resize(MP3_FRAME_BYTES, 0);

        stream.extend(frame);
    }

    stream
}

/// WAVE_FORMAT_EXTENSIBLE file with 16-bit containers and an arbitrary
/// `wValidBitsPerSample`
pub fn extensible_wav(valid_bits: u16, samples: &[i16]) -> Vec<u8> {
    const PCM_SUBFORMAT: [u8; 16] = [
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B,
        0x71,
    ];
    let sample_rate: u32 = 16_000;
    let data_len = (samples.len() * 2) as u32;

    let mut bytes = Vec::new();
    bytes.extend(b"RIFF");
    bytes.extend((4 + (8 + 40) + (8 + data_len)).to_le_bytes());
    bytes.extend(b"WAVE");

    bytes.extend(b"fmt ");
    bytes.extend(40u32.to_le_bytes());
    bytes.extend(0xFFFEu16.to_le_bytes()); // WAVE_FORMAT_EXTENSIBLE
    bytes.extend(1u16.to_le_bytes()); // channels
    bytes.extend(sample_rate.to_le_bytes());
    bytes.extend((sample_rate * 2).to_le_bytes()); // byte rate
    bytes.extend(2u16.to_le_bytes()); // block align
    bytes.extend(16u16.to_le_bytes()); // container bits
    bytes.extend(22u16.to_le_bytes()); // cbSize
    bytes.extend(valid_bits.to_le_bytes());
    bytes.extend(4u32.to_le_bytes()); // front centre
    bytes.extend(PCM_SUBFORMAT);

    bytes.extend(b"data");
    bytes.extend(data_len.to_le_bytes());
    for sample in samples {
        bytes.extend(sample.to_le_bytes());
    }

    bytes
}
