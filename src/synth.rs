//! Synthetic FLEX traffic for exercising the reassembler.
//!
//! [`FrameGenerator`] emits an endless stream of well-formed frame lines whose
//! mix resembles what a 3200/4 FLEX decoder prints: mostly alphanumeric pages,
//! a quarter of them split over several frames, with fragments of different
//! capcodes interleaved.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::frame::{
    AddressType,
    Capcode,
    DecodedFrame,
    FragmentFlag,
    Fragmentation,
    FrameMetadata,
    FrameTiming,
    OPENING_FRAGMENT_INDICATOR,
    PageType,
    Protocol,
    Transmission,
};

/// Number of cycles before the cycle counter wraps.
pub const CYCLES: u16 = 15;
/// Frames per cycle.
pub const FRAMES_PER_CYCLE: u16 = 128;

const LONGEST_PAYLOAD: usize = 100;
const MULTI_FRAGMENT_PROBABILITY: f64 = 0.25;
const RESUME_PROBABILITY: f64 = 0.2;
const CONTINUE_PROBABILITY: f64 = 0.5;
const HIGHEST_CAPCODE: u32 = 9_999_999;

const DIGITS: &[u8] = b"0123456789";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ";

fn protocols() -> [(Protocol, u32); 4] {
    [
        (Protocol::Flex, 1),
        (Protocol::Pocsag512, 0),
        (Protocol::Pocsag1200, 0),
        (Protocol::Pocsag2400, 0),
    ]
}

fn transmissions() -> [(Transmission, u32); 4] {
    [
        (Transmission::Baud1600Fsk2, 0),
        (Transmission::Baud3200Fsk2, 0),
        (Transmission::Baud3200Fsk4, 1),
        (Transmission::Baud6400Fsk4, 0),
    ]
}

const LOCALITIES: [(char, u32); 2] = [('L', 24), ('S', 1)];
const SCOPES: [(char, u32); 2] = [('G', 1), ('S', 199)];
const PAGE_TYPES: [(PageType, u32); 4] = [
    (PageType::Tone, 9),
    (PageType::Numeric, 20),
    (PageType::Alphanumeric, 70),
    (PageType::Binary, 1),
];

/// Header fields shared by every fragment of one generated message.
#[derive(Clone, Debug)]
struct Header {
    protocol: Protocol,
    transmission: Transmission,
    phase: char,
    capcode: Capcode,
    address: AddressType,
    page_type: PageType,
}

/// A multi-fragment message still awaiting its closing fragment.
#[derive(Debug)]
struct OpenMessage {
    header: Header,
    next_indicator: u8,
}

/// Seedable generator of frame lines.
#[derive(Debug)]
pub struct FrameGenerator<R> {
    rng: R,
    cycle: u16,
    frame: u16,
    open: VecDeque<OpenMessage>,
}

impl FrameGenerator<StdRng> {
    /// Deterministic generator for tests and reproducible captures.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self { Self::new(StdRng::seed_from_u64(seed)) }

    /// Generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self { Self::new(StdRng::from_entropy()) }
}

impl<R: Rng> FrameGenerator<R> {
    /// Start at a random position in the frame cycle.
    pub fn new(mut rng: R) -> Self {
        let cycle = rng.gen_range(0..CYCLES);
        let frame = rng.gen_range(0..FRAMES_PER_CYCLE);
        Self {
            rng,
            cycle,
            frame,
            open: VecDeque::new(),
        }
    }

    /// Multi-fragment messages started but not yet closed.
    #[must_use]
    pub fn open_messages(&self) -> usize { self.open.len() }

    /// Produce the next frame.
    ///
    /// When messages are open, one is resumed 20% of the time; it either
    /// continues or closes with equal probability. Otherwise a fresh page is
    /// generated.
    pub fn next_frame(&mut self) -> DecodedFrame {
        self.advance_clock();
        if !self.open.is_empty() && self.rng.gen_bool(RESUME_PROBABILITY) {
            if let Some(message) = self.open.pop_front() {
                return self.resume(message);
            }
        }
        self.fresh()
    }

    /// Produce the next frame rendered as a demodulator line.
    pub fn next_line(&mut self) -> String {
        let frame = self.next_frame();
        format!("{}|{}", frame.metadata, frame.payload)
    }

    fn advance_clock(&mut self) {
        self.frame += 1;
        if self.frame >= FRAMES_PER_CYCLE {
            self.cycle = (self.cycle + 1) % CYCLES;
            self.frame %= FRAMES_PER_CYCLE;
        }
    }

    fn resume(&mut self, mut message: OpenMessage) -> DecodedFrame {
        let indicator = message.next_indicator;
        let flag = if self.rng.gen_bool(CONTINUE_PROBABILITY) {
            // FLEX reserves indicator 3 for the opening fragment.
            message.next_indicator += if indicator == 2 { 2 } else { 1 };
            FragmentFlag::More
        } else {
            FragmentFlag::Last
        };
        let header = message.header.clone();
        if flag == FragmentFlag::More {
            self.open.push_back(message);
        }
        let payload = self.payload(PageType::Alphanumeric);
        self.frame_for(&header, Some(descriptor(indicator, flag)), payload)
    }

    fn fresh(&mut self) -> DecodedFrame {
        let header = self.header();
        let payload = self.payload(header.page_type);
        let fragmentation = if header.page_type == PageType::Alphanumeric {
            let flag = if self.rng.gen_bool(MULTI_FRAGMENT_PROBABILITY) {
                self.open.push_back(OpenMessage {
                    header: header.clone(),
                    next_indicator: 0,
                });
                FragmentFlag::More
            } else {
                FragmentFlag::Only
            };
            Some(descriptor(OPENING_FRAGMENT_INDICATOR, flag))
        } else {
            None
        };
        self.frame_for(&header, fragmentation, payload)
    }

    fn header(&mut self) -> Header {
        let protocol = pick(&mut self.rng, &protocols()).clone();
        let transmission = pick(&mut self.rng, &transmissions()).clone();
        let phase = transmission
            .phases()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or('A');
        let capcode = self.idle_capcode();
        Header {
            protocol,
            transmission,
            phase,
            capcode,
            address: AddressType {
                locality: *pick(&mut self.rng, &LOCALITIES),
                scope: *pick(&mut self.rng, &SCOPES),
            },
            page_type: *pick(&mut self.rng, &PAGE_TYPES),
        }
    }

    /// Draw a capcode with no message currently open on it.
    fn idle_capcode(&mut self) -> Capcode {
        loop {
            let number = self.rng.gen_range(0..=HIGHEST_CAPCODE);
            let capcode = Capcode::from(format!("{number:010}"));
            if !self.open.iter().any(|message| message.header.capcode == capcode) {
                return capcode;
            }
        }
    }

    fn payload(&mut self, page_type: PageType) -> String {
        let alphabet = match page_type {
            PageType::Alphanumeric => ALPHANUMERIC,
            PageType::Tone | PageType::Numeric | PageType::Binary => DIGITS,
        };
        let len = self.rng.gen_range(1..=LONGEST_PAYLOAD);
        (0..len)
            .filter_map(|_| alphabet.choose(&mut self.rng))
            .map(|&byte| char::from(byte))
            .collect()
    }

    fn frame_for(
        &self,
        header: &Header,
        fragmentation: Option<Fragmentation>,
        payload: String,
    ) -> DecodedFrame {
        DecodedFrame {
            metadata: FrameMetadata {
                protocol: header.protocol.clone(),
                transmission: header.transmission.clone(),
                timing: FrameTiming {
                    cycle: self.cycle,
                    frame: self.frame,
                    phase: header.phase,
                },
                capcode: header.capcode.clone(),
                address: header.address,
                page_type_code: header.page_type.code(),
                page_type: header.page_type,
                fragmentation,
            },
            payload,
        }
    }
}

impl<R: Rng> Iterator for FrameGenerator<R> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> { Some(self.next_line()) }
}

fn descriptor(indicator: u8, flag: FragmentFlag) -> Fragmentation {
    Fragmentation {
        indicator,
        continuation: u8::from(flag == FragmentFlag::More),
        flag,
    }
}

/// Weighted choice over a fixed table; falls back to the first entry if the
/// weights are unusable.
fn pick<'a, T, R: Rng>(rng: &mut R, table: &'a [(T, u32)]) -> &'a T {
    let chosen = table
        .choose_weighted(rng, |(_, weight)| *weight)
        .unwrap_or(&table[0]);
    &chosen.0
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use proptest::prelude::*;
    use rstest::rstest;

    use super::{CYCLES, FRAMES_PER_CYCLE, FrameGenerator};
    use crate::frame::{Capcode, FragmentFlag, PageType, parse_line};

    #[rstest]
    #[case(0)]
    #[case(7)]
    fn same_seed_same_stream(#[case] seed: u64) {
        let first: Vec<_> = FrameGenerator::from_seed(seed).take(50).collect();
        let second: Vec<_> = FrameGenerator::from_seed(seed).take(50).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn frame_clock_wraps_within_bounds() {
        let mut generator = FrameGenerator::from_seed(3);
        let mut previous = None;
        for _ in 0..(usize::from(FRAMES_PER_CYCLE) * 2) {
            let timing = generator.next_frame().metadata.timing;
            assert!(timing.cycle < CYCLES);
            assert!(timing.frame < FRAMES_PER_CYCLE);
            if let Some((cycle, frame)) = previous {
                let expected = if frame + 1 == FRAMES_PER_CYCLE {
                    ((cycle + 1) % CYCLES, 0)
                } else {
                    (cycle, frame + 1)
                };
                assert_eq!((timing.cycle, timing.frame), expected);
            }
            previous = Some((timing.cycle, timing.frame));
        }
    }

    #[test]
    fn fragments_follow_flex_indicator_sequence() {
        let mut generator = FrameGenerator::from_seed(11);
        let mut indicators: HashMap<Capcode, Vec<u8>> = HashMap::new();
        for _ in 0..5_000 {
            let frame = generator.next_frame();
            let Some(fragmentation) = frame.metadata.fragmentation else {
                assert_ne!(frame.metadata.page_type, PageType::Alphanumeric);
                continue;
            };
            match fragmentation.flag {
                FragmentFlag::Only => assert_eq!(fragmentation.indicator, 3),
                FragmentFlag::More if fragmentation.indicator == 3 => {
                    indicators.insert(frame.metadata.capcode.clone(), vec![3]);
                }
                FragmentFlag::More | FragmentFlag::Last => {
                    if let Some(seen) = indicators.get_mut(&frame.metadata.capcode) {
                        seen.push(fragmentation.indicator);
                    }
                }
            }
        }
        let longest = indicators
            .values()
            .max_by_key(|seen| seen.len())
            .expect("some multi-fragment message");
        assert!(longest.len() >= 3, "no long message in sample: {longest:?}");
        for seen in indicators.values() {
            let expected: Vec<u8> = std::iter::once(3)
                .chain(0..=2)
                .chain(4..=u8::MAX)
                .take(seen.len())
                .collect();
            assert_eq!(seen, &expected);
        }
    }

    #[rstest]
    #[case(11)]
    #[case(42)]
    fn fresh_pages_avoid_capcodes_with_open_messages(#[case] seed: u64) {
        let mut generator = FrameGenerator::from_seed(seed);
        let mut open: HashSet<Capcode> = HashSet::new();
        for _ in 0..10_000 {
            let metadata = generator.next_frame().metadata;
            let opening = metadata
                .fragmentation
                .is_none_or(|fragmentation| fragmentation.indicator == 3);
            if opening {
                assert!(
                    !open.contains(&metadata.capcode),
                    "fresh page on open capcode {}",
                    metadata.capcode
                );
            }
            match metadata.flag() {
                FragmentFlag::More => {
                    open.insert(metadata.capcode);
                }
                FragmentFlag::Last => {
                    open.remove(&metadata.capcode);
                }
                FragmentFlag::Only => {}
            }
        }
    }

    #[test]
    fn page_type_mix_favours_alphanumeric() {
        let frames: Vec<_> = FrameGenerator::from_seed(5)
            .take(2_000)
            .map(|line| parse_line(&line).expect("generated line parses"))
            .collect();
        let alphanumeric = frames
            .iter()
            .filter(|frame| frame.metadata.page_type == PageType::Alphanumeric)
            .count();
        assert!(alphanumeric > frames.len() / 2);
        assert!(frames.iter().all(|frame| !frame.payload.is_empty()));
    }

    proptest! {
        #[test]
        fn generated_lines_always_parse(seed in any::<u64>()) {
            let mut generator = FrameGenerator::from_seed(seed);
            for _ in 0..200 {
                let frame = generator.next_frame();
                let line = format!("{}|{}", frame.metadata, frame.payload);
                let parsed = parse_line(&line).expect("generated line parses");
                prop_assert_eq!(parsed, frame);
            }
        }
    }
}
