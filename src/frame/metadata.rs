//! Header fields carried by every decoded pager frame.
//!
//! Each type renders back to the token the demodulator emitted so a
//! [`FrameMetadata`] can be written to the line log in its original field
//! order. Numeric fields accept only plain ASCII digits; frame timing is
//! rendered with the demodulator's fixed zero padding.

use std::{fmt, str::FromStr};

use derive_more::{Display, From, Into};

use super::NotAFrame;

/// Paging protocol reported by the demodulator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// FLEX, the only protocol that fragments alphanumeric pages.
    Flex,
    /// POCSAG at 512 baud.
    Pocsag512,
    /// POCSAG at 1200 baud.
    Pocsag1200,
    /// POCSAG at 2400 baud.
    Pocsag2400,
    /// Any protocol token not listed above, kept verbatim.
    Other(String),
}

impl From<&str> for Protocol {
    fn from(token: &str) -> Self {
        match token {
            "FLEX" => Self::Flex,
            "POCSAG512" => Self::Pocsag512,
            "POCSAG1200" => Self::Pocsag1200,
            "POCSAG2400" => Self::Pocsag2400,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flex => f.write_str("FLEX"),
            Self::Pocsag512 => f.write_str("POCSAG512"),
            Self::Pocsag1200 => f.write_str("POCSAG1200"),
            Self::Pocsag2400 => f.write_str("POCSAG2400"),
            Self::Other(token) => f.write_str(token),
        }
    }
}

/// Transmission mode as `baud/levels`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transmission {
    /// 1600 baud, 2-level FSK.
    Baud1600Fsk2,
    /// 3200 baud, 2-level FSK.
    Baud3200Fsk2,
    /// 3200 baud, 4-level FSK.
    Baud3200Fsk4,
    /// 6400 baud, 4-level FSK.
    Baud6400Fsk4,
    /// Any mode token not listed above, kept verbatim.
    Other(String),
}

impl Transmission {
    /// Frame phases multiplexed by this mode.
    ///
    /// Unknown modes report the single phase `A`.
    #[must_use]
    pub fn phases(&self) -> &'static [char] {
        match self {
            Self::Baud1600Fsk2 | Self::Other(_) => &['A'],
            Self::Baud3200Fsk2 | Self::Baud3200Fsk4 => &['A', 'C'],
            Self::Baud6400Fsk4 => &['A', 'B', 'C', 'D'],
        }
    }
}

impl From<&str> for Transmission {
    fn from(token: &str) -> Self {
        match token {
            "1600/2" => Self::Baud1600Fsk2,
            "3200/2" => Self::Baud3200Fsk2,
            "3200/4" => Self::Baud3200Fsk4,
            "6400/4" => Self::Baud6400Fsk4,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Baud1600Fsk2 => f.write_str("1600/2"),
            Self::Baud3200Fsk2 => f.write_str("3200/2"),
            Self::Baud3200Fsk4 => f.write_str("3200/4"),
            Self::Baud6400Fsk4 => f.write_str("6400/4"),
            Self::Other(token) => f.write_str(token),
        }
    }
}

/// Position of a frame within the protocol's repeating cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameTiming {
    /// Cycle number.
    pub cycle: u16,
    /// Frame number within the cycle.
    pub frame: u16,
    /// Phase letter.
    pub phase: char,
}

impl FromStr for FrameTiming {
    type Err = NotAFrame;

    fn from_str(field: &str) -> Result<Self, Self::Err> {
        let invalid = || NotAFrame::Timing(field.to_owned());
        let mut parts = field.split('.');
        let (Some(cycle), Some(frame), Some(phase), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let mut phase_chars = phase.chars();
        let (Some(phase), None) = (phase_chars.next(), phase_chars.next()) else {
            return Err(invalid());
        };
        Ok(Self {
            cycle: unsigned(cycle).ok_or_else(invalid)?,
            frame: unsigned(frame).ok_or_else(invalid)?,
            phase,
        })
    }
}

/// Parse a run of ASCII digits; signs and whitespace are rejected.
pub(super) fn unsigned<T: FromStr>(token: &str) -> Option<T> {
    if token.is_empty() || !token.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl fmt::Display for FrameTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:03}.{}", self.cycle, self.frame, self.phase)
    }
}

/// Recipient address of a page; the key fragments are grouped by.
///
/// # Examples
///
/// ```
/// use pagerframe::frame::Capcode;
/// let capcode = Capcode::from("0001234567");
/// assert_eq!(capcode.as_str(), "0001234567");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0}")]
pub struct Capcode(String);

impl Capcode {
    /// Borrow the address text.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for Capcode {
    fn from(value: &str) -> Self { Self(value.to_owned()) }
}

/// Two-letter address classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AddressType {
    /// Local/long address marker (`L` or `S` on the wire).
    pub locality: char,
    /// Group/single scope marker (`G` or `S` on the wire).
    pub scope: char,
}

impl FromStr for AddressType {
    type Err = NotAFrame;

    fn from_str(field: &str) -> Result<Self, Self::Err> {
        let mut chars = field.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(locality), Some(scope), None) => Ok(Self { locality, scope }),
            _ => Err(NotAFrame::AddressType(field.to_owned())),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.locality, self.scope)
    }
}

/// Payload category of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageType {
    /// Tone-only page.
    Tone,
    /// Numeric page.
    Numeric,
    /// Alphanumeric page; the only kind that carries fragmentation metadata.
    Alphanumeric,
    /// Binary page.
    Binary,
}

impl PageType {
    /// Wire token used by the demodulator.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Tone => "TON",
            Self::Numeric => "NUM",
            Self::Alphanumeric => "ALN",
            Self::Binary => "BIN",
        }
    }

    /// Numeric code the demodulator prints beside the token.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Tone => 2,
            Self::Numeric => 3,
            Self::Alphanumeric => 5,
            Self::Binary => 6,
        }
    }
}

impl FromStr for PageType {
    type Err = NotAFrame;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "TON" => Ok(Self::Tone),
            "NUM" => Ok(Self::Numeric),
            "ALN" => Ok(Self::Alphanumeric),
            "BIN" => Ok(Self::Binary),
            other => Err(NotAFrame::PageType(other.to_owned())),
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.token()) }
}

/// Position of a fragment within its logical message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FragmentFlag {
    /// The frame is a complete message on its own.
    Only,
    /// More fragments follow.
    More,
    /// The frame completes a multi-fragment message.
    Last,
}

impl FragmentFlag {
    /// Wire letter for the flag.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Only => 'K',
            Self::More => 'F',
            Self::Last => 'C',
        }
    }

    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "K" => Some(Self::Only),
            "F" => Some(Self::More),
            "C" => Some(Self::Last),
            _ => None,
        }
    }
}

/// Fragment indicator FLEX assigns to the opening fragment of a message.
pub const OPENING_FRAGMENT_INDICATOR: u8 = 3;

/// Fragmentation descriptor of an alphanumeric frame (`indicator.continuation.flag`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fragmentation {
    /// Fragment indicator.
    pub indicator: u8,
    /// Continuation bit (`1` while more fragments follow).
    pub continuation: u8,
    /// Decoded fragment flag.
    pub flag: FragmentFlag,
}

impl Fragmentation {
    /// Whether the descriptor marks the opening fragment of a message.
    #[must_use]
    pub const fn opens_message(&self) -> bool { self.indicator == OPENING_FRAGMENT_INDICATOR }
}

impl FromStr for Fragmentation {
    type Err = NotAFrame;

    fn from_str(field: &str) -> Result<Self, Self::Err> {
        let invalid = || NotAFrame::Fragmentation(field.to_owned());
        let mut parts = field.split('.');
        let (Some(indicator), Some(continuation), Some(flag), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        Ok(Self {
            indicator: unsigned(indicator).ok_or_else(invalid)?,
            continuation: unsigned(continuation).ok_or_else(invalid)?,
            flag: FragmentFlag::from_letter(flag).ok_or_else(invalid)?,
        })
    }
}

impl fmt::Display for Fragmentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.indicator,
            self.continuation,
            self.flag.letter()
        )
    }
}

/// Every header field of a frame, i.e. the per-fragment metadata row.
///
/// Displays as the pipe-joined header in original field order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameMetadata {
    /// Paging protocol.
    pub protocol: Protocol,
    /// Transmission mode.
    pub transmission: Transmission,
    /// Cycle, frame and phase coordinates.
    pub timing: FrameTiming,
    /// Recipient address.
    pub capcode: Capcode,
    /// Address classification.
    pub address: AddressType,
    /// Numeric page type code as printed by the demodulator.
    pub page_type_code: u8,
    /// Payload category.
    pub page_type: PageType,
    /// Fragmentation descriptor; present only for alphanumeric pages.
    pub fragmentation: Option<Fragmentation>,
}

impl FrameMetadata {
    /// Fragment flag of the frame; frames without a descriptor are complete.
    #[must_use]
    pub fn flag(&self) -> FragmentFlag {
        self.fragmentation
            .map_or(FragmentFlag::Only, |fragmentation| fragmentation.flag)
    }
}

impl fmt::Display for FrameMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}",
            self.protocol,
            self.transmission,
            self.timing,
            self.capcode,
            self.address,
            self.page_type_code,
            self.page_type
        )?;
        if let Some(fragmentation) = self.fragmentation {
            write!(f, "|{fragmentation}")?;
        }
        Ok(())
    }
}
