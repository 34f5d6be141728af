//! Line parser for demodulator output.

use super::{DecodedFrame, Fragmentation, FrameMetadata, NotAFrame, PageType, metadata::unsigned};

/// Maximum number of fields a line is split into; the last one keeps any
/// further pipes as payload text.
const MAX_FIELDS: usize = 8;

/// Parse one demodulator output line into a [`DecodedFrame`].
///
/// The line terminator is stripped; any other whitespace belongs to the
/// payload because fragment payloads are concatenated without a separator.
///
/// # Errors
///
/// Returns [`NotAFrame`] for header or noise lines and for any field that
/// fails to parse. Callers skip such lines.
///
/// # Examples
///
/// ```
/// use pagerframe::frame::{FragmentFlag, parse_line};
///
/// let frame = parse_line("FLEX|1600/2|00.001.A|0001234567|LS|5|ALN|3.1.F|HELLO ")
///     .expect("valid frame");
/// assert_eq!(frame.metadata.flag(), FragmentFlag::More);
/// assert_eq!(frame.payload, "HELLO ");
/// ```
pub fn parse_line(line: &str) -> Result<DecodedFrame, NotAFrame> {
    let line = line.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = line.splitn(MAX_FIELDS, '|').collect();
    let [
        protocol,
        transmission,
        timing,
        capcode,
        address,
        page_type_code,
        page_type,
        rest @ ..,
    ] = fields.as_slice()
    else {
        return Err(NotAFrame::TooFewFields {
            found: fields.len(),
        });
    };

    let page_type: PageType = page_type.parse()?;
    let (fragmentation, payload) = match (page_type, rest.first()) {
        (PageType::Alphanumeric, Some(tail)) => {
            let (descriptor, payload) = tail
                .split_once('|')
                .ok_or(NotAFrame::MissingFragmentation)?;
            (Some(descriptor.parse::<Fragmentation>()?), payload)
        }
        (PageType::Alphanumeric, None) => return Err(NotAFrame::MissingFragmentation),
        (_, tail) => (None, tail.copied().unwrap_or_default()),
    };

    let metadata = FrameMetadata {
        protocol: (*protocol).into(),
        transmission: (*transmission).into(),
        timing: timing.parse()?,
        capcode: (*capcode).into(),
        address: address.parse()?,
        page_type_code: unsigned(page_type_code)
            .ok_or_else(|| NotAFrame::PageTypeCode((*page_type_code).to_owned()))?,
        page_type,
        fragmentation,
    };

    Ok(DecodedFrame {
        metadata,
        payload: payload.to_owned(),
    })
}

/// Parse raw line bytes, rejecting anything that is not UTF-8.
///
/// # Errors
///
/// Returns [`NotAFrame::InvalidUtf8`] for undecodable input and otherwise the
/// same errors as [`parse_line`].
pub fn parse_bytes(line: &[u8]) -> Result<DecodedFrame, NotAFrame> {
    let line = std::str::from_utf8(line).map_err(|_| NotAFrame::InvalidUtf8)?;
    parse_line(line)
}
