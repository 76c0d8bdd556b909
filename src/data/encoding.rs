use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

/// Bytes inspected when looking for a BOM-less UTF-16 pattern.
const SNIFF_LEN: usize = 4096;

/// Share of NUL bytes on one parity that marks text as UTF-16.
const UTF16_NUL_RATIO: f64 = 0.4;

// ---------------------------------------------------------------------------
// Encoding detection
// ---------------------------------------------------------------------------

/// Best-guess character encoding of raw file bytes.
///
/// Order of evidence:
/// * a byte-order mark
/// * a NUL-byte pattern typical of BOM-less UTF-16
/// * valid UTF-8
/// * otherwise `windows-1252`, which decodes any byte sequence
///
/// Never fails; empty input is UTF-8.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if let Some(encoding) = sniff_utf16(bytes) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    WINDOWS_1252
}

/// Decode `bytes` with the detected encoding, stripping any BOM.
///
/// Returns the text and the encoding actually used. Malformed sequences
/// are replaced with U+FFFD and reported through the log.
pub fn decode(bytes: &[u8]) -> (String, &'static Encoding) {
    let detected = detect_encoding(bytes);
    log::debug!("Detected input encoding {}", detected.name());

    let (text, used, had_errors) = detected.decode(bytes);
    if had_errors {
        log::warn!(
            "Input is not clean {}; malformed sequences were replaced",
            used.name()
        );
    }
    (text.into_owned(), used)
}

fn sniff_utf16(bytes: &[u8]) -> Option<&'static Encoding> {
    let sample = &bytes[..bytes.len().min(SNIFF_LEN)];
    let pairs = sample.len() / 2;
    if pairs < 2 {
        return None;
    }

    let even_nuls = sample.iter().step_by(2).filter(|&&b| b == 0).count();
    let odd_nuls = sample.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    let threshold = (pairs as f64 * UTF16_NUL_RATIO) as usize;

    // ASCII text in UTF-16BE puts the NUL first, in LE second.
    if even_nuls > threshold && odd_nuls == 0 {
        Some(UTF_16BE)
    } else if odd_nuls > threshold && even_nuls == 0 {
        Some(UTF_16LE)
    } else {
        None
    }
}
