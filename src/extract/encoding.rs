//! Entry-name encoding candidates
//!
//! Beatmapset archives come from heterogeneous packaging tools that mislabel
//! or omit their text encoding, and a mismatch only surfaces as a decode
//! error (or garbled names) partway through a pass. There is no reliable
//! pre-check, so the extractor tries each candidate fully, most-likely first.

use encoding_rs::{
    BIG5_INIT, EUC_KR_INIT, Encoding, GBK_INIT, IBM866_INIT, SHIFT_JIS_INIT, UTF_8_INIT,
    WINDOWS_1251_INIT, WINDOWS_1252_INIT,
};

/// Candidate encodings for entry names, most-likely-correct first
///
/// UTF-8, then a legacy DOS codepage, then ISO-8859-1 (the WHATWG label
/// resolves to windows-1252, a strict superset), then regional single- and
/// multi-byte codepages.
pub(crate) static NAME_ENCODINGS: [&Encoding; 8] = [
    &UTF_8_INIT,
    &IBM866_INIT,
    &WINDOWS_1252_INIT,
    &SHIFT_JIS_INIT,
    &GBK_INIT,
    &BIG5_INIT,
    &EUC_KR_INIT,
    &WINDOWS_1251_INIT,
];

/// Decode a raw entry name under one candidate
///
/// Returns `None` when the bytes are malformed for the encoding; that fails
/// the whole candidate pass before any file is written.
pub(crate) fn decode_name(encoding: &'static Encoding, raw: &[u8]) -> Option<String> {
    let (decoded, had_errors) = encoding.decode_without_bom_handling(raw);
    if had_errors {
        None
    } else {
        Some(decoded.into_owned())
    }
}
