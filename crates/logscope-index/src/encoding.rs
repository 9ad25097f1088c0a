//! Text encoding resolution for legacy log files.
//!
//! A Windows code page number wins over a WHATWG label when both are configured.

use encoding_rs::{
    BIG5, EUC_JP, EUC_KR, Encoding, GB18030, GBK, IBM866, ISO_2022_JP, KOI8_R, KOI8_U,
    SHIFT_JIS, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_874, WINDOWS_1250, WINDOWS_1251,
    WINDOWS_1252, WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257,
    WINDOWS_1258,
};

use crate::IndexError;

/// Maps a Windows code page to an encoding.
pub fn encoding_for_codepage(codepage: u16) -> Option<&'static Encoding> {
    let encoding = match codepage {
        874 => WINDOWS_874,
        866 => IBM866,
        932 => SHIFT_JIS,
        936 => GBK,
        949 => EUC_KR,
        950 => BIG5,
        1200 => UTF_16LE,
        1201 => UTF_16BE,
        1250 => WINDOWS_1250,
        1251 => WINDOWS_1251,
        1252 | 28591 => WINDOWS_1252,
        1253 => WINDOWS_1253,
        1254 => WINDOWS_1254,
        1255 => WINDOWS_1255,
        1256 => WINDOWS_1256,
        1257 => WINDOWS_1257,
        1258 => WINDOWS_1258,
        20866 => KOI8_R,
        20932 | 51932 => EUC_JP,
        21866 => KOI8_U,
        50220 => ISO_2022_JP,
        54936 => GB18030,
        65001 => UTF_8,
        _ => return None,
    };
    Some(encoding)
}

/// Resolves the configured encoding.
pub fn resolve_encoding(
    label: &str,
    codepage: Option<u16>,
) -> Result<&'static Encoding, IndexError> {
    if let Some(codepage) = codepage {
        return encoding_for_codepage(codepage)
            .ok_or_else(|| IndexError::UnknownEncoding(format!("code page {codepage}")));
    }
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| IndexError::UnknownEncoding(label.to_string()))
}
