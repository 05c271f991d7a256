//! `Content-Disposition` parsing for blob downloads.
//!
//! The blob endpoint returns the raw file body and names the file in a
//! header such as `attachment; filename=report.pdf`. Segments are
//! `key=value` pairs separated by `;`.

use percent_encoding::percent_decode_str;

/// Extracts the file name from a `Content-Disposition` header value.
///
/// A plain `filename=` segment wins over the RFC 5987 `filename*=` form.
/// Surrounding quotes are stripped. Returns `None` when neither key is
/// present or the value is empty.
pub fn parse_filename(header: &str) -> Option<String> {
    let mut extended = None;

    for segment in header.split(';') {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key.eq_ignore_ascii_case("filename") {
            let name = unquote(value);
            if !name.is_empty() {
                return Some(name.to_string());
            }
        } else if key.eq_ignore_ascii_case("filename*") {
            extended = decode_extended(value);
        }
    }

    extended.filter(|name| !name.is_empty())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Decodes `charset'lang'percent-encoded` values.
fn decode_extended(value: &str) -> Option<String> {
    let encoded = match value.splitn(3, '\'').collect::<Vec<_>>().as_slice() {
        [_charset, _lang, encoded] => *encoded,
        _ => unquote(value),
    };
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}
