//! ffmpeg's negative error codes and their meanings.
//!
//! Most codes are four-byte tags built by `MKTAG(a, b, c, d)` and negated.
//! Tags whose first byte is `0xF8` mark the "not found" family and the HTTP
//! errors.

const fn mktag(a: u8, b: u8, c: u8, d: u8) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

/// Negated tag, as returned by ffmpeg
pub const fn fferrtag(a: u8, b: u8, c: u8, d: u8) -> i32 {
    (mktag(a, b, c, d) as i32).wrapping_neg()
}

pub const AVERROR_BSF_NOT_FOUND: i32 = fferrtag(0xF8, b'B', b'S', b'F');
pub const AVERROR_BUG: i32 = fferrtag(b'B', b'U', b'G', b'!');
pub const AVERROR_BUFFER_TOO_SMALL: i32 = fferrtag(b'B', b'U', b'F', b'S');
pub const AVERROR_DECODER_NOT_FOUND: i32 = fferrtag(0xF8, b'D', b'E', b'C');
pub const AVERROR_DEMUXER_NOT_FOUND: i32 = fferrtag(0xF8, b'D', b'E', b'M');
pub const AVERROR_ENCODER_NOT_FOUND: i32 = fferrtag(0xF8, b'E', b'N', b'C');
pub const AVERROR_EOF: i32 = fferrtag(b'E', b'O', b'F', b' ');
pub const AVERROR_EXIT: i32 = fferrtag(b'E', b'X', b'I', b'T');
pub const AVERROR_EXTERNAL: i32 = fferrtag(b'E', b'X', b'T', b' ');
pub const AVERROR_FILTER_NOT_FOUND: i32 = fferrtag(0xF8, b'F', b'I', b'L');
pub const AVERROR_INVALIDDATA: i32 = fferrtag(b'I', b'N', b'D', b'A');
pub const AVERROR_MUXER_NOT_FOUND: i32 = fferrtag(0xF8, b'M', b'U', b'X');
pub const AVERROR_OPTION_NOT_FOUND: i32 = fferrtag(0xF8, b'O', b'P', b'T');
pub const AVERROR_PATCHWELCOME: i32 = fferrtag(b'P', b'A', b'W', b'E');
pub const AVERROR_PROTOCOL_NOT_FOUND: i32 = fferrtag(0xF8, b'P', b'R', b'O');
pub const AVERROR_STREAM_NOT_FOUND: i32 = fferrtag(0xF8, b'S', b'T', b'R');
pub const AVERROR_BUG2: i32 = fferrtag(b'B', b'U', b'G', b' ');
pub const AVERROR_UNKNOWN: i32 = fferrtag(b'U', b'N', b'K', b'N');
pub const AVERROR_EXPERIMENTAL: i32 = -0x2bb2_afa8;
pub const AVERROR_INPUT_CHANGED: i32 = -0x636e_6701;
pub const AVERROR_OUTPUT_CHANGED: i32 = -0x636e_6702;
pub const AVERROR_HTTP_BAD_REQUEST: i32 = fferrtag(0xF8, b'4', b'0', b'0');
pub const AVERROR_HTTP_UNAUTHORIZED: i32 = fferrtag(0xF8, b'4', b'0', b'1');
pub const AVERROR_HTTP_FORBIDDEN: i32 = fferrtag(0xF8, b'4', b'0', b'3');
pub const AVERROR_HTTP_NOT_FOUND: i32 = fferrtag(0xF8, b'4', b'0', b'4');
pub const AVERROR_HTTP_TOO_MANY_REQUESTS: i32 = fferrtag(0xF8, b'4', b'2', b'9');
pub const AVERROR_HTTP_OTHER_4XX: i32 = fferrtag(0xF8, b'4', b'X', b'X');
pub const AVERROR_HTTP_SERVER_ERROR: i32 = fferrtag(0xF8, b'5', b'X', b'X');

/// Every known code with its description
pub static ERROR_CODES: &[(i32, &str)] = &[
    (AVERROR_BSF_NOT_FOUND, "AVERROR_BSF_NOT_FOUND: Bitstream filter not found"),
    (AVERROR_BUG, "AVERROR_BUG: Internal bug"),
    (AVERROR_BUFFER_TOO_SMALL, "AVERROR_BUFFER_TOO_SMALL: Buffer too small"),
    (AVERROR_DECODER_NOT_FOUND, "AVERROR_DECODER_NOT_FOUND: Decoder not found"),
    (AVERROR_DEMUXER_NOT_FOUND, "AVERROR_DEMUXER_NOT_FOUND: Demuxer not found"),
    (AVERROR_ENCODER_NOT_FOUND, "AVERROR_ENCODER_NOT_FOUND: Encoder not found"),
    (AVERROR_EOF, "AVERROR_EOF: End of file"),
    (AVERROR_EXIT, "AVERROR_EXIT: Immediate exit requested"),
    (AVERROR_EXTERNAL, "AVERROR_EXTERNAL: Generic error in an external library"),
    (AVERROR_FILTER_NOT_FOUND, "AVERROR_FILTER_NOT_FOUND: Filter not found"),
    (AVERROR_INVALIDDATA, "AVERROR_INVALIDDATA: Invalid data found when processing input"),
    (AVERROR_MUXER_NOT_FOUND, "AVERROR_MUXER_NOT_FOUND: Muxer not found"),
    (AVERROR_OPTION_NOT_FOUND, "AVERROR_OPTION_NOT_FOUND: Option not found"),
    (AVERROR_PATCHWELCOME, "AVERROR_PATCHWELCOME: Not yet implemented in FFmpeg"),
    (AVERROR_PROTOCOL_NOT_FOUND, "AVERROR_PROTOCOL_NOT_FOUND: Protocol not found"),
    (AVERROR_STREAM_NOT_FOUND, "AVERROR_STREAM_NOT_FOUND: Stream not found"),
    (AVERROR_BUG2, "AVERROR_BUG2: Internal bug"),
    (AVERROR_UNKNOWN, "AVERROR_UNKNOWN: Unknown error, typically from an external library"),
    (
        AVERROR_EXPERIMENTAL,
        "AVERROR_EXPERIMENTAL: Requested feature is flagged experimental; set strict_std_compliance to use it",
    ),
    (
        AVERROR_INPUT_CHANGED,
        "AVERROR_INPUT_CHANGED: Input changed between calls, reconfiguration is required",
    ),
    (
        AVERROR_OUTPUT_CHANGED,
        "AVERROR_OUTPUT_CHANGED: Output changed between calls, reconfiguration is required",
    ),
    (AVERROR_HTTP_BAD_REQUEST, "AVERROR_HTTP_BAD_REQUEST: Server returned 400 Bad Request"),
    (AVERROR_HTTP_UNAUTHORIZED, "AVERROR_HTTP_UNAUTHORIZED: Server returned 401 Unauthorized"),
    (AVERROR_HTTP_FORBIDDEN, "AVERROR_HTTP_FORBIDDEN: Server returned 403 Forbidden"),
    (AVERROR_HTTP_NOT_FOUND, "AVERROR_HTTP_NOT_FOUND: Server returned 404 Not Found"),
    (
        AVERROR_HTTP_TOO_MANY_REQUESTS,
        "AVERROR_HTTP_TOO_MANY_REQUESTS: Server returned 429 Too Many Requests",
    ),
    (AVERROR_HTTP_OTHER_4XX, "AVERROR_HTTP_OTHER_4XX: Server returned 4XX Client Error"),
    (AVERROR_HTTP_SERVER_ERROR, "AVERROR_HTTP_SERVER_ERROR: Server returned 5XX Server Error"),
];

/// Description of a known code
pub fn describe(code: i32) -> Option<&'static str> {
    ERROR_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, description)| *description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_ffmpeg_values() {
        assert_eq!(AVERROR_EOF, -541_478_725);
        assert_eq!(AVERROR_INVALIDDATA, -1_094_995_529);
        assert_eq!(AVERROR_EXIT, -1_414_092_869);
        assert_eq!(AVERROR_ENCODER_NOT_FOUND, -1_129_203_192);
        assert_eq!(AVERROR_HTTP_NOT_FOUND, -875_574_520);
    }

    #[test]
    fn test_codes_are_unique_and_negative() {
        for (i, (code, _)) in ERROR_CODES.iter().enumerate() {
            assert!(*code < 0);
            assert!(ERROR_CODES[i + 1..].iter().all(|(other, _)| other != code));
        }
        assert_eq!(ERROR_CODES.len(), 28);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(AVERROR_EOF), Some("AVERROR_EOF: End of file"));
        assert!(describe(AVERROR_HTTP_SERVER_ERROR).unwrap().contains("5XX"));
        assert_eq!(describe(-12345), None);
        assert_eq!(describe(1), None);
    }
}
