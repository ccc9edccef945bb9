//! Codec for the container runtime's multiplexed output stream.
//!
//! Exec output read from the daemon arrives as a sequence of frames. Each
//! frame is an 8-byte header followed by a payload: byte 0 carries the
//! stream tag, bytes 1-3 are reserved, bytes 4-7 hold the payload length as
//! a big-endian u32. [`demux`] recovers the interleaved stdout/stderr text;
//! [`frame`] produces the same wire form and is used by runtime
//! implementations to hand exec output across the runtime boundary.

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Frame tag for the container's stdout stream.
pub const STDOUT_TAG: u8 = 1;

/// Frame tag for the container's stderr stream.
pub const STDERR_TAG: u8 = 2;

/// Size in bytes of a frame header.
pub const HEADER_LEN: usize = 8;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Decode a raw multiplexed attach stream into text.
///
/// Stdout and stderr payloads are concatenated in stream order with no added
/// separators; payloads with any other tag are discarded. A truncated
/// trailing frame, whether the header or the declared payload runs past the
/// end of the buffer, ends decoding silently. Decoding never fails:
/// malformed input degrades to whatever text was recovered up to that point,
/// and empty input yields an empty string.
pub fn demux(raw: &[u8]) -> String {
    let mut out = Vec::new();
    let mut offset = 0;

    while offset + HEADER_LEN <= raw.len() {
        let tag = raw[offset];
        let len = u32::from_be_bytes([
            raw[offset + 4],
            raw[offset + 5],
            raw[offset + 6],
            raw[offset + 7],
        ]) as usize;

        if len == 0 {
            offset += HEADER_LEN;
            continue;
        }

        if offset + HEADER_LEN + len > raw.len() {
            break;
        }

        if tag == STDOUT_TAG || tag == STDERR_TAG {
            out.extend_from_slice(&raw[offset + HEADER_LEN..offset + HEADER_LEN + len]);
        }

        offset += HEADER_LEN + len;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Encode one payload as a wire frame with the given stream tag.
pub fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.push(tag);
    buf.extend_from_slice(&[0, 0, 0]);
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
