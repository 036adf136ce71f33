// Partition file header: [magic: 4 bytes][version: u8][payload].

pub(super) const MAGIC: &[u8; 4] = b"HMCF";
/// Version 1: wincode-encoded `Frame` with eight fixed columns.
pub(super) const FRAME_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;

pub(super) fn with_header(version: u8, payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.push(version);
    out.extend_from_slice(&payload);
    out
}

/// Splits a file into `(version, payload)`; `None` if the magic is missing.
pub(super) fn split_header(bytes: &[u8]) -> Option<(u8, &[u8])> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return None;
    }
    Some((bytes[MAGIC.len()], &bytes[HEADER_LEN..]))
}
