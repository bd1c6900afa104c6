use x64emit::Buffer;

/// Runs `f` against a fresh buffer and returns its hex dump, for tests
/// that only care about the bytes one instruction produces.
pub fn hex_of(f: impl FnOnce(&mut Buffer)) -> String {
    let mut buf = Buffer::new();
    f(&mut buf);
    buf.format_hex()
}
