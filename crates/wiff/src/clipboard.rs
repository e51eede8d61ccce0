//! OSC-52 clipboard writer.
//!
//! Writes the set-clipboard escape straight to the controlling terminal,
//! bypassing the rendering backend's buffering. No acknowledgement is
//! read; success means the write did not error.

use std::fs::OpenOptions;
use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub fn copy_to_clipboard(text: &str) -> bool {
    let Ok(mut tty) = OpenOptions::new().write(true).open("/dev/tty") else {
        return false;
    };
    let encoded = STANDARD.encode(text.as_bytes());
    write!(tty, "\x1b]52;c;{encoded}\x07").is_ok()
}
