//! Split a file into parts and restore it from shuffled captures.
//!
//! Run with:
//!   cargo run --example round-trip -- path/to/file [L|M|Q|H]

use paperize::frame::{decode, encode, EncoderConfig, ErrorCorrection};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: round-trip FILE [L|M|Q|H]")?;
    let level = match args.next().as_deref() {
        Some("L") => ErrorCorrection::Low,
        Some("Q") => ErrorCorrection::Quartile,
        Some("H") => ErrorCorrection::High,
        _ => ErrorCorrection::Medium,
    };

    let data = std::fs::read(&path)?;
    let name = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("file name is not UTF-8")?;

    let parts = encode(&data, &EncoderConfig::for_level(level), name)?;
    eprintln!("{} bytes -> {} part(s) at level {}", data.len(), parts.len(), level.letter());

    // Captures arrive in any order.
    let mut captured: Vec<String> = parts.iter().map(|p| p.text()).collect();
    captured.reverse();

    let decoded = decode(&captured)?.verified()?;
    assert_eq!(decoded.data, data);
    eprintln!("restored {} ({} bytes, checksum ok)", decoded.file_name, decoded.data.len());
    Ok(())
}
