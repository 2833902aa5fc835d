//! CLI commands module.

mod decode;
mod encode;
mod roundtrip;

use std::path::Path;

use anyhow::Context;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use roundtrip::RoundtripCommand;

use crate::Cli;
use crate::config::Profile;

/// Loads the profile and applies flag overrides.
pub(crate) fn get_profile(cli: &Cli) -> anyhow::Result<Profile> {
    let mut profile = Profile::resolve(cli.config.as_deref())?;
    if let Some(rate) = cli.sample_rate {
        profile.sample_rate = rate;
    }
    if let Some(channels) = cli.channels {
        profile.channels = channels;
    }
    if let Some(mode) = cli.application {
        profile.application = mode;
    }
    if cli.bitrate.is_some() {
        profile.bitrate = cli.bitrate;
    }
    if cli.complexity.is_some() {
        profile.complexity = cli.complexity;
    }
    if let Some(ms) = cli.frame_ms {
        profile.frame_ms = ms;
    }
    Ok(profile)
}

pub(crate) fn show_config(cli: &Cli) -> anyhow::Result<()> {
    let profile = get_profile(cli)?;
    print!("{}", serde_yaml::to_string(&profile)?);
    Ok(())
}

pub(crate) fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn write_file(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

/// Splits PCM bytes into frames of `frame_samples`, zero-padding the tail.
pub(crate) fn pcm_frames(data: &[u8], frame_samples: usize) -> anyhow::Result<Vec<Vec<i16>>> {
    let samples = easyopus::pcm::bytes_to_samples(data, easyopus::Endian::Little)
        .context("pcm input must hold whole 16-bit samples")?;
    Ok(samples
        .chunks(frame_samples)
        .map(|chunk| {
            let mut frame = chunk.to_vec();
            frame.resize(frame_samples, 0);
            frame
        })
        .collect())
}

/// Appends one length-prefixed packet record.
pub(crate) fn push_record(out: &mut Vec<u8>, packet: &[u8]) -> anyhow::Result<()> {
    let len = u16::try_from(packet.len())
        .map_err(|_| anyhow::anyhow!("packet of {} bytes does not fit a record", packet.len()))?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(packet);
    Ok(())
}

/// Splits a file of length-prefixed records back into packets.
pub(crate) fn split_records(mut data: &[u8]) -> anyhow::Result<Vec<&[u8]>> {
    let mut records = Vec::new();
    while !data.is_empty() {
        if data.len() < 2 {
            anyhow::bail!("truncated record header at end of input");
        }
        let len = u16::from_le_bytes([data[0], data[1]]) as usize;
        let rest = &data[2..];
        if rest.len() < len {
            anyhow::bail!("record claims {} bytes, {} left", len, rest.len());
        }
        records.push(&rest[..len]);
        data = &rest[len..];
    }
    Ok(records)
}

/// Prints a success message to stderr.
pub(crate) fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Formats a byte count for humans.
pub(crate) fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
