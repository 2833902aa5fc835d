//! Encode-then-decode loopback over a PCM file.

use std::path::PathBuf;

use clap::Args;

use super::{format_bytes, get_profile, pcm_frames, print_success, read_file, write_file};
use crate::Cli;

/// Encode and immediately decode every frame of a PCM file.
///
/// Reports packet statistics; with -o the decoded PCM is written out.
#[derive(Args)]
pub struct RoundtripCommand {
    /// Input PCM file (s16le, interleaved)
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Output PCM file for the decoded audio
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

impl RoundtripCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let profile = get_profile(cli)?;
        let frame_size = profile.frame_size()?;
        let mut encoder = profile.encoder()?;
        let mut decoder = profile.decoder()?;

        let data = read_file(&self.input)?;
        let frames = pcm_frames(&data, profile.frame_samples()?)?;

        let mut decoded = Vec::with_capacity(data.len());
        let mut packet_bytes = 0usize;
        for frame in &frames {
            let packet = encoder.encode(frame, frame_size)?;
            packet_bytes += packet.len();
            let pcm = decoder.decode_bytes(packet.as_bytes(), easyopus::Endian::Little, frame_size)?;
            decoded.extend_from_slice(&pcm);
        }
        tracing::debug!(frames = frames.len(), packet_bytes, "roundtrip finished");

        let mean = if frames.is_empty() { 0 } else { packet_bytes / frames.len() };
        println!(
            "packets: {}, encoded: {}, mean packet: {}, pcm: {}",
            frames.len(),
            format_bytes(packet_bytes),
            format_bytes(mean),
            format_bytes(data.len())
        );

        if let Some(output) = &self.output {
            write_file(output, &decoded)?;
            print_success(&format!("Decoded audio saved to: {}", output.display()));
        }
        Ok(())
    }
}
