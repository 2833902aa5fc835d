//! Packet records to PCM.

use std::path::PathBuf;

use clap::Args;

use easyopus::Endian;

use super::{format_bytes, get_profile, print_success, read_file, split_records, write_file};
use crate::Cli;

/// Decode length-prefixed Opus packets into a PCM file.
///
/// Empty records are treated as lost packets and concealed.
#[derive(Args)]
pub struct DecodeCommand {
    /// Input packet file
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Output PCM file (s16le, interleaved)
    #[arg(short = 'o', long)]
    output: PathBuf,
}

impl DecodeCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let profile = get_profile(cli)?;
        let frame_size = profile.frame_size()?;
        let mut decoder = profile.decoder()?;

        let data = read_file(&self.input)?;
        let records = split_records(&data)?;

        let mut out = Vec::new();
        for (i, packet) in records.iter().enumerate() {
            let pcm = if packet.is_empty() {
                tracing::debug!(record = i, "concealing lost packet");
                let samples = decoder.decode_lost(frame_size)?;
                easyopus::pcm::samples_to_bytes(&samples, Endian::Little)
            } else {
                decoder.decode_bytes(packet, Endian::Little, frame_size)?
            };
            out.extend_from_slice(&pcm);
        }

        write_file(&self.output, &out)?;
        print_success(&format!(
            "Decoded {} packets to: {} ({})",
            records.len(),
            self.output.display(),
            format_bytes(out.len())
        ));
        Ok(())
    }
}
