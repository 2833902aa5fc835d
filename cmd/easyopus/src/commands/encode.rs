//! PCM to packet records.

use std::path::PathBuf;

use clap::Args;

use super::{
    format_bytes, get_profile, pcm_frames, print_success, push_record, read_file, write_file,
};
use crate::Cli;

/// Encode a PCM file into length-prefixed Opus packets.
#[derive(Args)]
pub struct EncodeCommand {
    /// Input PCM file (s16le, interleaved)
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Output packet file
    #[arg(short = 'o', long)]
    output: PathBuf,
}

impl EncodeCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let profile = get_profile(cli)?;
        let frame_size = profile.frame_size()?;
        let mut encoder = profile.encoder()?;

        let data = read_file(&self.input)?;
        let frames = pcm_frames(&data, profile.frame_samples()?)?;

        let mut out = Vec::new();
        for frame in &frames {
            let packet = encoder.encode(frame, frame_size)?;
            push_record(&mut out, packet.as_bytes())?;
        }

        write_file(&self.output, &out)?;
        print_success(&format!(
            "Encoded {} frames to: {} ({})",
            frames.len(),
            self.output.display(),
            format_bytes(out.len())
        ));
        Ok(())
    }
}
