//! Concatenation via ffmpeg's concat demuxer with `-c copy` (no re-encode).

use std::path::Path;

use crate::command::ToolCommand;
use crate::tools::ToolConfig;

/// Build the ffmpeg arguments that concatenate the files listed in `manifest`.
pub fn concat_args(manifest: &Path, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = ["-n", "-f", "concat", "-safe", "0", "-i"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.push(manifest.to_string_lossy().to_string());
    args.extend(["-c", "copy"].iter().map(|s| s.to_string()));
    args.push(output.to_string_lossy().to_string());
    args
}

/// Concatenate the manifest's sources, in order, into `output`.
pub async fn concat_copy(ffmpeg: &ToolConfig, manifest: &Path, output: &Path) -> cs_core::Result<()> {
    tracing::info!("concat {:?} -> {:?}", manifest, output);

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.timeout(ffmpeg.timeout);
    cmd.args(concat_args(manifest, output));
    cmd.execute().await?;

    Ok(())
}
