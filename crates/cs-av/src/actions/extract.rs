//! Sub-range extraction using ffmpeg input seeking.

use std::path::Path;

use crate::command::ToolCommand;
use crate::tools::ToolConfig;

/// Build the ffmpeg arguments that copy `[start, end)` of `input` to `output`.
///
/// `-n` makes ffmpeg refuse to overwrite an existing file. When `end` is
/// `None` the extraction runs to the end of the source.
pub fn extract_args(input: &Path, output: &Path, start: f64, end: Option<f64>) -> Vec<String> {
    let mut args = vec![
        "-n".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-ss".to_string(),
        format_secs(start),
    ];
    if let Some(end) = end {
        args.push("-t".to_string());
        args.push(format_secs(end - start));
    }
    args.push(output.to_string_lossy().to_string());
    args
}

/// Extract `[start, end)` of `input` into `output`.
pub async fn extract_range(
    ffmpeg: &ToolConfig,
    input: &Path,
    output: &Path,
    start: f64,
    end: Option<f64>,
) -> cs_core::Result<()> {
    tracing::info!(
        "extract {:?} [{start}, {}) -> {:?}",
        input,
        end.map(|e| e.to_string()).unwrap_or_else(|| "end".into()),
        output
    );

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.timeout(ffmpeg.timeout);
    cmd.args(extract_args(input, output, start, end));
    cmd.execute().await?;

    Ok(())
}

/// Seconds with millisecond precision and no trailing zeros.
fn format_secs(secs: f64) -> String {
    let s = format!("{secs:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}
