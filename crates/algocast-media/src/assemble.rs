//! Clip assembly operations: normalize, mux, concatenate.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use algocast_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Shortest plain fallback video, in seconds.
const MIN_PLAIN_VIDEO_SECS: f64 = 0.5;

/// Re-encode a rendered clip to the shared video format and drop any audio.
pub async fn normalize_silent_clip(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(input, output)
        .output_args(encoding.video_args())
        .no_audio();
    runner.run(&cmd).await
}

/// Combine a silent clip and an audio track into one clip.
///
/// Audio is expected to be at least as long as the video; nothing is trimmed.
pub async fn mux(
    runner: &FfmpegRunner,
    video: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let output = output.as_ref();
    debug!("Muxing {} + {} -> {}", video.as_ref().display(), audio.as_ref().display(), output.display());

    let cmd = FfmpegCommand::to(output)
        .input(video)
        .input(audio)
        .map("0:v:0")
        .map("1:a:0")
        .output_args(encoding.video_args())
        .output_args(encoding.audio_args());
    runner.run(&cmd).await
}

/// Join clips in order into a single video via the concat demuxer.
///
/// The list file is written next to `output`.
pub async fn concat_clips(
    runner: &FfmpegRunner,
    clips: &[PathBuf],
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    if clips.is_empty() {
        return Err(MediaError::internal("concat_clips called with no clips"));
    }
    let output = output.as_ref();
    let list = output.with_extension("txt");
    write_concat_list(&list, clips).await?;

    info!("Concatenating {} clips -> {}", clips.len(), output.display());
    let cmd = FfmpegCommand::to(output)
        .concat_list(&list)
        .output_args(encoding.video_args())
        .output_args(encoding.audio_args());
    runner.run(&cmd).await
}

/// Join narration files into one AAC track; one second of silence when empty.
pub async fn concat_narration(
    runner: &FfmpegRunner,
    audio_files: &[PathBuf],
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let output = output.as_ref();
    let cmd = if audio_files.is_empty() {
        FfmpegCommand::to(output)
            .lavfi("anullsrc=r=44100:cl=stereo")
            .input_arg("-t")
            .input_arg("1.0")
    } else {
        let list = output.with_extension("txt");
        write_concat_list(&list, audio_files).await?;
        FfmpegCommand::to(output).concat_list(&list)
    };
    runner.run(&cmd.output_args(encoding.audio_args())).await
}

/// Black canvas of `total_secs` carrying `audio`, used when scene rendering is off.
pub async fn plain_video(
    runner: &FfmpegRunner,
    total_secs: f64,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let duration = total_secs.max(MIN_PLAIN_VIDEO_SECS);
    let cmd = FfmpegCommand::to(output)
        .lavfi(format!(
            "color=c={}:s={}:d={:.2}",
            encoding.background,
            encoding.size(),
            duration
        ))
        .input(audio)
        .output_args(encoding.video_args())
        .output_args(encoding.audio_args())
        .output_arg("-shortest");
    runner.run(&cmd).await
}

/// Write a concat-demuxer list file.
pub async fn write_concat_list(list: &Path, entries: &[PathBuf]) -> MediaResult<()> {
    tokio::fs::write(list, concat_list_contents(entries)).await?;
    Ok(())
}

fn concat_list_contents(entries: &[PathBuf]) -> String {
    entries
        .iter()
        .map(|p| {
            let path = p.to_string_lossy().replace('\\', "/");
            format!("file '{}'\n", path.replace('\'', "'\\''"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_concat_list_contents() {
        let entries = vec![
            PathBuf::from("/tmp/job/clip_000_av.mp4"),
            PathBuf::from("/tmp/job/it's.mp4"),
        ];
        assert_eq!(
            concat_list_contents(&entries),
            "file '/tmp/job/clip_000_av.mp4'\nfile '/tmp/job/it'\\''s.mp4'\n"
        );
    }

    #[tokio::test]
    async fn test_write_concat_list() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("final.txt");
        write_concat_list(&list, &[dir.path().join("a.mp4")]).await.unwrap();
        let contents = tokio::fs::read_to_string(&list).await.unwrap();
        assert!(contents.starts_with("file '"));
        assert!(contents.trim_end().ends_with("a.mp4'"));
    }

    #[tokio::test]
    async fn test_concat_requires_clips() {
        let err = concat_clips(&FfmpegRunner::new(), &[], "/tmp/out.mp4", &EncodingConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Internal(_)));
    }
}
