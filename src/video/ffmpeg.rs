//! `ffprobe`/`ffmpeg` backed video source.
//!
//! Metadata comes from `ffprobe` JSON output. Frames are decoded by a child
//! `ffmpeg` process writing raw RGB24 to its stdout, which is read one frame
//! at a time so memory stays bounded by a single frame.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use serde::Deserialize;

use super::source::VideoSource;
use super::types::{RawFrame, SourceError, VideoInfo};

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
    nb_read_packets: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

fn spawn_error(e: std::io::Error) -> SourceError {
    if e.kind() == ErrorKind::NotFound {
        SourceError::FfmpegNotFound
    } else {
        SourceError::Io(e)
    }
}

/// Parse an ffprobe rational such as `30000/1001` or `25/1` into whole fps.
///
/// Rounds to the nearest integer, never below 1. Returns `None` for `0/0` and
/// other unusable values.
pub(crate) fn parse_frame_rate(rate: &str) -> Option<u32> {
    let (num, den) = match rate.split_once('/') {
        Some((n, d)) => (n.trim().parse::<f64>().ok()?, d.trim().parse::<f64>().ok()?),
        None => (rate.trim().parse::<f64>().ok()?, 1.0),
    };
    if den <= 0.0 || num <= 0.0 {
        return None;
    }
    Some(((num / den).round() as u32).max(1))
}

/// Turn ffprobe JSON into [`VideoInfo`].
pub(crate) fn parse_probe(path: &Path, json: &[u8]) -> Result<VideoInfo, SourceError> {
    let probe_err = |message: String| SourceError::Probe {
        path: path.display().to_string(),
        message,
    };

    let parsed: ProbeOut =
        serde_json::from_slice(json).map_err(|e| probe_err(format!("invalid ffprobe json: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| probe_err("no video stream found".to_string()))?;

    let width = stream
        .width
        .ok_or_else(|| probe_err("missing video width".to_string()))?;
    let height = stream
        .height
        .ok_or_else(|| probe_err("missing video height".to_string()))?;

    // nb_frames is container metadata and absent for some formats (mkv, webm)
    let frame_count = [&stream.nb_frames, &stream.nb_read_packets]
        .into_iter()
        .flatten()
        .find_map(|n| n.parse::<u64>().ok().filter(|&n| n > 0))
        .unwrap_or(0);

    let fps = [&stream.avg_frame_rate, &stream.r_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|r| parse_frame_rate(r))
        .ok_or_else(|| probe_err("missing frame rate".to_string()))?;

    Ok(VideoInfo {
        width,
        height,
        fps,
        frame_count,
    })
}

/// Probe a video file through `ffprobe`.
pub fn probe_video(path: &Path) -> Result<VideoInfo, SourceError> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_packets",
            "-print_format",
            "json",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(spawn_error)?;

    if !out.status.success() {
        return Err(SourceError::Probe {
            path: path.display().to_string(),
            message: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }

    parse_probe(path, &out.stdout)
}

/// Video source that decodes through a child `ffmpeg` process.
///
/// The child is started lazily on the first `next_frame()` call, so opening a
/// source only costs the probe. The child is killed if the source is dropped
/// before the stream ends.
pub struct FfmpegSource {
    path: PathBuf,
    info: VideoInfo,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    /// Collects stderr lines so a failed decode can report them
    stderr_thread: Option<JoinHandle<Vec<String>>>,
    finished: bool,
}

impl std::fmt::Debug for FfmpegSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSource")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl FfmpegSource {
    /// Probe `path` and prepare to decode it.
    ///
    /// # Errors
    /// * `SourceError::FfmpegNotFound` - If `ffprobe` is not installed
    /// * `SourceError::Probe` - If the file has no readable video stream
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        if !path.exists() {
            return Err(SourceError::Probe {
                path: path.display().to_string(),
                message: "file does not exist".to_string(),
            });
        }
        let info = probe_video(&path)?;
        log::debug!("Probed {}: {}", path.display(), info);

        Ok(Self {
            path,
            info,
            child: None,
            stdout: None,
            stderr_thread: None,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn spawn_decoder(&mut self) -> Result<(), SourceError> {
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(&self.path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        self.stderr_thread = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                BufReader::new(stderr)
                    .lines()
                    .map_while(Result::ok)
                    .collect::<Vec<_>>()
            })
        });
        self.stdout = child.stdout.take();
        self.child = Some(child);
        Ok(())
    }

    fn take_stderr_output(&mut self) -> String {
        self.stderr_thread
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default()
            .join("\n")
    }

    /// Reap the child once stdout hits EOF and report a non-zero exit.
    fn finish(&mut self) -> Result<(), SourceError> {
        self.finished = true;
        self.stdout = None;
        let status = match self.child.take() {
            Some(mut child) => child.wait()?,
            None => return Ok(()),
        };
        let stderr = self.take_stderr_output();
        if status.success() {
            Ok(())
        } else {
            Err(SourceError::Decode(format!(
                "ffmpeg exited with code {:?}: {}",
                status.code(),
                stderr
            )))
        }
    }
}

/// Fill `buf` completely, or report how many bytes were read before EOF.
fn read_frame(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl VideoSource for FfmpegSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError> {
        if self.finished {
            return Ok(None);
        }
        if self.child.is_none() {
            self.spawn_decoder()?;
        }

        let frame_len = self.info.width as usize * self.info.height as usize * 3;
        let mut data = vec![0u8; frame_len];
        let filled = match self.stdout.as_mut() {
            Some(stdout) => read_frame(stdout, &mut data)?,
            None => 0,
        };

        if filled == frame_len {
            return Ok(Some(RawFrame::new(self.info.width, self.info.height, data)));
        }

        self.finish()?;
        if filled == 0 {
            Ok(None)
        } else {
            Err(SourceError::Decode(format!(
                "truncated frame: got {filled} of {frame_len} bytes"
            )))
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), Some(25));
        assert_eq!(parse_frame_rate("30000/1001"), Some(30));
        assert_eq!(parse_frame_rate("24"), Some(24));
        assert_eq!(parse_frame_rate("1/5"), Some(1));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_parse_probe_full() {
        let json = br#"{"streams":[
            {"codec_type":"audio"},
            {"codec_type":"video","width":640,"height":360,
             "nb_frames":"240","avg_frame_rate":"24/1","r_frame_rate":"24/1"}
        ]}"#;
        let info = parse_probe(Path::new("cat.mp4"), json).unwrap();
        assert_eq!(
            info,
            VideoInfo {
                width: 640,
                height: 360,
                fps: 24,
                frame_count: 240
            }
        );
    }

    #[test]
    fn test_parse_probe_falls_back_to_packet_count() {
        let json = br#"{"streams":[{"codec_type":"video","width":320,"height":240,
            "nb_read_packets":"99","avg_frame_rate":"0/0","r_frame_rate":"30/1"}]}"#;
        let info = parse_probe(Path::new("cat.mkv"), json).unwrap();
        assert_eq!(info.frame_count, 99);
        assert_eq!(info.fps, 30);
    }

    #[test]
    fn test_parse_probe_missing_counts_is_zero() {
        let json = br#"{"streams":[{"codec_type":"video","width":320,"height":240,
            "avg_frame_rate":"30/1"}]}"#;
        let info = parse_probe(Path::new("x.webm"), json).unwrap();
        assert_eq!(info.frame_count, 0);
    }

    #[test]
    fn test_parse_probe_without_video_stream() {
        let json = br#"{"streams":[{"codec_type":"audio"}]}"#;
        let err = parse_probe(Path::new("song.mp3"), json).unwrap_err();
        assert!(err.to_string().contains("no video stream"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = FfmpegSource::open("/nonexistent/clip.mp4").unwrap_err();
        assert!(matches!(err, SourceError::Probe { .. }));
    }

    #[test]
    fn test_read_frame_partial() {
        let mut reader: &[u8] = &[1, 2, 3];
        let mut buf = [0u8; 6];
        assert_eq!(read_frame(&mut reader, &mut buf).unwrap(), 3);
    }
}
