// src/detection/source.rs
//
// Upstream collaborator contract. Whatever decodes the video and runs the
// detector hands the session one FrameState at a time, in order. The file
// backed source replays detection logs written by that external stage.

use super::adapter::{DetectionAdapter, RawFrame};
use crate::error::AnalysisError;
use crate::types::FrameState;
use anyhow::Result;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const LOG_EXTENSIONS: [&str; 3] = ["json", "jsonl", "ndjson"];

/// Produces frames in strict temporal order.
///
/// `Ok(None)` means the stream is exhausted. An `Err` is an upstream
/// failure and is fatal for the run.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<FrameState>, AnalysisError>;

    /// Native frame rate, when the source knows it
    fn frame_rate(&self) -> Option<f64> {
        None
    }

    fn describe(&self) -> String {
        "frame source".to_string()
    }
}

// ============================================================================
// IN-MEMORY SOURCE
// ============================================================================

/// Frames already produced by a detector running in-process
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    frames: VecDeque<FrameState>,
    frame_rate: Option<f64>,
}

impl InMemorySource {
    pub fn new(frames: Vec<FrameState>) -> Self {
        Self {
            frames: frames.into(),
            frame_rate: None,
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }
}

impl FrameSource for InMemorySource {
    fn next_frame(&mut self) -> Result<Option<FrameState>, AnalysisError> {
        Ok(self.frames.pop_front())
    }

    fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    fn describe(&self) -> String {
        "in-memory frames".to_string()
    }
}

// ============================================================================
// DETECTION LOG (FILE)
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionFile {
    Frames(Vec<RawFrame>),
    Wrapped {
        #[serde(default)]
        frame_rate: Option<f64>,
        #[serde(alias = "detections")]
        frames: Vec<RawFrame>,
    },
}

enum FrameStream {
    Loaded(std::vec::IntoIter<RawFrame>),
    Lines {
        lines: Lines<BufReader<File>>,
        line_no: usize,
    },
}

/// Replays a detection log from disk.
///
/// `.json` files hold either an array of frame records or an object with
/// `frames` (optionally `frame_rate`). `.jsonl` / `.ndjson` files hold one
/// frame record per line and are streamed.
pub struct DetectionLog {
    path: PathBuf,
    adapter: DetectionAdapter,
    stream: FrameStream,
    frame_rate: Option<f64>,
    total_frames: Option<usize>,
    current_frame: usize,
}

impl DetectionLog {
    pub fn open(path: &Path, adapter: DetectionAdapter) -> Result<Self, AnalysisError> {
        info!("Opening detection log: {}", path.display());

        let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
        let streamed = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("jsonl") || e.eq_ignore_ascii_case("ndjson"))
            .unwrap_or(false);

        let (stream, frame_rate, total_frames) = if streamed {
            let stream = FrameStream::Lines {
                lines: BufReader::new(file).lines(),
                line_no: 0,
            };
            (stream, None, None)
        } else {
            let parsed: DetectionFile = serde_json::from_reader(BufReader::new(file))
                .map_err(|e| AnalysisError::parse(path.display().to_string(), e))?;
            let (frames, frame_rate) = match parsed {
                DetectionFile::Frames(frames) => (frames, None),
                DetectionFile::Wrapped { frame_rate, frames } => (frames, frame_rate),
            };
            let total = frames.len();
            (FrameStream::Loaded(frames.into_iter()), frame_rate, Some(total))
        };

        if let Some(total) = total_frames {
            info!("Detection log holds {} frames", total);
        }

        Ok(Self {
            path: path.to_path_buf(),
            adapter,
            stream,
            frame_rate,
            total_frames,
            current_frame: 0,
        })
    }

    pub fn read_frame(&mut self) -> Result<Option<FrameState>, AnalysisError> {
        let raw = match &mut self.stream {
            FrameStream::Loaded(frames) => frames.next(),
            FrameStream::Lines { lines, line_no } => loop {
                let Some(line) = lines.next() else {
                    break None;
                };
                *line_no += 1;
                let line = line.map_err(|e| AnalysisError::io(&self.path, e))?;
                if line.trim().is_empty() {
                    continue;
                }
                let location = format!("{}:{}", self.path.display(), line_no);
                let raw: RawFrame = serde_json::from_str(&line)
                    .map_err(|e| AnalysisError::parse(location, e))?;
                break Some(raw);
            },
        };

        Ok(raw.map(|raw| {
            self.current_frame += 1;
            let frame = self.adapter.adapt(&raw);
            debug!(
                "Frame {}: {} detections",
                self.current_frame,
                frame.detection_count()
            );
            frame
        }))
    }

    /// Percentage read, 0 when the total is unknown (streamed logs)
    pub fn progress(&self) -> f32 {
        match self.total_frames {
            Some(total) if total > 0 => (self.current_frame as f32 / total as f32) * 100.0,
            _ => 0.0,
        }
    }

    pub fn total_frames(&self) -> Option<usize> {
        self.total_frames
    }
}

impl FrameSource for DetectionLog {
    fn next_frame(&mut self) -> Result<Option<FrameState>, AnalysisError> {
        self.read_frame()
    }

    fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Detection logs under `input_dir`, sorted for a stable processing order
pub fn find_detection_files(input_dir: &str) -> Result<Vec<PathBuf>> {
    let mut logs: Vec<PathBuf> = WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| LOG_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    logs.sort();

    info!("Found {} detection logs", logs.len());
    Ok(logs)
}
