//! Appends raw frames to a file, the same bytes the radio would see.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::DownlinkError;
use crate::frame::Frame;
use crate::transmitter::FrameSink;

pub struct FrameRecorder {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FrameRecorder {
    /// Opens `path` for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(FrameRecorder {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Opens a new file in `directory` named after the current UTC time,
    /// `YYYY-MM-DD_HH-MM-SS.bin`.
    pub fn create_in<P: AsRef<Path>>(directory: P) -> io::Result<Self> {
        fs::create_dir_all(&directory)?;
        let file_name = format!("{}.bin", chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S"));
        Self::open(directory.as_ref().join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSink for FrameRecorder {
    fn send(&mut self, frame: &Frame) -> Result<(), DownlinkError> {
        self.writer.write_all(frame.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DownlinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for FrameRecorder {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameLayout, decode, encode};
    use crate::reading::SensorReading;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("payload-core-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn appends_across_reopen() {
        let dir = scratch_dir("append");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("frames.bin");

        let mut reading = SensorReading::default();
        reading.altitude_agl_ft = 1234.0;
        let frame = encode(&reading, FrameLayout::Standard);

        for _ in 0..2 {
            let mut recorder = FrameRecorder::open(&path).unwrap();
            recorder.send(&frame).unwrap();
        }

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 48);
        let second = decode(&bytes[24..], FrameLayout::Standard).unwrap();
        assert_eq!(second.altitude_agl_ft, 1234.0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn timestamped_file_in_new_directory() {
        let dir = scratch_dir("timestamped");
        let recorder = FrameRecorder::create_in(dir.join("frames")).unwrap();
        let name = recorder.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with(".bin"));
        assert_eq!(name.len(), "YYYY-MM-DD_HH-MM-SS.bin".len());
        drop(recorder);
        fs::remove_dir_all(&dir).unwrap();
    }
}
