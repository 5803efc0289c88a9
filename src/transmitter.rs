//! Ships encoded frames to the radio, or to anything else that accepts bytes.

use std::io::Write;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};
use serialport::SerialPort;

use crate::constants::SERIAL_TIMEOUT_MILLISECONDS;
use crate::error::DownlinkError;
use crate::frame::Frame;

/// Somewhere frames go once they leave the sampling loop.
pub trait FrameSink {
    fn send(&mut self, frame: &Frame) -> Result<(), DownlinkError>;

    fn flush(&mut self) -> Result<(), DownlinkError> {
        Ok(())
    }
}

/// Writes raw frames back to back, with no framing bytes between them.
pub struct Transmitter<W: Write> {
    port: W,
}

impl Transmitter<Box<dyn SerialPort>> {
    pub fn open_serial(path: &str, baud_rate: u32) -> Result<Self, DownlinkError> {
        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_millis(SERIAL_TIMEOUT_MILLISECONDS))
            .open()?;
        info!("Opened {} at {} baud", path, baud_rate);
        Ok(Transmitter { port })
    }
}

impl<W: Write> Transmitter<W> {
    pub fn new(port: W) -> Self {
        Transmitter { port }
    }

    pub fn into_inner(self) -> W {
        self.port
    }
}

impl<W: Write> FrameSink for Transmitter<W> {
    fn send(&mut self, frame: &Frame) -> Result<(), DownlinkError> {
        self.port.write_all(frame.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DownlinkError> {
        self.port.flush()?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DownlinkStats {
    pub sent: u64,
    pub dropped: u64,
}

/// Drains `frames` into `sink` on a separate thread until every sender is gone.
///
/// A frame the sink refuses is logged and dropped, the next one is still attempted.
pub fn spawn_downlink<S>(mut sink: S, frames: Receiver<Frame>) -> JoinHandle<DownlinkStats>
where
    S: FrameSink + Send + 'static,
{
    thread::spawn(move || {
        let mut stats = DownlinkStats::default();
        for frame in frames {
            match sink.send(&frame) {
                Ok(()) => stats.sent += 1,
                Err(e) => {
                    warn!("Dropping frame: {}", e);
                    stats.dropped += 1;
                }
            }
        }
        if let Err(e) = sink.flush() {
            warn!("Failed to flush downlink: {}", e);
        }
        info!("Downlink closed: {} sent, {} dropped", stats.sent, stats.dropped);
        stats
    })
}
