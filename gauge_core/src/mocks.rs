//! Test and helper mocks for gauge_core.

use gauge_traits::{FuelDisplay, FuelSensor};
use std::error::Error;

/// Sensor that replays a fixed sequence of raw codes, then repeats the
/// last value.
pub struct ScriptedSensor {
    seq: Vec<u16>,
    idx: usize,
}

impl ScriptedSensor {
    pub fn new(seq: impl Into<Vec<u16>>) -> Self {
        Self {
            seq: seq.into(),
            idx: 0,
        }
    }

    /// Raw codes handed out so far.
    pub fn reads(&self) -> usize {
        self.idx
    }
}

impl FuelSensor for ScriptedSensor {
    fn read_raw(&mut self) -> Result<u16, Box<dyn Error + Send + Sync>> {
        let v = if self.idx < self.seq.len() {
            self.seq[self.idx]
        } else {
            self.seq.last().copied().unwrap_or(0)
        };
        self.idx += 1;
        Ok(v)
    }
}

/// Sensor that always errors on read.
pub struct FailingSensor;

impl FuelSensor for FailingSensor {
    fn read_raw(&mut self) -> Result<u16, Box<dyn Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("sender unavailable")))
    }
}

/// Display that accepts and discards every render command.
pub struct NullDisplay;

impl FuelDisplay for NullDisplay {
    fn render_meter(&mut self, _segments: u8) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
    fn render_stats(&mut self, _raw: u16, _gallons: f32) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
