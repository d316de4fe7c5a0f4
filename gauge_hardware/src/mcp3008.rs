//! MCP3008 front-end for the fuel sender divider.
//!
//! The sender feeds one single-ended channel of the 10-bit converter over
//! SPI. One transaction per sample: start bit, single-ended + channel
//! nibble, then two clocked-out bytes carrying the 10-bit code.

use gauge_traits::FuelSensor;
pub use rppal::spi::{Bus, SlaveSelect};
use rppal::spi::{Mode, Spi};
use std::error::Error;
use tracing::trace;

use crate::error::{HwError, Result};

const SPI_CLOCK_HZ: u32 = 1_350_000;

pub struct Mcp3008 {
    spi: Spi,
    channel: u8,
}

impl Mcp3008 {
    pub fn new(bus: Bus, slave: SlaveSelect, channel: u8) -> Result<Self> {
        if channel > 7 {
            return Err(HwError::Channel(channel));
        }
        let spi = Spi::new(bus, slave, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self { spi, channel })
    }

    pub fn read_channel(&mut self) -> Result<u16> {
        let tx = [0x01, 0x80 | (self.channel << 4), 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        trace!(raw, channel = self.channel, "mcp3008 sample");
        Ok(raw)
    }
}

impl FuelSensor for Mcp3008 {
    fn read_raw(&mut self) -> std::result::Result<u16, Box<dyn Error + Send + Sync>> {
        Ok(self.read_channel()?)
    }
}
