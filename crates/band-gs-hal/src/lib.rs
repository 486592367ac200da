#![no_std]

/// Abstracts the narrow command/pixel bus to the rasterizer hardware.
///
/// The core driver never talks to the wire directly: it polls
/// `clear_to_send` before doing any work (cooperative backpressure), frames
/// each display-band transfer with `start_color_buffer_transfer`, and pushes
/// raw bytes with `write_data`. Implementations own CS toggling, DMA, and
/// timeout handling.
pub trait BusTransport {
    type Error: core::fmt::Debug;

    /// Returns true if the hardware can accept another transfer.
    /// Non-blocking; the driver backs off when this is false.
    fn clear_to_send(&mut self) -> bool;

    /// Write a block of raw bytes to the bus.
    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Announce the start of a color-buffer transfer for one display band.
    /// Band indices count from the bottom of the screen; the driver walks
    /// them last-to-first.
    fn start_color_buffer_transfer(&mut self, band: usize) -> Result<(), Self::Error>;
}
