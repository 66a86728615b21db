//! DMA collaborator interface and the transfer setup used for captures.
//!
//! The DMA controller driver lives outside this crate. The receiver needs one channel that reads
//! words from the VFIFO data port and writes them to incrementing memory, raising an interrupt on
//! count-to-zero. The application's DMA interrupt handler forwards that interrupt to
//! `Csi2::on_dma_complete`.

use crate::error::DmaError;

/// A DMA channel held by the receiver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Channel(pub u8);

/// Peripheral request line that paces the transfer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Request {
    Csi2Rx,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Width {
    Byte,
    HalfWord,
    Word,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Priority {
    High,
    MediumHigh,
    MediumLow,
    Low,
}

/// Basic channel setup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelConfig {
    pub request: Request,
    pub src_width: Width,
    pub dst_width: Width,
    pub src_increment: bool,
    pub dst_increment: bool,
}

/// Source, destination and length (bytes) of one transfer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Transfer {
    pub source: u32,
    pub dest: u32,
    pub len: u32,
}

/// Burst and arbitration setup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AdvConfig {
    pub burst_size: u32,
    pub priority: Priority,
    pub request_wait: bool,
}

/// Operations the receiver needs from the DMA controller driver.
pub trait DmaEngine {
    fn init(&mut self) -> Result<(), DmaError>;

    fn acquire_channel(&mut self) -> Result<Channel, DmaError>;

    fn config_channel(
        &mut self,
        ch: Channel,
        cfg: &ChannelConfig,
        xfer: &Transfer,
    ) -> Result<(), DmaError>;

    /// Select the channel interrupt sources: channel disable and count-to-zero.
    fn set_channel_interrupts(
        &mut self,
        ch: Channel,
        disable_ie: bool,
        ctz_ie: bool,
    ) -> Result<(), DmaError>;

    fn adv_config_channel(&mut self, ch: Channel, adv: &AdvConfig) -> Result<(), DmaError>;

    /// Route the channel interrupt to the CPU.
    fn enable_interrupt(&mut self, ch: Channel) -> Result<(), DmaError>;

    fn start(&mut self, ch: Channel) -> Result<(), DmaError>;

    fn release_channel(&mut self, ch: Channel) -> Result<(), DmaError>;

    /// Acknowledge the count-to-zero status of `ch`.
    fn clear_count_to_zero(&mut self, ch: Channel);

    /// Load a new byte count for the next transfer on `ch`.
    fn reload_count(&mut self, ch: Channel, count: u32);

    /// Re-enable `ch` after a reload.
    fn enable_channel(&mut self, ch: Channel);
}

/// Word wide reads from the VFIFO into incrementing memory.
pub const FIFO_TO_MEMORY: ChannelConfig = ChannelConfig {
    request: Request::Csi2Rx,
    src_width: Width::Word,
    dst_width: Width::Word,
    src_increment: false,
    dst_increment: true,
};

/// Configure `ch` to move `len` bytes from the VFIFO at `fifo` to `dest` and start it.
pub fn start_fifo_transfer<D: DmaEngine>(
    dma: &mut D,
    ch: Channel,
    fifo: u32,
    dest: u32,
    len: u32,
    burst_size: u32,
) -> Result<(), DmaError> {
    let xfer = Transfer {
        source: fifo,
        dest,
        len,
    };
    let adv = AdvConfig {
        burst_size,
        priority: Priority::High,
        request_wait: false,
    };

    dma.config_channel(ch, &FIFO_TO_MEMORY, &xfer)?;
    dma.set_channel_interrupts(ch, false, true)?;
    dma.adv_config_channel(ch, &adv)?;
    dma.enable_interrupt(ch)?;
    dma.start(ch)
}


#[cfg(test)]
mod tests {
    use super::fake::{Call, FakeDma};
    use super::*;

    #[test]
    fn fifo_transfer_is_set_up_in_order() {
        let mut dma = FakeDma::new();
        let ch = Channel(2);
        start_fifo_transfer(&mut dma, ch, 0x400b_d000, 0x2000_0000, 640, 16).unwrap();

        let xfer = Transfer {
            source: 0x400b_d000,
            dest: 0x2000_0000,
            len: 640,
        };
        let adv = AdvConfig {
            burst_size: 16,
            priority: Priority::High,
            request_wait: false,
        };
        assert_eq!(
            dma.calls,
            vec![
                Call::Config(ch, FIFO_TO_MEMORY, xfer),
                Call::Interrupts(ch, false, true),
                Call::Adv(ch, adv),
                Call::EnableInterrupt(ch),
                Call::Start(ch),
            ]
        );
    }

    #[test]
    fn rejected_config_stops_the_setup() {
        let mut dma = FakeDma::new();
        dma.config_error = Some(DmaError::BadParameter);
        let res = start_fifo_transfer(&mut dma, Channel(0), 0, 0x2000_0000, 640, 16);
        assert_eq!(res, Err(DmaError::BadParameter));
        assert!(!dma.calls.contains(&Call::Start(Channel(0))));
    }
}
