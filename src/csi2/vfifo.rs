//! Virtual FIFO: DMA request generation, FIFO level interrupts and the RAW to RGB converter.

use core::convert::TryFrom;

use super::config::{
    AhbWait, BandwidthMode, CaptureRequest, DmaMode, ErrorDetection, FifoReadMode, FifoTrigger,
    FlowControl, RawFormat, RgbType, VfifoConfig,
};
use super::regs::{
    Reg, Registers, VfifoCfg0, VfifoCfg1, VfifoCtrl, VfifoFlags, VfifoRawCtrl, VfifoSts,
    FIFO_DEPTH, FIFO_MAX_BURST,
};
use crate::error::Error;

/// Largest accepted virtual channel.
pub const MAX_VIRTUAL_CHANNEL: u8 = 3;

/// Detection mode of the FIFO level interrupts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DetectMode {
    Level,
    Edge,
}

/// Runtime state for reading the FIFO without DMA.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FifoState {
    /// FIFO level currently raising the VFIFO interrupt.
    pub trigger: FifoTrigger,

    /// Entities to read on each trigger.
    pub burst_size: u32,

    /// Copy of the configured RX threshold.
    pub rx_threshold: u8,

    /// Bits per pixel used to size the not-empty burst.
    pub bits_per_pixel: u32,
}

impl FifoState {
    pub fn new(rx_threshold: u8, bits_per_pixel: u32) -> Self {
        FifoState {
            trigger: FifoTrigger::NoTrigger,
            burst_size: 0,
            rx_threshold,
            bits_per_pixel,
        }
    }
}

impl Default for FifoState {
    fn default() -> Self {
        FifoState::new(0, 0)
    }
}

/// Apply `cfg`. Registers written before a validation failure keep their new values.
pub fn configure<R: Registers>(regs: &mut R, cfg: &VfifoConfig) -> Result<(), Error> {
    let flow = match cfg.flow_control {
        FlowControl::Disabled => 0,
        FlowControl::Enabled => 1,
    };
    let cfg1 = VfifoCfg1::FLOW_CONTROL.insert(0, flow);
    let cfg1 = VfifoCfg1::AHB_WAIT_CYCLES.insert(cfg1, u32::from(cfg.wait_cycles));
    regs.write(Reg::VfifoCfg1, cfg1);

    if cfg.virtual_channel > MAX_VIRTUAL_CHANNEL {
        return Err(Error::BadParameter);
    }
    regs.write_field(
        Reg::VfifoCfg0,
        VfifoCfg0::VIRTUAL_CHANNEL,
        u32::from(cfg.virtual_channel),
    );

    set_dma_mode(regs, cfg.dma_mode);
    set_ahb_wait(regs, cfg.ahb_wait);

    let read_mode = match cfg.fifo_read_mode {
        FifoReadMode::OneByOne => 0,
        FifoReadMode::DirectAddress => 1,
    };
    regs.write_field(Reg::VfifoCfg0, VfifoCfg0::FIFO_READ_MODE, read_mode);

    let detect = match cfg.error_detection {
        ErrorDetection::Disabled => 0,
        ErrorDetection::Enabled => 1,
    };
    regs.write_field(Reg::VfifoCfg0, VfifoCfg0::ERROR_DETECT, detect);

    let full = match cfg.bandwidth {
        BandwidthMode::Normal => 0,
        BandwidthMode::Full => 1,
    };
    regs.write_field(Reg::VfifoCfg0, VfifoCfg0::FULL_BANDWIDTH, full);

    if cfg.rx_threshold >= FIFO_DEPTH {
        return Err(Error::BadParameter);
    }
    regs.write_field(
        Reg::VfifoCtrl,
        VfifoCtrl::THRESHOLD,
        u32::from(cfg.rx_threshold),
    );

    Ok(())
}

/// Program the expected frame geometry.
pub fn set_frame_size<R: Registers>(regs: &mut R, pixels_per_line: u32, lines_per_frame: u32) {
    regs.write(Reg::VfifoPixelNum, pixels_per_line);
    regs.write(Reg::VfifoLineNum, lines_per_frame);
}

/// Set the RAW buffer addresses and, if requested, turn on RAW to RGB conversion.
pub fn configure_raw_to_rgb<R: Registers>(regs: &mut R, req: &CaptureRequest) {
    regs.write(Reg::VfifoRawBuf0Addr, req.raw_buf0_addr);
    regs.write(Reg::VfifoRawBuf1Addr, req.raw_buf1_addr);

    if let Some(conv) = req.raw_to_rgb {
        set_rgb_type(regs, conv.rgb_type);
        set_raw_format(regs, conv.raw_format);
        regs.write_field(
            Reg::VfifoRawCtrl,
            VfifoRawCtrl::AUTO_FLUSH,
            u32::from(conv.auto_flush),
        );
        regs.write_field(Reg::VfifoRawCtrl, VfifoRawCtrl::CONVERT_EN, 1);
    }
}

pub fn enable<R: Registers>(regs: &mut R) {
    regs.write_field(Reg::VfifoCtrl, VfifoCtrl::FIFO_EN, 1);
}

pub fn disable<R: Registers>(regs: &mut R) {
    regs.write_field(Reg::VfifoCtrl, VfifoCtrl::FIFO_EN, 0);
}

pub fn is_enabled<R: Registers>(regs: &R) -> bool {
    regs.read_field(Reg::VfifoCtrl, VfifoCtrl::FIFO_EN) != 0
}

pub fn set_dma_mode<R: Registers>(regs: &mut R, mode: DmaMode) {
    regs.write_field(Reg::VfifoCfg0, VfifoCfg0::DMA_MODE, mode.bits());
}

pub fn dma_mode<R: Registers>(regs: &R) -> Result<DmaMode, Error> {
    DmaMode::try_from(regs.read_field(Reg::VfifoCfg0, VfifoCfg0::DMA_MODE))
}

pub fn set_ahb_wait<R: Registers>(regs: &mut R, wait: AhbWait) {
    let bit = match wait {
        AhbWait::Disabled => 0,
        AhbWait::Enabled => 1,
    };
    regs.write_field(Reg::VfifoCfg0, VfifoCfg0::AHB_WAIT, bit);
}

pub fn ahb_wait<R: Registers>(regs: &R) -> AhbWait {
    match regs.read_field(Reg::VfifoCfg0, VfifoCfg0::AHB_WAIT) {
        0 => AhbWait::Disabled,
        _ => AhbWait::Enabled,
    }
}

pub fn set_rgb_type<R: Registers>(regs: &mut R, rgb_type: RgbType) {
    regs.write_field(Reg::VfifoRawCtrl, VfifoRawCtrl::RGB_TYPE, rgb_type.bits());
}

pub fn rgb_type<R: Registers>(regs: &R) -> Result<RgbType, Error> {
    RgbType::try_from(regs.read_field(Reg::VfifoRawCtrl, VfifoRawCtrl::RGB_TYPE))
}

pub fn set_raw_format<R: Registers>(regs: &mut R, format: RawFormat) {
    regs.write_field(Reg::VfifoRawCtrl, VfifoRawCtrl::RAW_FORMAT, format.bits());
}

pub fn raw_format<R: Registers>(regs: &R) -> Result<RawFormat, Error> {
    RawFormat::try_from(regs.read_field(Reg::VfifoRawCtrl, VfifoRawCtrl::RAW_FORMAT))
}

/// Entities currently held in the FIFO.
pub fn fifo_entity_count<R: Registers>(regs: &R) -> u32 {
    regs.read_field(Reg::VfifoSts, VfifoSts::ENTITY_COUNT)
}

/// Clear pending `mask` flags, enable them and set the FIFO level detection `mode`.
pub fn enable_int<R: Registers>(regs: &mut R, mask: VfifoFlags, mode: DetectMode) {
    clear_flags(regs, mask);
    regs.set_bits(Reg::VffIe, mask.bits());
    change_int_mode(regs, mask, mode);
}

/// Select edge or level detection for the FIFO level interrupts in `mask`.
pub fn change_int_mode<R: Registers>(regs: &mut R, mask: VfifoFlags, mode: DetectMode) {
    let edges = mask.edge_bits().bits();
    match mode {
        DetectMode::Edge => regs.set_bits(Reg::VffIe, edges),
        DetectMode::Level => regs.clear_bits(Reg::VffIe, edges),
    }
}

pub fn disable_int<R: Registers>(regs: &mut R, mask: VfifoFlags) {
    regs.clear_bits(Reg::VffIe, mask.bits());
}

pub fn flags<R: Registers>(regs: &R) -> VfifoFlags {
    VfifoFlags::from_bits_truncate(regs.read(Reg::VffIf))
}

pub fn clear_flags<R: Registers>(regs: &mut R, mask: VfifoFlags) {
    regs.write(Reg::VffIf, mask.bits());
}

/// Burst size and AHB wait that go with `trigger`. `None` for `NoTrigger`.
pub fn trigger_settings(state: &FifoState, trigger: FifoTrigger) -> Option<(u32, AhbWait)> {
    match trigger {
        FifoTrigger::NotEmpty => Some((state.bits_per_pixel >> 1, AhbWait::Enabled)),
        FifoTrigger::AboveThreshold => Some((u32::from(state.rx_threshold), AhbWait::Disabled)),
        FifoTrigger::Full => Some((FIFO_MAX_BURST, AhbWait::Disabled)),
        FifoTrigger::NoTrigger => None,
    }
}

/// Rotate the FIFO level trigger for non-DMA reads.
///
/// The current trigger hands over to the next enabled candidate in the cycle not-empty, above
/// threshold, full. If none of the others is enabled the current trigger stays. The burst size
/// and AHB wait follow the new trigger, which is then enabled with edge detection. With no
/// trigger selected the FIFO level interrupts are left off and `BadParameter` is returned.
pub fn next_fifo_trigger_mode<R: Registers>(
    regs: &mut R,
    state: &mut FifoState,
    not_empty: bool,
    above_threshold: bool,
    full: bool,
) -> Result<(), Error> {
    disable_int(regs, VfifoFlags::FIFO_LEVEL);
    change_int_mode(regs, VfifoFlags::FIFO_LEVEL, DetectMode::Level);

    let next = match state.trigger {
        FifoTrigger::NotEmpty if above_threshold => FifoTrigger::AboveThreshold,
        FifoTrigger::NotEmpty if full => FifoTrigger::Full,
        FifoTrigger::NotEmpty => FifoTrigger::NotEmpty,
        FifoTrigger::AboveThreshold if full => FifoTrigger::Full,
        FifoTrigger::AboveThreshold if not_empty => FifoTrigger::NotEmpty,
        FifoTrigger::AboveThreshold => FifoTrigger::AboveThreshold,
        FifoTrigger::Full if not_empty => FifoTrigger::NotEmpty,
        FifoTrigger::Full if above_threshold => FifoTrigger::AboveThreshold,
        FifoTrigger::Full => FifoTrigger::Full,
        FifoTrigger::NoTrigger => FifoTrigger::NoTrigger,
    };
    state.trigger = next;

    let (burst, wait) = trigger_settings(state, next).ok_or(Error::BadParameter)?;
    state.burst_size = burst;

    set_ahb_wait(regs, wait);
    enable_int(regs, next.flags(), DetectMode::Edge);
    Ok(())
}
