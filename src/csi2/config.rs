//! Capture request and configuration types for the receiver.

use core::convert::TryFrom;

use bitflags::bitflags;

use super::regs::VfifoFlags;
use crate::error::Error;

/// Polarity of the PPI high speed byte clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PpiClock {
    Normal,
    Inverted,
}

/// Number of active data lanes. Lanes are always used from lane 0 upwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LaneCount {
    One,
    Two,
    Three,
    Four,
}

impl LaneCount {
    pub fn count(self) -> u32 {
        match self {
            LaneCount::One => 1,
            LaneCount::Two => 2,
            LaneCount::Three => 3,
            LaneCount::Four => 4,
        }
    }

    /// One bit per active data lane, starting at bit 0.
    pub fn mask(self) -> u32 {
        (1 << self.count()) - 1
    }
}

bitflags! {
    /// Payload data types disabled in the first payload group. A set bit drops that type.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Payload0: u32 {
        const NULL = 1 << 0;
        const BLANK = 1 << 1;
        const EMBEDDED = 1 << 2;
        const YUV420_8 = 1 << 3;
        const YUV420_10 = 1 << 4;
        const YUV420_8_LEGACY = 1 << 5;
        const YUV422_8 = 1 << 6;
        const YUV422_10 = 1 << 7;
        const RGB444 = 1 << 8;
        const RGB555 = 1 << 9;
        const RGB565 = 1 << 10;
        const RGB666 = 1 << 11;
        const RGB888 = 1 << 12;
        const RAW6 = 1 << 13;
        const RAW7 = 1 << 14;
        const RAW8 = 1 << 15;
        const RAW10 = 1 << 16;
        const RAW12 = 1 << 17;
        const RAW14 = 1 << 18;
    }
}

bitflags! {
    /// Payload data types disabled in the second (user defined) payload group.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Payload1: u32 {
        const USER_DEFINED_1 = 1 << 0;
        const USER_DEFINED_2 = 1 << 1;
        const USER_DEFINED_3 = 1 << 2;
        const USER_DEFINED_4 = 1 << 3;
        const USER_DEFINED_5 = 1 << 4;
        const USER_DEFINED_6 = 1 << 5;
        const USER_DEFINED_7 = 1 << 6;
        const USER_DEFINED_8 = 1 << 7;
    }
}

/// Physical lane feeding a logical lane.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PhyLane {
    D0,
    D1,
    D2,
    D3,
    C0,
}

impl PhyLane {
    pub fn bits(self) -> u32 {
        match self {
            PhyLane::D0 => 0,
            PhyLane::D1 => 1,
            PhyLane::D2 => 2,
            PhyLane::D3 => 3,
            PhyLane::C0 => 4,
        }
    }
}

impl TryFrom<u32> for PhyLane {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self, Error> {
        match bits {
            0 => Ok(PhyLane::D0),
            1 => Ok(PhyLane::D1),
            2 => Ok(PhyLane::D2),
            3 => Ok(PhyLane::D3),
            4 => Ok(PhyLane::C0),
            _ => Err(Error::BadState),
        }
    }
}

/// Lane routing: which physical lane drives each logical data lane and the clock lane.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LaneSource {
    pub d0: PhyLane,
    pub d1: PhyLane,
    pub d2: PhyLane,
    pub d3: PhyLane,
    pub c0: PhyLane,
}

impl Default for LaneSource {
    fn default() -> Self {
        LaneSource {
            d0: PhyLane::D0,
            d1: PhyLane::D1,
            d2: PhyLane::D2,
            d3: PhyLane::D3,
            c0: PhyLane::C0,
        }
    }
}

/// RX controller and D-PHY link configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CtrlConfig {
    pub ppi_clock: PpiClock,
    pub lanes: LaneCount,
    pub payload0: Payload0,
    pub payload1: Payload1,
    /// Must be 0 to 15.
    pub flush_count: u8,
    pub lane_source: LaneSource,
}

impl Default for CtrlConfig {
    /// Single lane, RAW8 only.
    fn default() -> Self {
        CtrlConfig {
            ppi_clock: PpiClock::Normal,
            lanes: LaneCount::One,
            payload0: Payload0::all() - Payload0::RAW8,
            payload1: Payload1::all(),
            flush_count: 3,
            lane_source: LaneSource::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlowControl {
    Disabled,
    Enabled,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AhbWait {
    Disabled,
    Enabled,
}

/// How much data one DMA transfer moves.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DmaGranularity {
    PerLine,
    WholeFrame,
}

/// When the VFIFO raises DMA requests.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DmaMode {
    NoDma,
    SendRequest,
    FifoAboveThreshold,
    FifoFull,
}

impl DmaMode {
    pub fn bits(self) -> u32 {
        match self {
            DmaMode::NoDma => 0,
            DmaMode::SendRequest => 1,
            DmaMode::FifoAboveThreshold => 2,
            DmaMode::FifoFull => 3,
        }
    }
}

impl TryFrom<u32> for DmaMode {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self, Error> {
        match bits {
            0 => Ok(DmaMode::NoDma),
            1 => Ok(DmaMode::SendRequest),
            2 => Ok(DmaMode::FifoAboveThreshold),
            3 => Ok(DmaMode::FifoFull),
            _ => Err(Error::BadParameter),
        }
    }
}

/// VFIFO read addressing: entity by entity, or direct addressing of each entity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FifoReadMode {
    OneByOne,
    DirectAddress,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorDetection {
    Disabled,
    Enabled,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BandwidthMode {
    Normal,
    Full,
}

/// Virtual FIFO configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VfifoConfig {
    pub flow_control: FlowControl,
    /// AHB wait cycles, truncated to 10 bits.
    pub wait_cycles: u16,
    pub ahb_wait: AhbWait,
    /// Must be 0 to 3.
    pub virtual_channel: u8,
    pub granularity: DmaGranularity,
    pub dma_mode: DmaMode,
    pub fifo_read_mode: FifoReadMode,
    pub error_detection: ErrorDetection,
    pub bandwidth: BandwidthMode,
    /// Must be below `FIFO_DEPTH`. Also used as the DMA burst size.
    pub rx_threshold: u8,
}

impl Default for VfifoConfig {
    fn default() -> Self {
        VfifoConfig {
            flow_control: FlowControl::Disabled,
            wait_cycles: 0,
            ahb_wait: AhbWait::Disabled,
            virtual_channel: 0,
            granularity: DmaGranularity::PerLine,
            dma_mode: DmaMode::FifoAboveThreshold,
            fifo_read_mode: FifoReadMode::OneByOne,
            error_detection: ErrorDetection::Enabled,
            bandwidth: BandwidthMode::Normal,
            rx_threshold: 16,
        }
    }
}

/// Target encoding of the RAW to RGB converter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RgbType {
    Rgb444,
    Rgb555,
    Rgb565,
    Rgb666,
    Rgb888,
}

impl RgbType {
    pub fn bits(self) -> u32 {
        match self {
            RgbType::Rgb444 => 0,
            RgbType::Rgb555 => 1,
            RgbType::Rgb565 => 2,
            RgbType::Rgb666 => 3,
            RgbType::Rgb888 => 4,
        }
    }
}

impl TryFrom<u32> for RgbType {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self, Error> {
        match bits {
            0 => Ok(RgbType::Rgb444),
            1 => Ok(RgbType::Rgb555),
            2 => Ok(RgbType::Rgb565),
            3 => Ok(RgbType::Rgb666),
            4 => Ok(RgbType::Rgb888),
            _ => Err(Error::BadParameter),
        }
    }
}

/// Bayer pattern of the sensor, first row then second row.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RawFormat {
    RgrgGbgb,
    GrgrBgbg,
    GbgbRgrg,
    BgbgGrgr,
}

impl RawFormat {
    pub fn bits(self) -> u32 {
        match self {
            RawFormat::RgrgGbgb => 0,
            RawFormat::GrgrBgbg => 1,
            RawFormat::GbgbRgrg => 2,
            RawFormat::BgbgGrgr => 3,
        }
    }
}

impl TryFrom<u32> for RawFormat {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self, Error> {
        match bits {
            0 => Ok(RawFormat::RgrgGbgb),
            1 => Ok(RawFormat::GrgrBgbg),
            2 => Ok(RawFormat::GbgbRgrg),
            3 => Ok(RawFormat::BgbgGrgr),
            _ => Err(Error::BadParameter),
        }
    }
}

/// RAW to RGB conversion settings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawToRgb {
    pub rgb_type: RgbType,
    pub raw_format: RawFormat,
    /// Flush the RAW FIFO automatically when it overflows.
    pub auto_flush: bool,
}

/// FIFO level that raises the VFIFO interrupt when reading without DMA.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FifoTrigger {
    NoTrigger,
    NotEmpty,
    AboveThreshold,
    Full,
}

impl FifoTrigger {
    pub fn flags(self) -> VfifoFlags {
        match self {
            FifoTrigger::NoTrigger => VfifoFlags::empty(),
            FifoTrigger::NotEmpty => VfifoFlags::NOT_EMPTY,
            FifoTrigger::AboveThreshold => VfifoFlags::ABOVE_THRESHOLD,
            FifoTrigger::Full => VfifoFlags::FULL,
        }
    }
}

/// One capture session: where the pixels go and what they look like.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CaptureRequest {
    /// Destination of the pixel data.
    pub img_addr: u32,
    pub raw_buf0_addr: u32,
    pub raw_buf1_addr: u32,
    pub pixels_per_line: u32,
    pub lines_per_frame: u32,
    /// Odd lines are expected to be no wider than even lines.
    pub bits_per_pixel_odd: u32,
    pub bits_per_pixel_even: u32,
    /// Frames to capture before the VFIFO is switched off.
    pub frame_num: u32,
    pub raw_to_rgb: Option<RawToRgb>,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        CaptureRequest {
            img_addr: 0,
            raw_buf0_addr: 0,
            raw_buf1_addr: 0,
            pixels_per_line: 0,
            lines_per_frame: 0,
            bits_per_pixel_odd: 8,
            bits_per_pixel_even: 8,
            frame_num: 1,
            raw_to_rgb: None,
        }
    }
}
