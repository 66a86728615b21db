//! Register access for the CSI-2 receiver.
//!
//! Everything above this module talks to the hardware through the `Registers` trait, so the
//! protocol logic can run against `Mmio` on the part or against a fake register file on the host.
//! Interrupt flag registers (`*If`) are write-1-to-clear.

use bitflags::bitflags;
use vcell::VolatileCell;

/// Depth of the VFIFO in entities. The RX threshold must stay below this.
pub const FIFO_DEPTH: u8 = 64;

/// Largest burst the VFIFO can serve when full.
pub const FIFO_MAX_BURST: u32 = 64;

/// Value the link needs in `XcfgiDw0b` before it will pass data.
pub const LINK_ENABLE: u32 = 0x1000_0000;

/// Receiver registers, named after what they control.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reg {
    CfgNumLanes,
    CfgClkLaneEn,
    CfgDataLaneEn,
    CfgFlushCount,
    CfgDisablePayload0,
    CfgDisablePayload1,
    DphyRstN,
    AonPowerReadyN,
    RxByteClkHsInv,
    CfgD0SwapSel,
    CfgD1SwapSel,
    CfgD2SwapSel,
    CfgD3SwapSel,
    CfgC0SwapSel,
    XcfgiDw0b,
    VfifoCfg0,
    VfifoCfg1,
    VfifoCtrl,
    VfifoSts,
    VfifoLineNum,
    VfifoPixelNum,
    VfifoRawCtrl,
    VfifoRawBuf0Addr,
    VfifoRawBuf1Addr,
    VffIe,
    VffIf,
    CtrlIe,
    CtrlIf,
    PpiIe,
    PpiIf,
}

/// Number of entries in `Reg`.
pub const REG_COUNT: usize = Reg::PpiIf as usize + 1;

impl Reg {
    /// Interrupt flag registers clear the bits written as 1 and ignore 0s.
    pub fn is_w1c(self) -> bool {
        matches!(self, Reg::VffIf | Reg::CtrlIf | Reg::PpiIf)
    }
}

/// A multi-bit field inside a register.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Field {
    pos: u32,
    width: u32,
}

impl Field {
    pub const fn new(pos: u32, width: u32) -> Self {
        Field { pos, width }
    }

    pub const fn mask(self) -> u32 {
        (((1u64 << self.width) - 1) as u32) << self.pos
    }

    /// Replace the field in `reg` with `value`, truncating `value` to the field width.
    pub const fn insert(self, reg: u32, value: u32) -> u32 {
        (reg & !self.mask()) | ((value << self.pos) & self.mask())
    }

    pub const fn extract(self, reg: u32) -> u32 {
        (reg & self.mask()) >> self.pos
    }
}

/// `VfifoCfg0` fields.
pub struct VfifoCfg0;

impl VfifoCfg0 {
    pub const FIFO_READ_MODE: Field = Field::new(0, 1);
    pub const ERROR_DETECT: Field = Field::new(1, 1);
    pub const FULL_BANDWIDTH: Field = Field::new(3, 1);
    pub const DMA_MODE: Field = Field::new(4, 2);
    pub const VIRTUAL_CHANNEL: Field = Field::new(8, 2);
    pub const AHB_WAIT: Field = Field::new(15, 1);
}

/// `VfifoCfg1` fields.
pub struct VfifoCfg1;

impl VfifoCfg1 {
    pub const FLOW_CONTROL: Field = Field::new(0, 1);
    pub const AHB_WAIT_CYCLES: Field = Field::new(16, 10);
}

/// `VfifoCtrl` fields.
pub struct VfifoCtrl;

impl VfifoCtrl {
    pub const FIFO_EN: Field = Field::new(0, 1);
    pub const THRESHOLD: Field = Field::new(16, 6);
}

/// `VfifoSts` fields.
pub struct VfifoSts;

impl VfifoSts {
    pub const ENTITY_COUNT: Field = Field::new(16, 8);
}

/// `VfifoRawCtrl` fields.
pub struct VfifoRawCtrl;

impl VfifoRawCtrl {
    pub const CONVERT_EN: Field = Field::new(0, 1);
    pub const AUTO_FLUSH: Field = Field::new(1, 1);
    pub const RAW_FORMAT: Field = Field::new(2, 2);
    pub const RGB_TYPE: Field = Field::new(8, 3);
}

bitflags! {
    /// RX controller (protocol level) interrupt flags, shared by `CtrlIe` and `CtrlIf`.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct CtrlFlags: u32 {
        const ECC1 = 1 << 0;
        const ECC2 = 1 << 1;
        const CRC = 1 << 2;
        const ID = 1 << 3;
        const PKT_FIFO_OVERFLOW = 1 << 4;

        const ERRORS = Self::ECC1.bits() | Self::ECC2.bits() | Self::CRC.bits() | Self::ID.bits();
    }
}

bitflags! {
    /// VFIFO interrupt flags and, in `VffIe`, the FIFO level detection mode bits.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct VfifoFlags: u32 {
        const NOT_EMPTY = 1 << 0;
        const ABOVE_THRESHOLD = 1 << 1;
        const FULL = 1 << 2;
        const UNDERRUN = 1 << 4;
        const OVERRUN = 1 << 5;
        const OUT_OF_SYNC = 1 << 6;
        const FORMAT_ERROR = 1 << 7;
        const AHB_TIMEOUT = 1 << 8;
        const RAW_OVERRUN = 1 << 9;
        const RAW_AHB_ERROR = 1 << 10;
        const FRAME_START = 1 << 11;
        const FRAME_END = 1 << 12;

        // Edge (set) or level (clear) detection for the FIFO level interrupts, `VffIe` only
        const NOT_EMPTY_EDGE = 1 << 16;
        const ABOVE_THRESHOLD_EDGE = 1 << 17;
        const FULL_EDGE = 1 << 18;

        const FIFO_LEVEL =
            Self::NOT_EMPTY.bits() | Self::ABOVE_THRESHOLD.bits() | Self::FULL.bits();
        const ERRORS =
            Self::OUT_OF_SYNC.bits() | Self::FORMAT_ERROR.bits() | Self::RAW_AHB_ERROR.bits();
    }
}

impl VfifoFlags {
    /// Distance between a FIFO level flag and its detection mode bit.
    pub const EDGE_SHIFT: u32 = 16;

    /// Detection mode bits matching the FIFO level flags in `self`.
    pub fn edge_bits(self) -> VfifoFlags {
        VfifoFlags::from_bits_truncate((self & VfifoFlags::FIFO_LEVEL).bits() << Self::EDGE_SHIFT)
    }
}

bitflags! {
    /// PPI interrupt flags, shared by `PpiIe` and `PpiIf`.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct PpiFlags: u32 {
        const CLOCK_STOP = 1 << 0;
        const DL0_STOP = 1 << 4;
        const DL1_STOP = 1 << 5;
        const DL2_STOP = 1 << 6;
        const DL3_STOP = 1 << 7;
    }
}

impl PpiFlags {
    /// Bit position of `DL0_STOP`, data lane N sits at `STOP_STATE_POS + N`.
    pub const STOP_STATE_POS: u32 = 4;
}

/// Register level access to one receiver instance.
pub trait Registers {
    fn read(&self, reg: Reg) -> u32;

    fn write(&mut self, reg: Reg, value: u32);

    /// Bus address of the VFIFO data port, used as the DMA source.
    fn fifo_address(&self) -> u32;

    fn modify<F: FnOnce(u32) -> u32>(&mut self, reg: Reg, f: F) {
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    fn set_bits(&mut self, reg: Reg, bits: u32) {
        self.modify(reg, |v| v | bits);
    }

    fn clear_bits(&mut self, reg: Reg, bits: u32) {
        self.modify(reg, |v| v & !bits);
    }

    fn write_field(&mut self, reg: Reg, field: Field, value: u32) {
        self.modify(reg, |v| field.insert(v, value));
    }

    fn read_field(&self, reg: Reg, field: Field) -> u32 {
        field.extract(self.read(reg))
    }
}

/// Memory mapped receiver register block.
#[repr(C)]
pub struct RegisterBlock {
    cfg_num_lanes: VolatileCell<u32>,
    cfg_clk_lane_en: VolatileCell<u32>,
    cfg_data_lane_en: VolatileCell<u32>,
    cfg_flush_count: VolatileCell<u32>,
    cfg_disable_payload_0: VolatileCell<u32>,
    cfg_disable_payload_1: VolatileCell<u32>,
    _reserved0: [u32; 10],
    dphy_rst_n: VolatileCell<u32>,
    aon_power_ready_n: VolatileCell<u32>,
    rxbyteclkhs_inv: VolatileCell<u32>,
    cfg_d0_swap_sel: VolatileCell<u32>,
    cfg_d1_swap_sel: VolatileCell<u32>,
    cfg_d2_swap_sel: VolatileCell<u32>,
    cfg_d3_swap_sel: VolatileCell<u32>,
    cfg_c0_swap_sel: VolatileCell<u32>,
    xcfgi_dw0b: VolatileCell<u32>,
    _reserved1: [u32; 39],
    vfifo_cfg0: VolatileCell<u32>,
    vfifo_cfg1: VolatileCell<u32>,
    vfifo_ctrl: VolatileCell<u32>,
    vfifo_sts: VolatileCell<u32>,
    vfifo_line_num: VolatileCell<u32>,
    vfifo_pixel_num: VolatileCell<u32>,
    vfifo_raw_ctrl: VolatileCell<u32>,
    vfifo_raw_buf0_addr: VolatileCell<u32>,
    vfifo_raw_buf1_addr: VolatileCell<u32>,
    _reserved2: [u32; 55],
    rx_eint_vff_ie: VolatileCell<u32>,
    rx_eint_vff_if: VolatileCell<u32>,
    rx_eint_ctrl_ie: VolatileCell<u32>,
    rx_eint_ctrl_if: VolatileCell<u32>,
    rx_eint_ppi_ie: VolatileCell<u32>,
    rx_eint_ppi_if: VolatileCell<u32>,
}

/// `Registers` over the real peripheral.
pub struct Mmio {
    block: &'static RegisterBlock,
    fifo: u32,
}

impl Mmio {
    /// Bind to the register block at `base` with its VFIFO data port at `fifo`.
    ///
    /// # Safety
    /// `base` must be the address of a CSI-2 receiver register block, and nothing else may hold
    /// an `Mmio` for the same block.
    pub unsafe fn new(base: usize, fifo: u32) -> Self {
        Mmio {
            block: &*(base as *const RegisterBlock),
            fifo,
        }
    }

    fn cell(&self, reg: Reg) -> &VolatileCell<u32> {
        let b = self.block;
        match reg {
            Reg::CfgNumLanes => &b.cfg_num_lanes,
            Reg::CfgClkLaneEn => &b.cfg_clk_lane_en,
            Reg::CfgDataLaneEn => &b.cfg_data_lane_en,
            Reg::CfgFlushCount => &b.cfg_flush_count,
            Reg::CfgDisablePayload0 => &b.cfg_disable_payload_0,
            Reg::CfgDisablePayload1 => &b.cfg_disable_payload_1,
            Reg::DphyRstN => &b.dphy_rst_n,
            Reg::AonPowerReadyN => &b.aon_power_ready_n,
            Reg::RxByteClkHsInv => &b.rxbyteclkhs_inv,
            Reg::CfgD0SwapSel => &b.cfg_d0_swap_sel,
            Reg::CfgD1SwapSel => &b.cfg_d1_swap_sel,
            Reg::CfgD2SwapSel => &b.cfg_d2_swap_sel,
            Reg::CfgD3SwapSel => &b.cfg_d3_swap_sel,
            Reg::CfgC0SwapSel => &b.cfg_c0_swap_sel,
            Reg::XcfgiDw0b => &b.xcfgi_dw0b,
            Reg::VfifoCfg0 => &b.vfifo_cfg0,
            Reg::VfifoCfg1 => &b.vfifo_cfg1,
            Reg::VfifoCtrl => &b.vfifo_ctrl,
            Reg::VfifoSts => &b.vfifo_sts,
            Reg::VfifoLineNum => &b.vfifo_line_num,
            Reg::VfifoPixelNum => &b.vfifo_pixel_num,
            Reg::VfifoRawCtrl => &b.vfifo_raw_ctrl,
            Reg::VfifoRawBuf0Addr => &b.vfifo_raw_buf0_addr,
            Reg::VfifoRawBuf1Addr => &b.vfifo_raw_buf1_addr,
            Reg::VffIe => &b.rx_eint_vff_ie,
            Reg::VffIf => &b.rx_eint_vff_if,
            Reg::CtrlIe => &b.rx_eint_ctrl_ie,
            Reg::CtrlIf => &b.rx_eint_ctrl_if,
            Reg::PpiIe => &b.rx_eint_ppi_ie,
            Reg::PpiIf => &b.rx_eint_ppi_if,
        }
    }
}

// `new` hands out exclusive access to the block
unsafe impl Send for Mmio {}

impl Registers for Mmio {
    fn read(&self, reg: Reg) -> u32 {
        self.cell(reg).get()
    }

    fn write(&mut self, reg: Reg, value: u32) {
        self.cell(reg).set(value)
    }

    fn fifo_address(&self) -> u32 {
        self.fifo
    }
}
