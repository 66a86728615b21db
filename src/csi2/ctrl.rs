//! RX controller: lane count, payload filtering, flush count and protocol error interrupts.

use super::config::{CtrlConfig, Payload0, Payload1, PpiClock};
use super::phy;
use super::regs::{CtrlFlags, Reg, Registers};
use crate::error::Error;

/// Largest accepted flush count.
pub const MAX_FLUSH_COUNT: u8 = 15;

/// Apply `cfg`. Registers written before a validation failure keep their new values.
pub fn configure<R: Registers>(regs: &mut R, cfg: &CtrlConfig) -> Result<(), Error> {
    // Power up the D-PHY
    regs.clear_bits(Reg::AonPowerReadyN, 1);

    let inverted = match cfg.ppi_clock {
        PpiClock::Normal => 0,
        PpiClock::Inverted => 1,
    };
    regs.write(Reg::RxByteClkHsInv, inverted);

    regs.write(Reg::CfgNumLanes, cfg.lanes.count());

    set_payload_types(regs, cfg.payload0, cfg.payload1)?;

    if cfg.flush_count > MAX_FLUSH_COUNT {
        return Err(Error::BadParameter);
    }
    regs.write(Reg::CfgFlushCount, u32::from(cfg.flush_count));

    phy::set_lane_source(regs, &cfg.lane_source);

    Ok(())
}

/// Program the disabled payload types. At least one type must stay enabled.
pub fn set_payload_types<R: Registers>(
    regs: &mut R,
    payload0: Payload0,
    payload1: Payload1,
) -> Result<(), Error> {
    if payload0.is_all() && payload1.is_all() {
        return Err(Error::BadParameter);
    }

    regs.write(Reg::CfgDisablePayload0, payload0.bits());
    regs.write(Reg::CfgDisablePayload1, payload1.bits());
    Ok(())
}

pub fn payload_types<R: Registers>(regs: &R) -> (Payload0, Payload1) {
    (
        Payload0::from_bits_truncate(regs.read(Reg::CfgDisablePayload0)),
        Payload1::from_bits_truncate(regs.read(Reg::CfgDisablePayload1)),
    )
}

/// Clear pending `mask` flags, then enable them.
pub fn enable_int<R: Registers>(regs: &mut R, mask: CtrlFlags) {
    clear_flags(regs, mask);
    regs.set_bits(Reg::CtrlIe, mask.bits());
}

pub fn disable_int<R: Registers>(regs: &mut R, mask: CtrlFlags) {
    regs.clear_bits(Reg::CtrlIe, mask.bits());
}

pub fn flags<R: Registers>(regs: &R) -> CtrlFlags {
    CtrlFlags::from_bits_truncate(regs.read(Reg::CtrlIf))
}

pub fn clear_flags<R: Registers>(regs: &mut R, mask: CtrlFlags) {
    regs.write(Reg::CtrlIf, mask.bits());
}
