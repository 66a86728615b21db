//! PPI monitor: stop state interrupts of the clock and data lanes.

use super::config::LaneCount;
use super::regs::{PpiFlags, Reg, Registers};

/// Stop state flags of the first `lanes` data lanes.
pub fn data_lane_stop_mask(lanes: LaneCount) -> PpiFlags {
    PpiFlags::from_bits_truncate(lanes.mask() << PpiFlags::STOP_STATE_POS)
}

/// Clear pending `mask` flags, then enable them.
pub fn enable_int<R: Registers>(regs: &mut R, mask: PpiFlags) {
    clear_flags(regs, mask);
    regs.set_bits(Reg::PpiIe, mask.bits());
}

pub fn disable_int<R: Registers>(regs: &mut R, mask: PpiFlags) {
    regs.clear_bits(Reg::PpiIe, mask.bits());
}

pub fn flags<R: Registers>(regs: &R) -> PpiFlags {
    PpiFlags::from_bits_truncate(regs.read(Reg::PpiIf))
}

pub fn clear_flags<R: Registers>(regs: &mut R, mask: PpiFlags) {
    regs.write(Reg::PpiIf, mask.bits());
}

/// Stop monitoring, every PPI interrupt off.
pub fn stop<R: Registers>(regs: &mut R) {
    disable_int(regs, PpiFlags::all());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csi2::regs::fake::FakeRegisters;

    #[test]
    fn stop_mask_covers_active_lanes_only() {
        assert_eq!(data_lane_stop_mask(LaneCount::One), PpiFlags::DL0_STOP);
        assert_eq!(
            data_lane_stop_mask(LaneCount::Two),
            PpiFlags::DL0_STOP | PpiFlags::DL1_STOP
        );
        assert!(!data_lane_stop_mask(LaneCount::Four).contains(PpiFlags::CLOCK_STOP));
    }

    #[test]
    fn stop_disables_every_source() {
        let mut regs = FakeRegisters::new();
        enable_int(&mut regs, PpiFlags::CLOCK_STOP | PpiFlags::DL2_STOP);
        assert_ne!(regs.get(Reg::PpiIe), 0);
        stop(&mut regs);
        assert_eq!(regs.get(Reg::PpiIe), 0);
    }
}
