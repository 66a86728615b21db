//! D-PHY reset, lane enables and lane routing.

use core::convert::TryFrom;

use super::config::{LaneCount, LaneSource, PhyLane};
use super::regs::{Reg, Registers, LINK_ENABLE};
use crate::error::Error;

/// Hold the D-PHY in reset.
pub fn assert_reset<R: Registers>(regs: &mut R) {
    regs.write(Reg::DphyRstN, 0);
}

/// Take the D-PHY out of reset.
pub fn release_reset<R: Registers>(regs: &mut R) {
    regs.set_bits(Reg::DphyRstN, 1);
}

/// Enable the clock lane, the first `lanes` data lanes and the link.
pub fn enable_lanes<R: Registers>(regs: &mut R, lanes: LaneCount) {
    regs.write(Reg::CfgClkLaneEn, 1);
    regs.write(Reg::CfgDataLaneEn, lanes.mask());
    regs.write(Reg::XcfgiDw0b, LINK_ENABLE);
}

pub fn disable_lanes<R: Registers>(regs: &mut R) {
    regs.write(Reg::CfgClkLaneEn, 0);
    regs.write(Reg::CfgDataLaneEn, 0);
}

/// Route physical lanes to the logical data lanes and the clock lane.
pub fn set_lane_source<R: Registers>(regs: &mut R, src: &LaneSource) {
    regs.write(Reg::CfgD0SwapSel, src.d0.bits());
    regs.write(Reg::CfgD1SwapSel, src.d1.bits());
    regs.write(Reg::CfgD2SwapSel, src.d2.bits());
    regs.write(Reg::CfgD3SwapSel, src.d3.bits());
    regs.write(Reg::CfgC0SwapSel, src.c0.bits());
}

/// Read back the lane routing. `BadState` if a select register holds an unknown lane.
pub fn lane_source<R: Registers>(regs: &R) -> Result<LaneSource, Error> {
    Ok(LaneSource {
        d0: PhyLane::try_from(regs.read(Reg::CfgD0SwapSel))?,
        d1: PhyLane::try_from(regs.read(Reg::CfgD1SwapSel))?,
        d2: PhyLane::try_from(regs.read(Reg::CfgD2SwapSel))?,
        d3: PhyLane::try_from(regs.read(Reg::CfgD3SwapSel))?,
        c0: PhyLane::try_from(regs.read(Reg::CfgC0SwapSel))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csi2::regs::fake::FakeRegisters;

    #[test]
    fn lanes_are_enabled_from_lane_zero() {
        let mut regs = FakeRegisters::new();
        enable_lanes(&mut regs, LaneCount::Three);
        assert_eq!(regs.get(Reg::CfgClkLaneEn), 1);
        assert_eq!(regs.get(Reg::CfgDataLaneEn), 0b0111);
        assert_eq!(regs.get(Reg::XcfgiDw0b), LINK_ENABLE);

        disable_lanes(&mut regs);
        assert_eq!(regs.get(Reg::CfgClkLaneEn), 0);
        assert_eq!(regs.get(Reg::CfgDataLaneEn), 0);
    }

    #[test]
    fn reset_release_sets_only_bit_zero() {
        let mut regs = FakeRegisters::new();
        assert_reset(&mut regs);
        assert_eq!(regs.get(Reg::DphyRstN), 0);
        release_reset(&mut regs);
        assert_eq!(regs.get(Reg::DphyRstN), 1);
    }

    #[test]
    fn swapped_lanes_read_back() {
        let mut regs = FakeRegisters::new();
        let src = LaneSource {
            d0: PhyLane::D1,
            d1: PhyLane::D0,
            ..LaneSource::default()
        };
        set_lane_source(&mut regs, &src);
        assert_eq!(lane_source(&regs), Ok(src));

        regs.write(Reg::CfgC0SwapSel, 6);
        assert_eq!(lane_source(&regs), Err(Error::BadState));
    }
}
