//! A driver for the MIPI CSI-2 camera receiver. The receiver deserializes packets from up to four
//! D-PHY data lanes into the virtual FIFO (VFIFO), and a DMA channel moves the pixel data into
//! memory line by line or a frame at a time. Assumes that the pins and clocks of the receiver are
//! set up, and the camera powered, prior to using this module.

pub mod config;
pub mod ctrl;
pub mod dma;
pub mod frame;
pub mod phy;
pub mod ppi;
pub mod regs;
pub mod vfifo;

use rtt_target::rprintln;

use crate::error::{CaptureStatus, Error};
use crate::events::CaptureCallback;
use config::{
    AhbWait, CaptureRequest, CtrlConfig, DmaGranularity, DmaMode, FifoTrigger, LaneCount,
    LaneSource, Payload0, Payload1, RawFormat, RgbType, VfifoConfig,
};
use dma::{Channel, DmaEngine};
use frame::{ByteCounts, LineCounter};
use regs::{CtrlFlags, PpiFlags, Registers, VfifoFlags};
use vfifo::FifoState;

/// Where a frame lands in memory and its geometry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImageDetails {
    pub img_addr: u32,
    /// Bytes in one frame.
    pub len: u32,
    pub width: u32,
    pub height: u32,
}

/// Settings captured by `init`, kept until the next `init`.
#[derive(Clone, Copy, Debug)]
struct Session {
    req: CaptureRequest,
    ctrl: CtrlConfig,
    vfifo: VfifoConfig,
}

/// One CSI-2 receiver with its DMA engine and completion callback.
///
/// Foreground code calls `init`, then `capture_frame_dma`. The receiver interrupt handler calls
/// `handle_interrupt` and the DMA interrupt handler calls `on_dma_complete`, see
/// `crate::shared::Shared` for handing the object to interrupt context.
pub struct Csi2<R, D, C> {
    regs: R,
    dma: D,
    callback: C,

    /// `None` until `init` runs.
    session: Option<Session>,

    counts: ByteCounts,
    lines: LineCounter,

    /// Channel acquired by `capture_frame_dma`, released by `stop` or `shutdown`.
    dma_channel: Option<Channel>,

    fifo: FifoState,
    dphy_ready: bool,
}

impl<R, D, C> Csi2<R, D, C>
where
    R: Registers,
    D: DmaEngine,
    C: CaptureCallback,
{
    pub fn new(regs: R, dma: D, callback: C) -> Self {
        Csi2 {
            regs,
            dma,
            callback,
            session: None,
            counts: ByteCounts::default(),
            lines: LineCounter::new(),
            dma_channel: None,
            fifo: FifoState::default(),
            dphy_ready: false,
        }
    }

    /// Give back the parts.
    pub fn free(self) -> (R, D, C) {
        (self.regs, self.dma, self.callback)
    }

    /// Configure the receiver for `req`. Registers programmed before a failing check keep their
    /// new values.
    pub fn init(
        &mut self,
        req: CaptureRequest,
        ctrl_cfg: CtrlConfig,
        vfifo_cfg: VfifoConfig,
    ) -> Result<(), Error> {
        self.dphy_ready = false;
        self.lines.reset();

        self.session = Some(Session {
            req,
            ctrl: ctrl_cfg,
            vfifo: vfifo_cfg,
        });
        self.counts = ByteCounts::from_request(&req)?;
        self.fifo = FifoState::new(vfifo_cfg.rx_threshold, req.bits_per_pixel_odd);

        phy::assert_reset(&mut self.regs);
        ctrl::configure(&mut self.regs, &ctrl_cfg)?;

        self.dma.init()?;

        vfifo::set_frame_size(&mut self.regs, req.pixels_per_line, req.lines_per_frame);
        vfifo::configure(&mut self.regs, &vfifo_cfg)?;
        vfifo::configure_raw_to_rgb(&mut self.regs, &req);

        rprintln!(
            "csi2: {}x{} on {} lane(s), {} bytes per frame",
            req.pixels_per_line,
            req.lines_per_frame,
            ctrl_cfg.lanes.count(),
            self.counts.frame
        );
        Ok(())
    }

    /// Stop the link, turn every receiver interrupt off and release the DMA channel.
    pub fn shutdown(&mut self) -> Result<(), Error> {
        let stopped = self.stop();

        ctrl::disable_int(&mut self.regs, CtrlFlags::all());
        vfifo::disable_int(&mut self.regs, VfifoFlags::all());
        ppi::disable_int(&mut self.regs, PpiFlags::all());

        let released = match self.dma_channel.take() {
            Some(ch) => self.dma.release_channel(ch).map_err(Error::from),
            None => Ok(()),
        };

        stopped.and(released)
    }

    /// Bring the link up on the first `lanes` data lanes.
    pub fn start(&mut self, lanes: LaneCount) {
        self.lines.reset();

        ctrl::clear_flags(&mut self.regs, CtrlFlags::all());
        ppi::clear_flags(&mut self.regs, PpiFlags::all());
        vfifo::clear_flags(&mut self.regs, VfifoFlags::all());

        vfifo::enable(&mut self.regs);
        phy::release_reset(&mut self.regs);
        phy::enable_lanes(&mut self.regs, lanes);

        self.dphy_ready = true;
        rprintln!("csi2: link up, {} data lane(s)", lanes.count());
    }

    /// Take the link down. The DMA channel is released when the VFIFO is set up for DMA; a
    /// release failure is returned after the rest of the teardown has run.
    pub fn stop(&mut self) -> Result<(), Error> {
        let uses_dma = self
            .session
            .map_or(false, |s| s.vfifo.dma_mode != DmaMode::NoDma);

        let released = match self.dma_channel {
            Some(ch) if uses_dma => {
                self.dma_channel = None;
                self.dma.release_channel(ch).map_err(Error::from)
            }
            _ => Ok(()),
        };

        vfifo::disable(&mut self.regs);
        phy::assert_reset(&mut self.regs);
        phy::disable_lanes(&mut self.regs);
        self.dphy_ready = false;

        if let Err(e) = released {
            rprintln!("csi2: releasing DMA channel failed: {:?}", e);
        }
        released
    }

    /// Capture `frame_num` frames into `img_addr` using DMA.
    pub fn capture_frame_dma(&mut self, lanes: LaneCount) -> Result<(), Error> {
        let session = self.session.ok_or(Error::BadState)?;
        let req = session.req;

        if session.vfifo.dma_mode == DmaMode::NoDma {
            return Err(Error::NotSupported);
        }
        if req.img_addr == 0 {
            return Err(Error::NullPointer);
        }

        self.counts = ByteCounts::from_request(&req)?;
        self.counts.line = self.counts.odd_line;
        let len = self.counts.transfer(session.vfifo.granularity);

        // A capture stopped by a VFIFO fault still holds its channel
        if let Some(held) = self.dma_channel.take() {
            self.dma.release_channel(held)?;
        }

        let ch = self.dma.acquire_channel()?;
        self.dma_channel = Some(ch);
        dma::start_fifo_transfer(
            &mut self.dma,
            ch,
            self.regs.fifo_address(),
            req.img_addr,
            len,
            u32::from(session.vfifo.rx_threshold),
        )?;

        ppi::enable_int(&mut self.regs, ppi::data_lane_stop_mask(lanes));

        self.start(lanes);
        Ok(())
    }

    /// Receiver interrupt handler. Reads and clears every flag group, then reports the first
    /// condition found to the callback. Returns the reported status, if any.
    pub fn handle_interrupt(&mut self) -> Option<CaptureStatus> {
        let ctrl_flags = ctrl::flags(&self.regs);
        let ppi_flags = ppi::flags(&self.regs);
        let vfifo_flags = vfifo::flags(&self.regs);

        ctrl::clear_flags(&mut self.regs, ctrl_flags);
        ppi::clear_flags(&mut self.regs, ppi_flags);
        vfifo::clear_flags(&mut self.regs, vfifo_flags);

        if ctrl_flags.contains(CtrlFlags::PKT_FIFO_OVERFLOW) {
            return Some(self.link_fault(CaptureStatus::Overrun));
        }

        if ctrl_flags.intersects(CtrlFlags::ERRORS) {
            return Some(self.link_fault(CaptureStatus::CommError));
        }

        // Data lane 0 in stop state: the frame is done
        if ppi_flags.contains(PpiFlags::DL0_STOP) {
            ppi::stop(&mut self.regs);
            self.report(CaptureStatus::Success);
            ppi::clear_flags(&mut self.regs, ppi_flags);
            return Some(CaptureStatus::Success);
        }

        let fault = if vfifo_flags.contains(VfifoFlags::UNDERRUN) {
            Some(CaptureStatus::Underrun)
        } else if vfifo_flags.intersects(VfifoFlags::OVERRUN | VfifoFlags::RAW_OVERRUN) {
            Some(CaptureStatus::Overrun)
        } else if vfifo_flags.contains(VfifoFlags::AHB_TIMEOUT) {
            Some(CaptureStatus::TimeOut)
        } else if vfifo_flags.intersects(VfifoFlags::ERRORS) {
            Some(CaptureStatus::CommError)
        } else {
            None
        };

        if let Some(status) = fault {
            rprintln!("csi2: VFIFO fault {:?}, flags {:#x}", status, vfifo_flags.bits());
            self.report(status);
            vfifo::disable(&mut self.regs);
            return Some(status);
        }

        if vfifo_flags.contains(VfifoFlags::FRAME_END) {
            self.lines.frame_end_seen();
        }
        vfifo::clear_flags(&mut self.regs, vfifo_flags);

        None
    }

    /// DMA count-to-zero handler. Re-arms the channel for the next line or frame until
    /// `frame_num` frames are in, then turns the VFIFO off.
    pub fn on_dma_complete(&mut self) {
        let (ch, session) = match (self.dma_channel, self.session) {
            (Some(ch), Some(session)) => (ch, session),
            _ => return,
        };
        let req = session.req;
        let granularity = session.vfifo.granularity;

        self.dma.clear_count_to_zero(ch);

        match granularity {
            DmaGranularity::PerLine => self.lines.line_done(req.lines_per_frame),
            DmaGranularity::WholeFrame => self.lines.frame_done(req.lines_per_frame),
        }

        if self.lines.frame_end() < req.frame_num {
            let count = match granularity {
                DmaGranularity::WholeFrame => self.counts.frame,
                DmaGranularity::PerLine => self.counts.line_for(self.lines.line()),
            };
            self.dma.reload_count(ch, count);
            self.dma.enable_channel(ch);
        } else {
            vfifo::disable(&mut self.regs);
        }
    }

    fn link_fault(&mut self, status: CaptureStatus) -> CaptureStatus {
        rprintln!("csi2: link fault {:?}", status);
        self.report(status);
        // Already in interrupt context, a failed release has been logged by `stop`
        let _ = self.stop();
        status
    }

    fn report(&mut self, status: CaptureStatus) {
        if let Some(session) = &self.session {
            self.callback.capture_done(&session.req, status);
        }
    }

    /// Select the FIFO level that starts non-DMA reads and the burst size that goes with it.
    /// Interrupts and AHB wait are only programmed by `next_fifo_trigger_mode`, which rotates
    /// from here.
    pub fn set_fifo_trigger(&mut self, trigger: FifoTrigger) {
        self.fifo.trigger = trigger;
        self.fifo.burst_size = vfifo::trigger_settings(&self.fifo, trigger).map_or(0, |(b, _)| b);
    }

    /// Move to the next enabled FIFO level trigger, see `vfifo::next_fifo_trigger_mode`.
    pub fn next_fifo_trigger_mode(
        &mut self,
        not_empty: bool,
        above_threshold: bool,
        full: bool,
    ) -> Result<(), Error> {
        vfifo::next_fifo_trigger_mode(
            &mut self.regs,
            &mut self.fifo,
            not_empty,
            above_threshold,
            full,
        )?;
        let wait = vfifo::ahb_wait(&self.regs);
        if let Some(session) = &mut self.session {
            session.vfifo.ahb_wait = wait;
        }
        Ok(())
    }

    pub fn fifo_trigger(&self) -> FifoTrigger {
        self.fifo.trigger
    }

    /// Entities to read per FIFO trigger.
    pub fn fifo_burst_size(&self) -> u32 {
        self.fifo.burst_size
    }

    pub fn set_lane_ctrl_source(&mut self, src: &LaneSource) {
        phy::set_lane_source(&mut self.regs, src);
        if let Some(session) = &mut self.session {
            session.ctrl.lane_source = *src;
        }
    }

    pub fn lane_ctrl_source(&self) -> Result<LaneSource, Error> {
        phy::lane_source(&self.regs)
    }

    pub fn set_payload_types(
        &mut self,
        payload0: Payload0,
        payload1: Payload1,
    ) -> Result<(), Error> {
        ctrl::set_payload_types(&mut self.regs, payload0, payload1)?;
        if let Some(session) = &mut self.session {
            session.ctrl.payload0 = payload0;
            session.ctrl.payload1 = payload1;
        }
        Ok(())
    }

    pub fn payload_types(&self) -> (Payload0, Payload1) {
        ctrl::payload_types(&self.regs)
    }

    pub fn set_dma_mode(&mut self, mode: DmaMode) {
        vfifo::set_dma_mode(&mut self.regs, mode);
        if let Some(session) = &mut self.session {
            session.vfifo.dma_mode = mode;
        }
    }

    pub fn dma_mode(&self) -> Result<DmaMode, Error> {
        vfifo::dma_mode(&self.regs)
    }

    pub fn set_ahb_wait(&mut self, wait: AhbWait) {
        vfifo::set_ahb_wait(&mut self.regs, wait);
        if let Some(session) = &mut self.session {
            session.vfifo.ahb_wait = wait;
        }
    }

    pub fn ahb_wait(&self) -> AhbWait {
        vfifo::ahb_wait(&self.regs)
    }

    pub fn set_rgb_type(&mut self, rgb_type: RgbType) {
        vfifo::set_rgb_type(&mut self.regs, rgb_type);
    }

    pub fn rgb_type(&self) -> Result<RgbType, Error> {
        vfifo::rgb_type(&self.regs)
    }

    pub fn set_raw_format(&mut self, format: RawFormat) {
        vfifo::set_raw_format(&mut self.regs, format);
    }

    pub fn raw_format(&self) -> Result<RawFormat, Error> {
        vfifo::raw_format(&self.regs)
    }

    pub fn fifo_entity_count(&self) -> u32 {
        vfifo::fifo_entity_count(&self.regs)
    }

    /// The request passed to the last `init`.
    pub fn request(&self) -> Option<&CaptureRequest> {
        self.session.as_ref().map(|s| &s.req)
    }

    pub fn ctrl_config(&self) -> Option<&CtrlConfig> {
        self.session.as_ref().map(|s| &s.ctrl)
    }

    pub fn vfifo_config(&self) -> Option<&VfifoConfig> {
        self.session.as_ref().map(|s| &s.vfifo)
    }

    pub fn dma_channel(&self) -> Option<Channel> {
        self.dma_channel
    }

    pub fn current_line_count(&self) -> u32 {
        self.lines.line()
    }

    pub fn frame_end_count(&self) -> u32 {
        self.lines.frame_end()
    }

    pub fn is_dphy_ready(&self) -> bool {
        self.dphy_ready
    }

    /// `None` before `init`.
    pub fn image_details(&self) -> Option<ImageDetails> {
        self.session.map(|s| ImageDetails {
            img_addr: s.req.img_addr,
            len: self.counts.frame,
            width: s.req.pixels_per_line,
            height: s.req.lines_per_frame,
        })
    }

    /// Register access for the flag and interrupt helpers in `ctrl`, `ppi` and `vfifo`.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }
}
