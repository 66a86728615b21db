//! MIPI CSI-2 camera receiver driver.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod csi2;
pub mod error;
pub mod events;
pub mod shared;

pub use csi2::config::{CaptureRequest, CtrlConfig, LaneCount, VfifoConfig};
pub use csi2::dma::DmaEngine;
pub use csi2::regs::{Mmio, Registers};
pub use csi2::Csi2;
pub use error::{CaptureStatus, DmaError, Error};
pub use events::{CaptureCallback, CaptureEvent, EventSink};
pub use shared::{Shared, SharedCsi2};
