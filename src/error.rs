//! Error and status types shared by the receiver and its collaborators.

/// Synchronous driver errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A configuration value is out of range.
    BadParameter,
    /// A required address was zero.
    NullPointer,
    /// The requested mode is not implemented by this driver.
    NotSupported,
    /// The operation needs a session set up by `init`, or hardware holds an encoding this driver
    /// does not know.
    BadState,
    /// The DMA collaborator failed for a reason other than a bad parameter.
    Dma(DmaError),
}

/// DMA collaborator errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DmaError {
    /// Channel, burst or transfer parameters were rejected.
    BadParameter,
    /// No free channel left.
    NoChannel,
    /// The channel is still running.
    Busy,
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        match e {
            DmaError::BadParameter => Error::BadParameter,
            other => Error::Dma(other),
        }
    }
}

/// Result of a capture, as reported to the `CaptureCallback` from interrupt context.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaptureStatus {
    /// The link went to stop state, the frame is in memory.
    Success,
    /// Packet FIFO, VFIFO or RAW FIFO overflow.
    Overrun,
    /// CRC, ECC, packet ID, sync, format or RAW AHB error.
    CommError,
    /// VFIFO read while empty.
    Underrun,
    /// AHB wait timeout.
    TimeOut,
}

impl CaptureStatus {
    /// `true` for every status except `Success`.
    pub fn is_fault(self) -> bool {
        self != CaptureStatus::Success
    }
}
