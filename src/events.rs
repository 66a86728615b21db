//! Capture completion reporting.
//!
//! The receiver reports each capture result from interrupt context through `CaptureCallback`.
//! `EventSink` turns those reports into `CaptureEvent`s on a heapless SPSC queue so the main
//! loop can pick them up without sharing the receiver.

use heapless::spsc::Producer;

use crate::csi2::config::CaptureRequest;
use crate::error::CaptureStatus;

/// Receives capture results. Called from interrupt context, must not block.
pub trait CaptureCallback {
    fn capture_done(&mut self, req: &CaptureRequest, status: CaptureStatus);
}

/// No reporting, results are only returned by `Csi2::handle_interrupt`.
impl CaptureCallback for () {
    fn capture_done(&mut self, _req: &CaptureRequest, _status: CaptureStatus) {}
}

impl<T: CaptureCallback> CaptureCallback for &mut T {
    fn capture_done(&mut self, req: &CaptureRequest, status: CaptureStatus) {
        (**self).capture_done(req, status)
    }
}

/// One capture result as queued by `EventSink`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CaptureEvent {
    /// Where the frame was written.
    pub img_addr: u32,
    pub status: CaptureStatus,
}

/// Queues capture results for the main loop.
pub struct EventSink<'a, const N: usize> {
    producer: Producer<'a, CaptureEvent, N>,

    /// Events lost because the queue was full. Increases forever.
    dropped: u32,
}

impl<'a, const N: usize> EventSink<'a, N> {
    pub fn new(producer: Producer<'a, CaptureEvent, N>) -> Self {
        EventSink {
            producer,
            dropped: 0,
        }
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<'a, const N: usize> CaptureCallback for EventSink<'a, N> {
    fn capture_done(&mut self, req: &CaptureRequest, status: CaptureStatus) {
        let event = CaptureEvent {
            img_addr: req.img_addr,
            status,
        };
        if self.producer.enqueue(event).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::spsc::Queue;

    fn req() -> CaptureRequest {
        CaptureRequest {
            img_addr: 0xc000_0000,
            ..CaptureRequest::default()
        }
    }

    #[test]
    fn events_reach_the_consumer_in_order() {
        let mut queue: Queue<CaptureEvent, 4> = Queue::new();
        let (producer, mut consumer) = queue.split();
        let mut sink = EventSink::new(producer);

        sink.capture_done(&req(), CaptureStatus::Overrun);
        sink.capture_done(&req(), CaptureStatus::Success);

        assert_eq!(
            consumer.dequeue(),
            Some(CaptureEvent {
                img_addr: 0xc000_0000,
                status: CaptureStatus::Overrun
            })
        );
        assert_eq!(consumer.dequeue().map(|e| e.status), Some(CaptureStatus::Success));
        assert_eq!(consumer.dequeue(), None);
    }

    #[test]
    fn full_queue_counts_dropped_events() {
        // A heapless queue of N slots holds N - 1 items
        let mut queue: Queue<CaptureEvent, 2> = Queue::new();
        let (producer, _consumer) = queue.split();
        let mut sink = EventSink::new(producer);

        sink.capture_done(&req(), CaptureStatus::Success);
        sink.capture_done(&req(), CaptureStatus::TimeOut);
        sink.capture_done(&req(), CaptureStatus::Underrun);
        assert_eq!(sink.dropped(), 2);
    }

    #[test]
    fn unit_callback_ignores_results() {
        let mut cb = ();
        cb.capture_done(&req(), CaptureStatus::CommError);
    }
}
