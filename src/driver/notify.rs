//! Upper-layer and diagnostic callbacks.
//!
//! The driver never owns its consumers. Entry points that can produce
//! notifications take them as `&mut impl EthIf` / `&mut impl DiagnosticMonitor`.

use super::config::Mode;
use crate::internal::ptp::TimeStamp;

/// A received frame handed to [`EthIf::rx_indication`].
///
/// Borrowed from the receive ring; the descriptors are re-armed after the
/// callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxFrame<'a> {
    /// EtherType from the frame header
    pub ether_type: u16,
    /// Destination was the broadcast address
    pub is_broadcast: bool,
    /// Destination address
    pub destination: [u8; 6],
    /// Source address
    pub source: [u8; 6],
    /// Bytes following the 14-byte header
    pub payload: &'a [u8],
    /// Ingress timestamp, when timestamping is enabled
    pub timestamp: Option<TimeStamp>,
}

/// Network interface layer above the driver.
pub trait EthIf {
    /// A frame passed every receive check.
    fn rx_indication(&mut self, ctrl: u8, frame: &RxFrame<'_>);

    /// A frame sent with confirmation requested has left the controller.
    fn tx_confirmation(&mut self, ctrl: u8, buf_idx: usize);

    /// The controller run mode changed.
    fn ctrl_mode_indication(&mut self, ctrl: u8, mode: Mode);
}

/// Hardware conditions reported to the diagnostic monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagnosticEvent {
    /// Controller did not respond (reset or management bus timeout)
    Access,
    /// Frames dropped for lack of receive buffers
    RxFramesLost,
    /// Frames received with a CRC error
    Crc,
    /// Frames shorter than the minimum length
    Undersize,
    /// Frames longer than the maximum length
    Oversize,
    /// Frames with an alignment error
    Alignment,
    /// Frames sent after exactly one collision
    SingleCollision,
    /// Frames sent after more than one collision
    MultipleCollision,
    /// Collisions past the slot time
    LateCollision,
}

impl DiagnosticEvent {
    /// Every event, in reporting order
    pub const ALL: [DiagnosticEvent; 9] = [
        DiagnosticEvent::Access,
        DiagnosticEvent::RxFramesLost,
        DiagnosticEvent::Crc,
        DiagnosticEvent::Undersize,
        DiagnosticEvent::Oversize,
        DiagnosticEvent::Alignment,
        DiagnosticEvent::SingleCollision,
        DiagnosticEvent::MultipleCollision,
        DiagnosticEvent::LateCollision,
    ];
}

/// Level reported for a [`DiagnosticEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagnosticStatus {
    /// Condition not present
    Passed,
    /// Condition present
    Failed,
}

impl DiagnosticStatus {
    /// `Failed` if `failed`, `Passed` otherwise
    #[inline(always)]
    pub const fn from_failed(failed: bool) -> Self {
        if failed { Self::Failed } else { Self::Passed }
    }
}

/// Sink for diagnostic reports.
pub trait DiagnosticMonitor {
    /// Report the current level of `event`.
    fn report_diagnostic(&mut self, ctrl: u8, event: DiagnosticEvent, status: DiagnosticStatus);
}

/// Discards every report.
impl DiagnosticMonitor for () {
    fn report_diagnostic(&mut self, _ctrl: u8, _event: DiagnosticEvent, _status: DiagnosticStatus) {}
}
