//! Hardware statistics counters.
//!
//! Snapshots of the controller's RMON/IEEE counter block. Counters are free
//! running and only reset by [`Enet::clear_statistics`] or [`Enet::init`].

use super::enet::Enet;
use super::error::Result;
use crate::internal::register::RegisterAccess;
use crate::internal::register::enet::{mibc, stat};

/// Drop-related counters reported by [`Enet::drop_counts`], in order.
pub const DROP_COUNTERS: [usize; 8] = [
    stat::IEEE_R_DROP,
    stat::IEEE_R_MACERR,
    stat::IEEE_R_CRC,
    stat::IEEE_R_ALIGN,
    stat::RMON_R_UNDERSIZE,
    stat::RMON_R_OVERSIZE,
    stat::RMON_R_FRAG,
    stat::RMON_R_JAB,
];

/// Per-category drop and error counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterValues {
    /// Frames dropped for lack of receive resources
    pub drop_resources: u32,
    /// Receive FIFO overflows
    pub fifo_overflow: u32,
    /// Frames with a CRC error
    pub crc_errors: u32,
    /// Frames with an alignment error
    pub alignment_errors: u32,
    /// Frames shorter than 64 bytes with a bad CRC
    pub fragments: u32,
    /// Frames longer than the maximum with a bad CRC
    pub jabbers: u32,
    /// Frames sent after one collision
    pub single_collisions: u32,
    /// Frames sent after more than one collision
    pub multiple_collisions: u32,
    /// Frames sent after a deferral
    pub deferred: u32,
    /// Late collisions
    pub late_collisions: u32,
    /// Frames aborted after excessive collisions
    pub excessive_collisions: u32,
}

/// RFC 2819 receive statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStats {
    /// etherStatsDropEvents
    pub drop_events: u32,
    /// etherStatsOctets
    pub octets: u32,
    /// etherStatsPkts
    pub packets: u32,
    /// etherStatsBroadcastPkts
    pub broadcast: u32,
    /// etherStatsMulticastPkts
    pub multicast: u32,
    /// etherStatsCRCAlignErrors
    pub crc_align_errors: u32,
    /// etherStatsUndersizePkts
    pub undersize: u32,
    /// etherStatsOversizePkts
    pub oversize: u32,
    /// etherStatsFragments
    pub fragments: u32,
    /// etherStatsJabbers
    pub jabbers: u32,
    /// etherStatsPkts64Octets
    pub pkts_64: u32,
    /// etherStatsPkts65to127Octets
    pub pkts_65_to_127: u32,
    /// etherStatsPkts128to255Octets
    pub pkts_128_to_255: u32,
    /// etherStatsPkts256to511Octets
    pub pkts_256_to_511: u32,
    /// etherStatsPkts512to1023Octets
    pub pkts_512_to_1023: u32,
    /// etherStatsPkts1024to1518Octets
    pub pkts_1024_to_1518: u32,
}

/// RFC 2819 transmit statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxStats {
    /// Frames not counted correctly
    pub drop_events: u32,
    /// etherStatsOctets
    pub octets: u32,
    /// etherStatsPkts
    pub packets: u32,
    /// etherStatsBroadcastPkts
    pub broadcast: u32,
    /// etherStatsMulticastPkts
    pub multicast: u32,
    /// etherStatsCollisions
    pub collisions: u32,
}

/// Transmit error counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxErrorCounters {
    /// Transmit FIFO underruns
    pub underruns: u32,
    /// Carrier sense errors
    pub carrier_sense: u32,
    /// SQE test errors
    pub sqe: u32,
    /// Late collisions
    pub late_collisions: u32,
    /// Excessive collisions
    pub excessive_collisions: u32,
}

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Fill `out` with the counters listed in [`DROP_COUNTERS`].
    ///
    /// Returns how many entries were written, which is the shorter of the
    /// two lengths.
    pub fn drop_counts(&self, out: &mut [u32]) -> Result<usize> {
        self.ensure_initialized()?;
        let count = out.len().min(DROP_COUNTERS.len());
        for (slot, offset) in out.iter_mut().zip(DROP_COUNTERS) {
            *slot = self.regs.counter(offset);
        }
        Ok(count)
    }

    /// Per-category drop and error counters
    pub fn counter_values(&self) -> Result<CounterValues> {
        self.ensure_initialized()?;
        let read = |offset| self.regs.counter(offset);
        Ok(CounterValues {
            drop_resources: read(stat::IEEE_R_DROP),
            fifo_overflow: read(stat::IEEE_R_MACERR),
            crc_errors: read(stat::IEEE_R_CRC),
            alignment_errors: read(stat::IEEE_R_ALIGN),
            fragments: read(stat::RMON_R_FRAG),
            jabbers: read(stat::RMON_R_JAB),
            single_collisions: read(stat::IEEE_T_1COL),
            multiple_collisions: read(stat::IEEE_T_MCOL),
            deferred: read(stat::IEEE_T_DEF),
            late_collisions: read(stat::IEEE_T_LCOL),
            excessive_collisions: read(stat::IEEE_T_EXCOL),
        })
    }

    /// Receive statistics
    pub fn rx_stats(&self) -> Result<RxStats> {
        self.ensure_initialized()?;
        let read = |offset| self.regs.counter(offset);
        Ok(RxStats {
            drop_events: read(stat::IEEE_R_DROP),
            octets: read(stat::RMON_R_OCTETS),
            packets: read(stat::RMON_R_PACKETS),
            broadcast: read(stat::RMON_R_BC_PKT),
            multicast: read(stat::RMON_R_MC_PKT),
            crc_align_errors: read(stat::RMON_R_CRC_ALIGN),
            undersize: read(stat::RMON_R_UNDERSIZE),
            oversize: read(stat::RMON_R_OVERSIZE),
            fragments: read(stat::RMON_R_FRAG),
            jabbers: read(stat::RMON_R_JAB),
            pkts_64: read(stat::RMON_R_P64),
            pkts_65_to_127: read(stat::RMON_R_P65TO127),
            pkts_128_to_255: read(stat::RMON_R_P128TO255),
            pkts_256_to_511: read(stat::RMON_R_P256TO511),
            pkts_512_to_1023: read(stat::RMON_R_P512TO1023),
            pkts_1024_to_1518: read(stat::RMON_R_P1024TO2047),
        })
    }

    /// Transmit statistics
    pub fn tx_stats(&self) -> Result<TxStats> {
        self.ensure_initialized()?;
        let read = |offset| self.regs.counter(offset);
        Ok(TxStats {
            drop_events: read(stat::IEEE_T_DROP),
            octets: read(stat::RMON_T_OCTETS),
            packets: read(stat::RMON_T_PACKETS),
            broadcast: read(stat::RMON_T_BC_PKT),
            multicast: read(stat::RMON_T_MC_PKT),
            collisions: read(stat::RMON_T_COL),
        })
    }

    /// Transmit error counters
    pub fn tx_error_counters(&self) -> Result<TxErrorCounters> {
        self.ensure_initialized()?;
        let read = |offset| self.regs.counter(offset);
        Ok(TxErrorCounters {
            underruns: read(stat::IEEE_T_MACERR),
            carrier_sense: read(stat::IEEE_T_CSERR),
            sqe: read(stat::IEEE_T_SQE),
            late_collisions: read(stat::IEEE_T_LCOL),
            excessive_collisions: read(stat::IEEE_T_EXCOL),
        })
    }

    /// Zero every statistics counter
    pub fn clear_statistics(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.regs.set_mibc(mibc::MIB_DIS | mibc::MIB_CLEAR);
        self.regs.set_mibc(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::EnetConfig;
    use crate::driver::error::ConfigError;
    use crate::testing::{MockDelay, MockRegisters};

    type TestEnet<'a> = Enet<&'a MockRegisters, 4, 4, 256>;

    fn initialized(mock: &MockRegisters) -> TestEnet<'_> {
        let mut enet = Enet::new(mock);
        enet.init(EnetConfig::new(), MockDelay::new()).unwrap();
        enet
    }

    #[test]
    fn statistics_require_init() {
        let mock = MockRegisters::new();
        let enet: TestEnet<'_> = Enet::new(&mock);
        assert_eq!(enet.rx_stats(), Err(ConfigError::NotInitialized.into()));
    }

    #[test]
    fn drop_counts_fill_bounded_list() {
        let mock = MockRegisters::new();
        let enet = initialized(&mock);
        mock.set(stat::IEEE_R_DROP, 4);
        mock.set(stat::IEEE_R_MACERR, 5);
        mock.set(stat::IEEE_R_CRC, 6);

        let mut short = [0u32; 3];
        assert_eq!(enet.drop_counts(&mut short), Ok(3));
        assert_eq!(short, [4, 5, 6]);

        let mut long = [u32::MAX; 10];
        assert_eq!(enet.drop_counts(&mut long), Ok(DROP_COUNTERS.len()));
        assert_eq!(long[3], 0);
        assert_eq!(long[9], u32::MAX);
    }

    #[test]
    fn rx_stats_read_rmon_block() {
        let mock = MockRegisters::new();
        let enet = initialized(&mock);
        mock.set(stat::RMON_R_PACKETS, 100);
        mock.set(stat::RMON_R_OCTETS, 6400);
        mock.set(stat::RMON_R_BC_PKT, 7);
        mock.set(stat::RMON_R_P64, 90);

        let stats = enet.rx_stats().unwrap();
        assert_eq!(stats.packets, 100);
        assert_eq!(stats.octets, 6400);
        assert_eq!(stats.broadcast, 7);
        assert_eq!(stats.pkts_64, 90);
        assert_eq!(stats.multicast, 0);
    }

    #[test]
    fn tx_counters_read_ieee_block() {
        let mock = MockRegisters::new();
        let enet = initialized(&mock);
        mock.set(stat::RMON_T_PACKETS, 12);
        mock.set(stat::IEEE_T_LCOL, 2);
        mock.set(stat::IEEE_T_MACERR, 1);

        assert_eq!(enet.tx_stats().unwrap().packets, 12);
        let errors = enet.tx_error_counters().unwrap();
        assert_eq!(errors.late_collisions, 2);
        assert_eq!(errors.underruns, 1);
        assert_eq!(enet.counter_values().unwrap().late_collisions, 2);
    }

    #[test]
    fn clear_statistics_zeroes_counters() {
        let mock = MockRegisters::new();
        let mut enet = initialized(&mock);
        mock.set(stat::IEEE_R_CRC, 9);
        enet.clear_statistics().unwrap();
        assert_eq!(enet.counter_values().unwrap(), CounterValues::default());
    }
}
