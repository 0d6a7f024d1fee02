//! Run summary counters

/// Counters kept by a single dispatcher run loop
///
/// Owned by the loop itself, so plain integers suffice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events read from the source
    pub cycles: u64,
    /// Sink calls issued (including re-sends)
    pub deliveries: u64,
    /// Deliveries accepted
    pub accepted: u64,
    /// Deliveries rejected
    pub rejected: u64,
    /// Backoff delays started
    pub backoffs: u64,
    /// Source reads that returned an error
    pub source_faults: u64,
    /// Sink calls that returned an error
    pub sink_faults: u64,
}
