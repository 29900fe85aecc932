/// Flash phase, stateless in elapsed time.
///
/// On below the half-period, off above, modulo twice the half-period. Because
/// the output is a pure function of `elapsed` rather than of an internal
/// toggle, the pattern self-corrects after any stall in the loop.
pub fn flash_is_on(elapsed_ms: u64, half_period_ms: u64) -> bool {
    elapsed_ms % (half_period_ms * 2) < half_period_ms
}
