/// Monotonic time plus an awaitable delay.
///
/// The firmware backs this with `embassy_time`; host tests use a fake that
/// advances instantly and records every sleep.
pub trait Clock {
    fn now_ms(&self) -> u64;

    async fn sleep_ms(&mut self, ms: u64);
}
