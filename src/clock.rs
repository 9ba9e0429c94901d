use crate::time::FormatTime;
use arc_swap::ArcSwap;
use permit::Permit;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Process-wide `Date:` header line, refreshed once per second by a
/// background thread.
///
/// Readers get a complete immutable snapshot via [`DateClock::current`].
/// The snapshot may lag the wall clock by up to one refresh interval.
/// That staleness is acceptable for the `Date` response header.
#[derive(Clone)]
pub struct DateClock(Arc<ArcSwap<String>>);
impl DateClock {
    /// Makes a clock and starts its refresh thread.
    ///
    /// The thread stops when `permit` is revoked.
    #[must_use]
    pub fn start(permit: Permit) -> Self {
        let clock = Self(Arc::new(ArcSwap::from_pointee(Self::date_line())));
        let shared = Arc::clone(&clock.0);
        std::thread::spawn(move || {
            while !permit.is_revoked() {
                shared.store(Arc::new(Self::date_line()));
                // Sleep in short slices so revocation is noticed promptly.
                for _ in 0..10 {
                    if permit.is_revoked() {
                        return;
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        });
        clock
    }

    /// Makes a clock that always returns `line` and never refreshes.
    /// This is useful for testing.
    #[must_use]
    pub fn fixed(line: impl Into<String>) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(line.into())))
    }

    /// Returns the current `Date: ...` line.
    /// The returned value never changes; a later call may return a newer one.
    #[must_use]
    pub fn current(&self) -> Arc<String> {
        self.0.load_full()
    }

    fn date_line() -> String {
        format!("Date: {}", SystemTime::now().rfc1123_utc())
    }
}
