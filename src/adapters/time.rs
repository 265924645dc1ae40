use time::OffsetDateTime;

use crate::ports;

#[derive(Debug, Clone, Copy, Default)]
pub struct UtcTimeProvider;

impl ports::time::TimeProvider for UtcTimeProvider {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
