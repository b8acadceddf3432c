use domain::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        time::OffsetDateTime::now_utc()
    }
}

/// 手动推进的时钟（用于测试）
pub mod manual {
    use std::sync::Mutex;

    use super::*;

    pub struct ManualClock {
        now: Mutex<Timestamp>,
    }

    impl ManualClock {
        pub fn new(start: Timestamp) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        pub fn advance(&self, by: time::Duration) {
            let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Timestamp {
            *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }
}
