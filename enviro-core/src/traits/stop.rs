//! Stop requests from the loop's owner

use core::sync::atomic::{AtomicBool, Ordering};

/// Polled by the acquisition loop between frames
pub trait StopSignal {
    /// True once the owner wants the loop to return
    fn should_stop(&self) -> bool;
}

impl StopSignal for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: StopSignal + ?Sized> StopSignal for &T {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

/// Never asks the loop to stop
#[derive(Debug, Clone, Copy, Default)]
pub struct RunForever;

impl StopSignal for RunForever {
    fn should_stop(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_flag() {
        let flag = AtomicBool::new(false);
        assert!(!flag.should_stop());
        flag.store(true, Ordering::Release);
        assert!((&flag).should_stop());
    }

    #[test]
    fn test_run_forever() {
        assert!(!RunForever.should_stop());
    }
}
