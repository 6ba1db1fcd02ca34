//! Process-wide host setup

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{debug, warn};

static HOST: OnceLock<HostInfo> = OnceLock::new();

/// What the host offers, discovered once per process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostInfo {
    /// GPIO character devices present at startup
    pub gpio_chips: Vec<PathBuf>,
}

impl HostInfo {
    /// Check if `path` was among the GPIO chips found at startup
    pub fn has_gpio_chip(&self, path: &Path) -> bool {
        self.gpio_chips.iter().any(|chip| chip == path)
    }
}

/// One-time host initialization
///
/// Safe to call any number of times from any thread; only the first call
/// does work. Call before opening a session.
pub fn init() -> &'static HostInfo {
    HOST.get_or_init(discover)
}

fn discover() -> HostInfo {
    let gpio_chips = match gpio_cdev::chips() {
        Ok(chips) => chips
            .filter_map(|chip| chip.ok())
            .map(|chip| chip.path().to_path_buf())
            .collect(),
        Err(e) => {
            warn!(error = %e, "cannot enumerate gpio chips");
            Vec::new()
        }
    };
    debug!(chips = ?gpio_chips, "host initialized");
    HostInfo { gpio_chips }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_init_is_idempotent() {
        let first = init() as *const HostInfo;
        let second = init() as *const HostInfo;
        assert_eq!(first, second);
    }

    #[test]
    fn test_init_from_many_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| init() as *const HostInfo as usize))
            .collect();
        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_has_gpio_chip() {
        let info = HostInfo {
            gpio_chips: vec![PathBuf::from("/dev/gpiochip0")],
        };
        assert!(info.has_gpio_chip(Path::new("/dev/gpiochip0")));
        assert!(!info.has_gpio_chip(Path::new("/dev/gpiochip1")));
    }
}
