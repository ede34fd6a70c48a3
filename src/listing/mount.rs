//! Guards async results against views that have already been torn down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Held by the owning view. Dropping it marks every [`MountToken`] stale.
#[derive(Debug)]
pub struct Mount {
    alive: Arc<AtomicBool>,
}

/// Cheap handle passed into async work to check whether results are still
/// wanted.
#[derive(Debug, Clone)]
pub struct MountToken {
    alive: Arc<AtomicBool>,
}

impl Mount {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn token(&self) -> MountToken {
        MountToken {
            alive: Arc::clone(&self.alive),
        }
    }

    pub fn unmount(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl MountToken {
    pub fn is_mounted(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_unmounts_tokens() {
        let mount = Mount::new();
        let token = mount.token();
        assert!(token.is_mounted());
        drop(mount);
        assert!(!token.is_mounted());
    }
}
