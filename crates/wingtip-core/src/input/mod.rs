//! Input and focus queries consumed by the feature loops.

mod keys;
#[cfg(target_os = "windows")]
mod windows;

use std::sync::Arc;

pub use keys::VirtualKey;
#[cfg(target_os = "windows")]
pub use windows::{AsyncKeyboard, ForegroundWindow};

/// Window title the focus check looks for
pub const GAME_WINDOW_TITLE: &str = "Counter-Strike 2";

pub trait InputState: Send + Sync {
    fn is_key_down(&self, key: VirtualKey) -> bool;
}

pub trait WindowFocus: Send + Sync {
    /// Whether the target window currently has foreground focus
    fn is_target_window_active(&self) -> bool;
}

impl<T: InputState + ?Sized> InputState for Arc<T> {
    fn is_key_down(&self, key: VirtualKey) -> bool {
        (**self).is_key_down(key)
    }
}

impl<T: WindowFocus + ?Sized> WindowFocus for Arc<T> {
    fn is_target_window_active(&self) -> bool {
        (**self).is_target_window_active()
    }
}

/// Whether a window title names the target: case-insensitive substring match
pub fn title_matches(window_title: &str, target: &str) -> bool {
    window_title.to_lowercase().contains(&target.to_lowercase())
}

/// Focus source that is always (or never) active
#[derive(Debug, Clone, Copy)]
pub struct FixedFocus(pub bool);

impl WindowFocus for FixedFocus {
    fn is_target_window_active(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::{InputState, VirtualKey, WindowFocus};

    #[derive(Default)]
    pub struct MockInput {
        pressed: Mutex<HashSet<VirtualKey>>,
    }

    impl MockInput {
        pub fn press(&self, key: VirtualKey) {
            self.pressed.lock().unwrap().insert(key);
        }

        pub fn release(&self, key: VirtualKey) {
            self.pressed.lock().unwrap().remove(&key);
        }
    }

    impl InputState for MockInput {
        fn is_key_down(&self, key: VirtualKey) -> bool {
            self.pressed.lock().unwrap().contains(&key)
        }
    }

    pub struct MockFocus(pub AtomicBool);

    impl MockFocus {
        pub fn new(active: bool) -> Self {
            Self(AtomicBool::new(active))
        }

        pub fn set(&self, active: bool) {
            self.0.store(active, Ordering::SeqCst);
        }
    }

    impl WindowFocus for MockFocus {
        fn is_target_window_active(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }
}
