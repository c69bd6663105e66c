//! Win32 input and focus queries.

use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

use super::{GAME_WINDOW_TITLE, InputState, VirtualKey, WindowFocus, title_matches};

/// Asynchronous key state of the physical keyboard and mouse
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncKeyboard;

impl InputState for AsyncKeyboard {
    fn is_key_down(&self, key: VirtualKey) -> bool {
        // SAFETY: GetAsyncKeyState has no preconditions.
        let state = unsafe { GetAsyncKeyState(i32::from(key.code())) };
        (state as u16) & 0x8000 != 0
    }
}

/// Matches the foreground window's title against a target title
#[derive(Debug, Clone)]
pub struct ForegroundWindow {
    title: String,
}

impl ForegroundWindow {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Default for ForegroundWindow {
    fn default() -> Self {
        Self::new(GAME_WINDOW_TITLE)
    }
}

impl WindowFocus for ForegroundWindow {
    fn is_target_window_active(&self) -> bool {
        // SAFETY: GetForegroundWindow is always safe to call.
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            return false;
        }

        let mut buffer = [0u16; 256];
        // SAFETY: the buffer outlives the call and its length is passed along.
        let len = unsafe { GetWindowTextW(hwnd, &mut buffer) };
        if len <= 0 {
            return false;
        }

        title_matches(&String::from_utf16_lossy(&buffer[..len as usize]), &self.title)
    }
}
