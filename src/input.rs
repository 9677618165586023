//! Keyboard events as seen by the demos.

use sdl2::{event::Event, keyboard::Keycode};

/// What happened to a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    /// Auto-repeat while the key is held down.
    Repeat,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Keycode,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn new(key: Keycode, action: KeyAction) -> Self {
        Self { key, action }
    }

    /// Returns `Some(key)` when this event is the release of a key.
    ///
    /// Demo toggles act on releases only, so a held key flips them once.
    pub fn released(&self) -> Option<Keycode> {
        (self.action == KeyAction::Release).then_some(self.key)
    }

    /// Extracts the key event carried by an SDL event, if any.
    pub fn from_sdl(event: &Event) -> Option<Self> {
        match *event {
            Event::KeyDown {
                keycode: Some(key),
                repeat,
                ..
            } => Some(Self::new(
                key,
                if repeat {
                    KeyAction::Repeat
                } else {
                    KeyAction::Press
                },
            )),
            Event::KeyUp {
                keycode: Some(key), ..
            } => Some(Self::new(key, KeyAction::Release)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use sdl2::keyboard::Mod;

    use super::*;

    fn key_down(key: Keycode, repeat: bool) -> Event {
        Event::KeyDown {
            timestamp: 0,
            window_id: 0,
            keycode: Some(key),
            scancode: None,
            keymod: Mod::NOMOD,
            repeat,
        }
    }

    #[test]
    fn test_from_sdl() {
        assert_eq!(
            KeyEvent::from_sdl(&key_down(Keycode::D, false)),
            Some(KeyEvent::new(Keycode::D, KeyAction::Press))
        );
        assert_eq!(
            KeyEvent::from_sdl(&key_down(Keycode::D, true)),
            Some(KeyEvent::new(Keycode::D, KeyAction::Repeat))
        );
        let up = Event::KeyUp {
            timestamp: 0,
            window_id: 0,
            keycode: Some(Keycode::Up),
            scancode: None,
            keymod: Mod::NOMOD,
            repeat: false,
        };
        assert_eq!(
            KeyEvent::from_sdl(&up),
            Some(KeyEvent::new(Keycode::Up, KeyAction::Release))
        );
        assert_eq!(KeyEvent::from_sdl(&Event::Quit { timestamp: 0 }), None);
    }

    #[test]
    fn test_released() {
        assert_eq!(
            KeyEvent::new(Keycode::Escape, KeyAction::Release).released(),
            Some(Keycode::Escape)
        );
        assert_eq!(KeyEvent::new(Keycode::Escape, KeyAction::Press).released(), None);
        assert_eq!(KeyEvent::new(Keycode::Escape, KeyAction::Repeat).released(), None);
    }
}
