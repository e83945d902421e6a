use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tui_input::{backend::crossterm::EventHandler, Input, InputRequest};

/// What a key press did to the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerEvent {
    /// The submit keystroke was pressed; the caller should submit the buffer.
    Submit,
    Edited,
    Ignored,
}

/// The message input buffer.
#[derive(Default)]
pub struct Composer {
    input: Input,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates outgoing text: trims it and rejects it if nothing is left.
    pub fn accept(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn cursor(&self) -> usize {
        self.input.cursor()
    }

    pub fn set_value(&mut self, text: &str) {
        self.input = Input::new(text.to_string());
    }

    pub fn clear(&mut self) {
        self.input.reset();
    }

    /// Enter alone submits, Shift+Enter or Alt+Enter inserts a line break,
    /// anything else edits.
    ///
    /// Terminals without keyboard enhancement report Shift+Enter as a bare
    /// Enter, so Alt+Enter is the line break that always reaches us.
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerEvent {
        let line_break = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
        match key.code {
            KeyCode::Enter if line_break => {
                self.input.handle(InputRequest::InsertChar('\n'));
                ComposerEvent::Edited
            }
            KeyCode::Enter => ComposerEvent::Submit,
            _ => match self.input.handle_event(&Event::Key(key)) {
                Some(_) => ComposerEvent::Edited,
                None => ComposerEvent::Ignored,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_accept_trims() {
        assert_eq!(Composer::accept("  Hello \n"), Some("Hello".to_string()));
        assert_eq!(Composer::accept("   "), None);
        assert_eq!(Composer::accept(""), None);
        assert_eq!(Composer::accept("\t\n"), None);
    }

    #[test]
    fn test_typing_edits_buffer() {
        let mut composer = Composer::new();
        assert_eq!(composer.handle_key(press(KeyCode::Char('h'))), ComposerEvent::Edited);
        assert_eq!(composer.handle_key(press(KeyCode::Char('i'))), ComposerEvent::Edited);
        assert_eq!(composer.value(), "hi");
        assert_eq!(composer.cursor(), 2);
    }

    #[test]
    fn test_enter_requests_submit() {
        let mut composer = Composer::new();
        composer.set_value("hello");
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ComposerEvent::Submit);
        // The composer leaves clearing to whoever actually sends the text
        assert_eq!(composer.value(), "hello");
    }

    #[test]
    fn test_shift_enter_inserts_line_break() {
        let mut composer = Composer::new();
        composer.set_value("line one");
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(composer.handle_key(key), ComposerEvent::Edited);
        assert_eq!(composer.value(), "line one\n");
    }

    #[test]
    fn test_alt_enter_inserts_line_break() {
        let mut composer = Composer::new();
        composer.set_value("first");
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert_eq!(composer.handle_key(key), ComposerEvent::Edited);
        composer.handle_key(press(KeyCode::Char('x')));
        assert_eq!(composer.value(), "first\nx");
    }

    #[test]
    fn test_clear() {
        let mut composer = Composer::new();
        composer.set_value("  hey ");
        composer.clear();
        assert_eq!(composer.value(), "");
        assert_eq!(composer.cursor(), 0);
    }
}
