#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    BaseUrl,
    ApiKey,
}

impl Field {
    pub fn toggle(self) -> Self {
        match self {
            Field::BaseUrl => Field::ApiKey,
            Field::ApiKey => Field::BaseUrl,
        }
    }
}

/// Single-line text buffer, edited at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub buffer: String,
}

impl InputState {
    pub fn new(value: &str) -> Self {
        Self {
            buffer: value.to_string(),
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if !c.is_control() {
            self.buffer.push(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn set(&mut self, value: &str) {
        self.buffer.clear();
        self.buffer.push_str(value);
    }

    pub fn masked(&self) -> String {
        "*".repeat(self.buffer.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_the_end() {
        let mut input = InputState::new("https://a.tes");
        input.handle_char('t');
        assert_eq!(input.buffer, "https://a.test");
        input.handle_backspace();
        input.handle_backspace();
        assert_eq!(input.buffer, "https://a.te");
    }

    #[test]
    fn ignores_control_characters() {
        let mut input = InputState::default();
        input.handle_char('\u{7}');
        input.handle_char('k');
        assert_eq!(input.buffer, "k");
    }

    #[test]
    fn masks_by_character_count() {
        assert_eq!(InputState::new("sk-é1").masked(), "*****");
        assert_eq!(InputState::default().masked(), "");
    }

    #[test]
    fn toggle_switches_between_fields() {
        assert_eq!(Field::BaseUrl.toggle(), Field::ApiKey);
        assert_eq!(Field::ApiKey.toggle(), Field::BaseUrl);
    }
}
