pub struct Keybinds;

impl Default for Keybinds {
    fn default() -> Self {
        Self
    }
}

impl Keybinds {
    pub fn footer(&self, has_choices: bool) -> &'static str {
        if has_choices {
            "[Tab] field  [↑/↓] endpoint  [Enter] save  [Ctrl+D] dismiss error  [Esc] cancel"
        } else {
            "[Tab] field  [↑/↓] suggestions  [Enter] save  [Ctrl+D] dismiss error  [Esc] cancel"
        }
    }
}
