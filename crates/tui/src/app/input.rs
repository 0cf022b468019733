use super::*;

impl App {
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            _ => {}
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.close(CancelSource::Escape),
                KeyCode::Char('d') => {
                    self.handle.send(DialogEvent::DismissError);
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.close(CancelSource::Escape),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::BackTab => self.focus = self.focus.toggle(),
            KeyCode::Up => self.cycle_endpoint(false),
            KeyCode::Down => self.cycle_endpoint(true),
            KeyCode::Char(c) => match self.focus {
                Field::BaseUrl if self.view.choices.is_none() => {
                    self.base_url.handle_char(c);
                    self.suggestion = None;
                }
                Field::BaseUrl => {}
                Field::ApiKey => self.api_key.handle_char(c),
            },
            KeyCode::Backspace => match self.focus {
                Field::BaseUrl if self.view.choices.is_none() => {
                    self.base_url.handle_backspace();
                    self.suggestion = None;
                }
                Field::BaseUrl => {}
                Field::ApiKey => self.api_key.handle_backspace(),
            },
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (col, row) = (mouse.column, mouse.row);

        if Self::rect_contains(self.layout.close_button, col, row) {
            self.close(CancelSource::CloseButton);
        } else if !Self::rect_contains(self.layout.popup, col, row) {
            self.close(CancelSource::Backdrop);
        } else if self
            .layout
            .error_line
            .is_some_and(|rect| Self::rect_contains(rect, col, row))
        {
            self.handle.send(DialogEvent::DismissError);
        }
    }

    fn rect_contains(rect: Rect, col: u16, row: u16) -> bool {
        col >= rect.x
            && col < rect.x.saturating_add(rect.width)
            && row >= rect.y
            && row < rect.y.saturating_add(rect.height)
    }
}
