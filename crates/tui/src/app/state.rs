use super::*;

/// Screen regions recorded by the last render, used for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogLayout {
    pub popup: Rect,
    pub close_button: Rect,
    pub error_line: Option<Rect>,
}

pub struct App {
    pub handle: DialogHandle,
    pub view: DialogView,
    pub base_url: InputState,
    pub api_key: InputState,
    pub focus: Field,
    /// Selected entry when the endpoint is a closed choice list.
    pub choice: Option<usize>,
    /// Last suggestion applied to the free-form URL field.
    pub suggestion: Option<usize>,
    pub keybinds: Keybinds,
    pub layout: DialogLayout,
}

impl App {
    pub fn new(handle: DialogHandle) -> Self {
        let view = handle.view();
        let choice = view.choices.as_ref().map(|choices| {
            choices
                .iter()
                .position(|c| c.url == view.seed.base_url)
                .unwrap_or(0)
        });

        Self {
            base_url: InputState::new(&view.seed.base_url),
            api_key: InputState::new(&view.seed.api_key),
            focus: Field::BaseUrl,
            choice,
            suggestion: None,
            keybinds: Keybinds,
            layout: DialogLayout::default(),
            view,
            handle,
        }
    }

    pub fn sync_view(&mut self) {
        self.view = self.handle.view();
    }

    pub fn is_closed(&self) -> bool {
        self.view.is_closed()
    }

    pub fn current_base_url(&self) -> String {
        match (&self.view.choices, self.choice) {
            (Some(choices), Some(idx)) => choices
                .get(idx)
                .map(|c| c.url.clone())
                .unwrap_or_default(),
            _ => self.base_url.buffer.clone(),
        }
    }

    pub(super) fn submit(&mut self) {
        if self.view.is_submitting() {
            return;
        }
        self.handle
            .submit(self.current_base_url(), self.api_key.buffer.clone());
    }

    pub(super) fn close(&self, source: CancelSource) {
        self.handle.close(source);
    }

    pub(super) fn cycle_endpoint(&mut self, forward: bool) {
        if let Some(choices) = &self.view.choices {
            if choices.is_empty() {
                return;
            }
            let len = choices.len();
            let idx = self.choice.unwrap_or(0);
            self.choice = Some(if forward { (idx + 1) % len } else { (idx + len - 1) % len });
            return;
        }

        let len = self.view.suggestions.len();
        if len == 0 {
            return;
        }
        let next = match self.suggestion {
            None if forward => 0,
            None => len - 1,
            Some(idx) if forward => (idx + 1) % len,
            Some(idx) => (idx + len - 1) % len,
        };
        self.suggestion = Some(next);
        self.base_url.set(&self.view.suggestions[next]);
        self.focus = Field::BaseUrl;
    }
}
