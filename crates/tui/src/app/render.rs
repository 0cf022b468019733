use super::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const CLOSE_LABEL: &str = " [x] ";

impl App {
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let (lines, error_row) = self.dialog_lines();

        frame.render_widget(
            Block::default().style(Style::default().bg(Color::Black)),
            area,
        );

        let width = area.width.saturating_sub(4).min(76);
        let height = (lines.len() as u16).saturating_add(2).min(area.height);
        let popup = self.centered_rect(width, height, area);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.view.title))
                    .title_top(Line::from(CLOSE_LABEL).right_aligned()),
            ),
            popup,
        );

        let close_width = CLOSE_LABEL.len() as u16;
        self.layout = DialogLayout {
            popup,
            close_button: Rect {
                x: popup.x + popup.width.saturating_sub(close_width + 1),
                y: popup.y,
                width: close_width.min(popup.width),
                height: 1,
            },
            error_line: error_row.map(|row| Rect {
                x: popup.x + 1,
                y: popup.y + 1 + row,
                width: popup.width.saturating_sub(2),
                height: 1,
            }),
        };
    }

    fn dialog_lines(&self) -> (Vec<Line<'static>>, Option<u16>) {
        let label = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().fg(Color::DarkGray);
        let mut lines: Vec<Line<'static>> = Vec::new();

        if !self.view.help.is_empty() {
            lines.push(Line::styled(self.view.help.clone(), dim));
            lines.push(Line::default());
        }

        lines.push(Line::styled(format!("{}:", self.view.base_url_label), label));
        let url_value = match (&self.view.choices, self.choice) {
            (Some(choices), Some(idx)) => choices
                .get(idx)
                .map(|c| format!("< {} ({}) >", c.name, c.url))
                .unwrap_or_else(|| "< no endpoints configured >".to_string()),
            _ => self.field_text(Field::BaseUrl, &self.base_url.buffer),
        };
        lines.push(Line::from(format!("{}{}", self.marker(Field::BaseUrl), url_value)));
        if self.view.choices.is_none() && !self.view.suggestions.is_empty() {
            lines.push(Line::styled(
                format!("  suggestions: {}", self.view.suggestions.join(", ")),
                dim,
            ));
        }
        lines.push(Line::default());

        lines.push(Line::styled(format!("{}:", self.view.api_key_label), label));
        let key_value = self.field_text(Field::ApiKey, &self.api_key.masked());
        lines.push(Line::from(format!("{}{}", self.marker(Field::ApiKey), key_value)));
        lines.push(Line::default());

        let mut error_row = None;
        if let Some(ref error) = self.view.error {
            error_row = Some(lines.len() as u16);
            lines.push(Line::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ));
            lines.push(Line::default());
        }

        let button = if self.view.is_submitting() {
            Line::styled("[ Testing... ]", dim)
        } else {
            Line::styled(
                format!("[ {} ]", self.view.button_label),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            )
        };
        lines.push(button.centered());
        lines.push(Line::default());
        lines.push(Line::styled(
            self.keybinds.footer(self.view.choices.is_some()),
            dim,
        ));

        (lines, error_row)
    }

    fn marker(&self, field: Field) -> &'static str {
        if self.focus == field {
            "> "
        } else {
            "  "
        }
    }

    fn field_text(&self, field: Field, value: &str) -> String {
        if self.focus == field {
            format!("{}_", value)
        } else if value.is_empty() {
            "[not set]".to_string()
        } else {
            value.to_string()
        }
    }

    fn centered_rect(&self, width: u16, height: u16, r: Rect) -> Rect {
        let width = width.min(r.width);
        let height = height.min(r.height);
        Rect {
            x: r.x + (r.width - width) / 2,
            y: r.y + (r.height - height) / 2,
            width,
            height,
        }
    }
}
