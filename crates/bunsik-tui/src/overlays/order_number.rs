//! Order number prompt shown before submit.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::OverlayUpdate;
use crate::effects::UiEffect;

/// Highest order number the counter hands out.
const MAX_ORDER_NUMBER: u16 = 1000;

/// State for the order number prompt.
///
/// Digits only, up to four of them, accepted range 1 to 1000. Headerless
/// tickets (order number zero) are reached by configuration, not from here.
#[derive(Debug, Clone, Default)]
pub struct OrderNumberState {
    /// Digits typed so far.
    pub value: String,
    /// Whether the ticket should carry the unpaid banner.
    pub unpaid: bool,
    /// Validation message to display.
    pub error: Option<String>,
}

impl OrderNumberState {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        render_order_number_overlay(frame, self, area);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Clear error on any input
        if !matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            self.error = None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('c') if key.code == KeyCode::Esc || ctrl => {
                OverlayUpdate::close()
            }
            KeyCode::Char('q') => OverlayUpdate::close(),
            KeyCode::Enter => {
                if self.value.is_empty() {
                    self.error = Some("Order number is required.".to_string());
                    return OverlayUpdate::stay();
                }
                match self.value.parse::<u16>() {
                    Ok(number) if (1..=MAX_ORDER_NUMBER).contains(&number) => {
                        OverlayUpdate::close().with_ui_effects(vec![UiEffect::Submit {
                            order_number: number,
                            unpaid: self.unpaid,
                        }])
                    }
                    _ => {
                        self.error =
                            Some("Order number must be between 1 and 1000.".to_string());
                        OverlayUpdate::stay()
                    }
                }
            }
            KeyCode::Backspace => {
                self.value.pop();
                OverlayUpdate::stay()
            }
            KeyCode::Char('u') => {
                self.unpaid = !self.unpaid;
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if c.is_ascii_digit() && self.value.len() < 4 => {
                self.value.push(c);
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }
}

fn render_order_number_overlay(frame: &mut Frame, state: &OrderNumberState, area: Rect) {
    use super::render_utils::{
        InputHint, InputLine, OverlayConfig, render_input_line, render_overlay, render_separator,
    };

    let overlay_width = 46;
    let overlay_height = 8;

    let hints = [
        InputHint::new("Enter", "confirm"),
        InputHint::new("U", "toggle unpaid"),
        InputHint::new("Esc", "cancel"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Order Number",
            border_color: Color::Yellow,
            width: overlay_width,
            height: overlay_height,
            hints: &hints,
        },
    );

    let input_area = Rect::new(layout.body.x, layout.body.y, layout.body.width, 1);
    render_input_line(
        frame,
        input_area,
        &InputLine {
            value: &state.value,
            placeholder: None,
            prompt: "# ",
            prompt_color: Color::DarkGray,
            text_color: Color::Yellow,
            placeholder_color: Color::DarkGray,
            cursor_color: Color::Yellow,
        },
    );

    render_separator(frame, layout.body, 1);

    // Help text or error message
    let (help_text, help_style) = if let Some(error) = &state.error {
        (error.as_str(), Style::default().fg(Color::Red))
    } else {
        (
            "Enter a number from 1 to 1000",
            Style::default().fg(Color::DarkGray),
        )
    };
    let help_area = Rect::new(layout.body.x, layout.body.y + 2, layout.body.width, 1);
    frame.render_widget(Paragraph::new(Line::from(Span::styled(help_text, help_style))), help_area);

    let unpaid_spans = if state.unpaid {
        vec![
            Span::styled("Unpaid ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                "yes",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]
    } else {
        vec![
            Span::styled("Unpaid ", Style::default().fg(Color::DarkGray)),
            Span::styled("no", Style::default().fg(Color::DarkGray)),
        ]
    };
    let unpaid_area = Rect::new(layout.body.x, layout.body.y + 3, layout.body.width, 1);
    frame.render_widget(Paragraph::new(Line::from(unpaid_spans)), unpaid_area);
}
