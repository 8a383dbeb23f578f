use ratatui::{prelude::*, widgets::Paragraph};

use super::super::InvestApp;
use super::{draw_action_button, draw_field};
use crate::input::EditMode;

pub fn draw_kyc_step(frame: &mut Frame, area: Rect, app: &InvestApp) {
    if area.height < 12 || area.width < 30 {
        return;
    }

    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new("Verify Your Identity")
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    frame.render_widget(
        Paragraph::new("Regulations require us to confirm who is investing.")
            .style(app.theme.muted_style()),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    let is_insert = app.mode == EditMode::Insert;
    let fields = [
        ("Legal name", &app.legal_name, 0),
        ("Tax reference", &app.tax_reference, 1),
    ];

    for (label, buffer, field_idx) in fields {
        draw_field(
            frame,
            Rect::new(area.x + 2, y, area.width - 4, 1),
            label,
            buffer,
            app.focused_field == field_idx,
            is_insert,
            &app.theme,
        );
        y += 2;
    }

    frame.render_widget(
        Paragraph::new("Your tax reference is never shown on screen.")
            .style(app.theme.muted_style()),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );

    let ready =
        !app.legal_name.is_empty() && !app.tax_reference.is_empty() && !app.is_submitting();
    draw_action_button(frame, area, " [Enter] Verify ", ready, &app.theme);
}
