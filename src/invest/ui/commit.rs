use ratatui::{prelude::*, widgets::Paragraph};

use super::super::{format_amount, InvestApp};
use super::{draw_action_button, draw_field};
use crate::input::EditMode;

pub fn draw_commit_step(frame: &mut Frame, area: Rect, app: &InvestApp) {
    if area.height < 10 || area.width < 30 {
        return;
    }

    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new("Commit to Invest")
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    let flow = &app.config.flow;
    frame.render_widget(
        Paragraph::new(format!("Fund: {}", flow.fund_name)).style(app.theme.style()),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 1;

    frame.render_widget(
        Paragraph::new(format!(
            "Accepted range: {} - {} {}",
            format_amount(flow.min_commitment),
            format_amount(flow.max_commitment),
            flow.currency
        ))
        .style(app.theme.muted_style()),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    draw_field(
        frame,
        Rect::new(area.x + 2, y, area.width - 4, 1),
        "Amount",
        &app.amount,
        app.focused_field == 0,
        app.mode == EditMode::Insert,
        &app.theme,
    );
    y += 2;

    frame.render_widget(
        Paragraph::new("Once committed, the amount is reserved while we verify your details.")
            .style(app.theme.muted_style()),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );

    let ready = !app.amount.is_empty() && !app.is_submitting();
    draw_action_button(frame, area, " [Enter] Commit ", ready, &app.theme);
}
