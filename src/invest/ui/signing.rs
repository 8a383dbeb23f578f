use ratatui::{prelude::*, widgets::Paragraph};

use super::super::{FlowStep, InvestApp};
use super::{draw_action_button, draw_field};
use crate::input::EditMode;

pub fn draw_signing_step(frame: &mut Frame, area: Rect, app: &InvestApp) {
    if area.height < 12 || area.width < 30 {
        return;
    }

    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new("Sign the Subscription Agreement")
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    let amount_line = app
        .committed(FlowStep::Commit)
        .and_then(|p| p.get("amount").and_then(|a| a.as_u64()))
        .map(|amount| {
            format!(
                "Commitment: {} {}",
                super::super::format_amount(amount),
                app.config.flow.currency
            )
        })
        .unwrap_or_else(|| "Commitment: (pending)".to_string());

    let summary = [
        amount_line.as_str(),
        "",
        "By signing you acknowledge:",
        "  * The commitment is binding once wired",
        "  * Capital is at risk and returns are not guaranteed",
        "  * You have read the fund's offering documents",
        "",
    ];

    for line in summary {
        if y >= area.y + area.height - 5 {
            break;
        }
        frame.render_widget(
            Paragraph::new(line).style(app.theme.style()),
            Rect::new(area.x + 2, y, area.width - 4, 1),
        );
        y += 1;
    }

    draw_field(
        frame,
        Rect::new(area.x + 2, y, area.width - 4, 1),
        "Initials",
        &app.initials,
        app.focused_field == 0,
        app.mode == EditMode::Insert,
        &app.theme,
    );

    let ready = !app.initials.is_empty() && !app.is_submitting();
    draw_action_button(frame, area, " [Enter] Sign ", ready, &app.theme);
}
