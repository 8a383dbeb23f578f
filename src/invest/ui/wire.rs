use ratatui::{prelude::*, widgets::Paragraph};

use super::super::{format_amount, FlowStep, InvestApp};
use super::draw_action_button;

pub fn draw_wire_step(frame: &mut Frame, area: Rect, app: &InvestApp) {
    if area.height < 12 || area.width < 30 {
        return;
    }

    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new("Wire Instructions")
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    let amount = app
        .committed(FlowStep::Commit)
        .and_then(|p| p.get("amount").and_then(|a| a.as_u64()))
        .map(format_amount)
        .unwrap_or_else(|| "-".to_string());

    let beneficiary = format!("  Beneficiary:  {}", app.config.flow.fund_name);
    let amount_line = format!("  Amount:       {} {}", amount, app.config.flow.currency);
    let reference = format!("  Reference:    {}", app.wire_reference);

    let lines = [
        "Send your commitment with these details:",
        "",
        beneficiary.as_str(),
        amount_line.as_str(),
        reference.as_str(),
        "",
        "Include the reference so we can match your transfer.",
    ];

    for line in lines {
        if y >= area.y + area.height - 5 {
            break;
        }
        frame.render_widget(
            Paragraph::new(line).style(app.theme.style()),
            Rect::new(area.x + 2, y, area.width - 4, 1),
        );
        y += 1;
    }
    y += 1;

    frame.render_widget(
        Paragraph::new("This confirmation is final; earlier steps stay locked after it.")
            .style(app.theme.muted_style()),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );

    draw_action_button(
        frame,
        area,
        " [Enter] Confirm Wire Sent ",
        !app.is_submitting(),
        &app.theme,
    );
}
