use ratatui::{prelude::*, widgets::Paragraph};

use super::super::{format_amount, FlowStep, InvestApp};

pub fn draw_complete_step(frame: &mut Frame, area: Rect, app: &InvestApp) {
    if area.height < 8 {
        return;
    }

    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new("Investment Confirmed")
            .style(app.theme.success_style().add_modifier(Modifier::BOLD)),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    frame.render_widget(
        Paragraph::new(app.config.completion.message.as_str()).style(app.theme.style()),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
    y += 2;

    let amount = app
        .committed(FlowStep::Commit)
        .and_then(|p| p.get("amount").and_then(|a| a.as_u64()))
        .map(format_amount)
        .unwrap_or_else(|| "-".to_string());
    let investor = app
        .committed(FlowStep::Kyc)
        .and_then(|p| p.get("legal_name").and_then(|n| n.as_str()))
        .unwrap_or("-")
        .to_string();

    let summary = [
        format!("  Investor:   {investor}"),
        format!("  Commitment: {} {}", amount, app.config.flow.currency),
        format!("  Fund:       {}", app.config.flow.fund_name),
        format!("  Reference:  {}", app.wire_reference),
    ];

    for line in &summary {
        if y >= area.y + area.height - 3 {
            break;
        }
        frame.render_widget(
            Paragraph::new(line.as_str()).style(app.theme.secondary_style()),
            Rect::new(area.x + 2, y, area.width - 4, 1),
        );
        y += 1;
    }
    y += 1;

    frame.render_widget(
        Paragraph::new("We'll confirm by email once your wire arrives. :quit to exit.")
            .style(app.theme.muted_style()),
        Rect::new(area.x + 2, y, area.width - 4, 1),
    );
}
