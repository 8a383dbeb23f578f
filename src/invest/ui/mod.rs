mod commit;
mod complete;
mod kyc;
mod signing;
mod welcome;
mod wire;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::input::{EditMode, InputBuffer};
use crate::ui::{FrameLayout, Theme};
use crate::wizard::{StepPhase, WizardStatus};

use super::{ConfirmAction, FlowStep, InvestApp, PanelFocus};

/// Main draw function for the investment flow.
pub fn draw(frame: &mut Frame, app: &InvestApp) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let layout = FrameLayout::new(area);

    draw_header(frame, layout.header, app);

    match app.panel_focus {
        PanelFocus::Welcome => welcome::draw_welcome(frame, layout.content, app),
        PanelFocus::Flow => draw_flow_content(frame, layout.content, app),
    }

    draw_message(frame, layout.message, app);
    draw_status_bar(frame, layout.status, app);

    // Overlays
    if let Some(action) = app.confirm_action {
        draw_confirm_dialog(frame, action, app);
    }

    if app.show_help {
        draw_help(frame, app);
    }
}

/// Header bar: title on the left, clock on the right.
fn draw_header(frame: &mut Frame, area: Rect, app: &InvestApp) {
    frame.render_widget(Clear, area);

    let title = format!(" {} (v{}) ", app.config.general.title, env!("CARGO_PKG_VERSION"));
    frame.render_widget(
        Paragraph::new(title).style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        area,
    );

    let clock = format!("{} ", chrono::Local::now().format("%H:%M"));
    frame.render_widget(
        Paragraph::new(clock)
            .style(app.theme.muted_style())
            .alignment(Alignment::Right),
        area,
    );
}

fn draw_flow_content(frame: &mut Frame, area: Rect, app: &InvestApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
        .split(area);

    draw_sidebar(frame, chunks[0], app);
    draw_step_content(frame, chunks[1], app);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, app: &InvestApp) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style())
        .title(" Steps ");

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    if inner.height < 3 {
        return;
    }

    let view = app.view();

    for (idx, report) in view.progress.iter().enumerate() {
        if idx as u16 >= inner.height {
            break;
        }

        let (glyph, style) = match report.phase {
            StepPhase::Completed => ("[x]".to_string(), app.theme.success_style()),
            StepPhase::Current => match view.status {
                WizardStatus::Submitting => (
                    format!("[{}]", app.spinner_char()),
                    app.theme.primary_style(),
                ),
                WizardStatus::Error => ("[!]".to_string(), app.theme.error_style()),
                _ => (
                    "[>]".to_string(),
                    app.theme.primary_style().add_modifier(Modifier::BOLD),
                ),
            },
            StepPhase::Upcoming => ("[ ]".to_string(), app.theme.muted_style()),
        };

        let line = format!(" {glyph} {}", report.label);
        frame.render_widget(
            Paragraph::new(line).style(style),
            Rect::new(inner.x, inner.y + idx as u16, inner.width, 1),
        );
    }
}

fn draw_step_content(frame: &mut Frame, area: Rect, app: &InvestApp) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    match app.current_step() {
        Some(FlowStep::Commit) => commit::draw_commit_step(frame, inner, app),
        Some(FlowStep::Kyc) => kyc::draw_kyc_step(frame, inner, app),
        Some(FlowStep::Signing) => signing::draw_signing_step(frame, inner, app),
        Some(FlowStep::Wire) => wire::draw_wire_step(frame, inner, app),
        None => complete::draw_complete_step(frame, inner, app),
    }
}

fn draw_message(frame: &mut Frame, area: Rect, app: &InvestApp) {
    let msg = match &app.message {
        Some(m) => m,
        None if app.is_submitting() => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.secondary_style())
                .title(" Info ")
                .title_style(app.theme.secondary_style().add_modifier(Modifier::BOLD));

            let content = Line::from(vec![Span::styled(
                format!("{} Submitting...", app.spinner_char()),
                app.theme.style(),
            )]);

            frame.render_widget(
                Paragraph::new(content).block(block).wrap(Wrap { trim: true }),
                area,
            );
            return;
        }
        None => return,
    };

    let (title, border_style, text_style) = if msg.is_error {
        (" Error ", app.theme.error_style(), app.theme.error_style())
    } else {
        (" Info ", app.theme.secondary_style(), app.theme.style())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_style(border_style.add_modifier(Modifier::BOLD));

    let content = Line::from(vec![Span::styled(msg.text.as_str(), text_style)]);

    frame.render_widget(
        Paragraph::new(content).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &InvestApp) {
    frame.render_widget(Clear, area);

    let mode_name = app.mode.label();
    let mode_span = Span::styled(format!(" {mode_name} "), app.theme.mode_style(mode_name));

    let after_mode = if app.mode == EditMode::Command {
        Span::styled(
            format!(":{}", app.command_line.content()),
            app.theme.style(),
        )
    } else if !app.status_bar.left_hint.is_empty() {
        Span::styled(app.status_bar.left_hint.clone(), app.theme.muted_style())
    } else {
        Span::raw("")
    };

    let left_line = Line::from(vec![mode_span, Span::raw(" "), after_mode]);
    frame.render_widget(
        Paragraph::new(left_line),
        Rect::new(area.x, area.y, area.width * 2 / 3, 1),
    );

    let view = app.view();
    let completed = view
        .progress
        .iter()
        .filter(|r| r.phase == StepPhase::Completed)
        .count();
    let total = view.progress.len();

    let right_text = if app.status_bar.right_hint.is_empty() {
        format!("{completed}/{total}")
    } else {
        format!("{completed}/{total}  {}", app.status_bar.right_hint)
    };

    frame.render_widget(
        Paragraph::new(right_text)
            .style(app.theme.muted_style())
            .alignment(Alignment::Right),
        Rect::new(area.x + area.width / 3, area.y, area.width * 2 / 3, 1),
    );
}

fn draw_confirm_dialog(frame: &mut Frame, action: ConfirmAction, app: &InvestApp) {
    let (title, message) = match action {
        ConfirmAction::Restart => (
            "Start Over",
            "Discard everything entered so far and restart?",
        ),
        ConfirmAction::Quit => ("Quit", "Leave the investment flow?"),
    };

    let width = 48.min(frame.area().width.saturating_sub(4));
    let area = FrameLayout::centered_box(frame.area(), width, 7);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.primary_style())
        .title(format!(" {title} "));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    frame.render_widget(
        Paragraph::new(message)
            .style(app.theme.style().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        Rect::new(inner.x, inner.y + 1, inner.width, 1),
    );

    let hints = Line::from(vec![
        Span::styled("[", app.theme.style()),
        Span::styled("Y", app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Span::styled("]es / [", app.theme.style()),
        Span::styled("N", app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Span::styled("]o", app.theme.style()),
    ]);

    frame.render_widget(
        Paragraph::new(hints).alignment(Alignment::Center),
        Rect::new(inner.x, inner.y + 3, inner.width, 1),
    );
}

fn draw_help(frame: &mut Frame, app: &InvestApp) {
    let width = 56.min(frame.area().width.saturating_sub(4));
    let height = 18.min(frame.area().height.saturating_sub(4));
    let area = FrameLayout::centered_box(frame.area(), width, height);

    let help_text = [
        "",
        "Navigation:",
        "",
        "  j/k, Tab       Move between fields",
        "  Enter          Submit the current step",
        "  i              Enter insert mode",
        "  Esc            Return to normal mode",
        "  :              Command mode",
        "",
        "Commands:",
        "",
        "  :back          Revisit the previous step",
        "  :restart       Start the flow over",
        "  :quit          Exit",
        "",
        "Press q or Esc to close",
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style())
        .title(" Help ");

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    for (i, line) in help_text.iter().enumerate() {
        if i as u16 >= inner.height {
            break;
        }
        frame.render_widget(
            Paragraph::new(*line).style(app.theme.style()),
            Rect::new(inner.x, inner.y + i as u16, inner.width, 1),
        );
    }
}

/// One labelled input line with a mode-aware cursor.
pub(crate) fn draw_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    buffer: &InputBuffer,
    is_focused: bool,
    is_insert: bool,
    theme: &Theme,
) {
    let label_style = if is_focused {
        theme.primary_style()
    } else {
        theme.style()
    };
    frame.render_widget(
        Paragraph::new(label.to_string()).style(label_style),
        Rect::new(area.x, area.y, 16, 1),
    );

    let field_x = area.x + 16;
    let field_width = area.width.saturating_sub(18);
    let display_content = buffer.display('*');

    if is_insert && is_focused {
        // Insert mode: thin cursor between characters
        let cursor = buffer.cursor();
        let before: String = display_content.chars().take(cursor).collect();
        let after: String = display_content.chars().skip(cursor).collect();

        let line = Line::from(vec![
            Span::styled(before, theme.style()),
            Span::styled("|", theme.primary_style().add_modifier(Modifier::BOLD)),
            Span::styled(after, theme.style()),
        ]);
        frame.render_widget(Paragraph::new(line), Rect::new(field_x, area.y, field_width, 1));
    } else if is_focused {
        // Normal mode: block cursor on the current character
        let cursor = buffer.cursor();
        let chars: Vec<char> = display_content.chars().collect();
        let mut spans = Vec::new();

        for (i, ch) in chars.iter().enumerate() {
            let style = if i == cursor {
                theme.style().add_modifier(Modifier::REVERSED)
            } else {
                theme.style()
            };
            spans.push(Span::styled(ch.to_string(), style));
        }
        if cursor >= chars.len() {
            spans.push(Span::styled(" ", theme.style().add_modifier(Modifier::REVERSED)));
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans)),
            Rect::new(field_x, area.y, field_width, 1),
        );
    } else {
        let display = if display_content.is_empty() {
            "(empty)"
        } else {
            &display_content
        };
        frame.render_widget(
            Paragraph::new(display.to_string()).style(theme.muted_style()),
            Rect::new(field_x, area.y, field_width, 1),
        );
    }
}

/// Primary action button at the bottom of a step screen.
pub(crate) fn draw_action_button(frame: &mut Frame, area: Rect, text: &str, ready: bool, theme: &Theme) {
    let button_y = area.y + area.height.saturating_sub(3);
    let width = text.len() as u16;

    let style = if ready {
        theme.primary_style().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        theme.muted_style().add_modifier(Modifier::REVERSED)
    };

    frame.render_widget(
        Paragraph::new(text.to_string()).style(style),
        Rect::new(area.x + 2, button_y, width.min(area.width), 1),
    );
}
