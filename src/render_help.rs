use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui_mode::app::App;

pub fn render_help(frame: &mut Frame, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" PostCalc Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));

    let help_text = vec![
        Line::from(Span::styled("PostCalc - Infix to Postfix Calculator", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Operators:", Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))),
        Line::from("  + : Addition        (e.g., 5 + 3 = 8)"),
        Line::from("  - : Subtraction     (e.g., 10 - 4 = 6)"),
        Line::from("  * : Multiplication  (e.g., 6 * 7 = 42)"),
        Line::from("  / : Division        (e.g., 15 / 3 = 5)"),
        Line::from(""),
        Line::from(Span::styled("Precedence:", Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))),
        Line::from("  A pending + or / waits for a following - or *."),
        Line::from("  In every other case operators apply left to right."),
        Line::from("  2 + 3 * 4 = 14    (3 * 4 first)"),
        Line::from("  8 / 4 * 2 = 1     (4 * 2 first)"),
        Line::from("  9 - 2 * 3 = 21    (9 - 2 first)"),
        Line::from("  Use parentheses to force any other grouping."),
        Line::from(""),
        Line::from(Span::styled("Numbers:", Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))),
        Line::from("  Integers and decimals: 42, 3.14, .5"),
        Line::from("  Exponent notation: 1E2, 2.5e-3, 1e+4"),
        Line::from("  Division follows IEEE rules: 5 / 0 = inf, 0 / 0 = NaN"),
        Line::from(""),
        Line::from(Span::styled("Commands:", Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))),
        Line::from("  details <expression> : Show the postfix form and timing"),
        Line::from("  postfix <expression> : Evaluate postfix input directly"),
        Line::from("  clear : Clear calculation history"),
        Line::from("  Ctrl+U : Clear current input"),
        Line::from("  help : Show this help screen"),
        Line::from("  quit : Exit the calculator"),
        Line::from(""),
        Line::from(Span::styled("Navigation:", Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))),
        Line::from("  ← → : Move cursor left/right"),
        Line::from("  Ctrl+←/→ : Move cursor by words"),
        Line::from("  Home/End : Move to start/end of line"),
        Line::from("  ↑ ↓ : Navigate calculation history"),
        Line::from("  PgUp/PgDn : Page through history"),
        Line::from("  Mouse wheel : Scroll through history"),
        Line::from(""),
        Line::from(Span::styled("Examples:", Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))),
        Line::from("  2 + 3 * 4"),
        Line::from("  ((1 + 2) * (3 - 1))"),
        Line::from("  1E2 + 1"),
        Line::from("  details 8 / 4 * 2"),
        Line::from("  postfix 5 1 2 + 4 * + 3 -"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}
