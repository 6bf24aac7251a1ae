use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec!["".to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            let mut remaining = word;
            while !remaining.is_empty() {
                let mut chunk = String::new();
                let mut chunk_width = 0;
                let mut chunk_byte_len = 0;

                for c in remaining.chars() {
                    let char_width = UnicodeWidthChar::width_cjk(c).unwrap_or(1);
                    if chunk_width + char_width > width {
                        break;
                    }
                    chunk.push(c);
                    chunk_width += char_width;
                    chunk_byte_len += c.len_utf8();
                }

                if !current_line.is_empty() {
                    lines.push(current_line.trim().to_string());
                    current_line.clear();
                    current_width = 0;
                }

                lines.push(chunk);
                remaining = &remaining[chunk_byte_len..];
            }
            continue;
        }

        if current_width + word_width + 1 > width && !current_line.is_empty() {
            lines.push(current_line.trim().to_string());
            current_line.clear();
            current_width = 0;
        }

        if !current_line.is_empty() {
            current_line.push(' ');
            current_width += 1;
        }

        current_line.push_str(word);
        current_width += word_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line.trim().to_string());
    }

    lines
}

pub fn format_number(x: f64) -> String {
    if x.abs() > 1e10 || (x.abs() < 1e-5 && x != 0.0) {
        format!("{:.6e}", x)
    } else {
        let s = format!("{:.6}", x);
        s.trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

pub fn highlight_expression(expr: &str, base_style: Style) -> Vec<Span<'static>> {
    let operator_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let number_style = Style::default()
        .fg(Color::LightGreen);

    let mut spans = Vec::new();
    let mut current = String::new();

    for c in expr.chars() {
        if c.is_ascii_digit() || c == '.' {
            current.push(c);
            continue;
        }

        if !current.is_empty() {
            spans.push(Span::styled(current.clone(), number_style));
            current.clear();
        }

        match c {
            '+' | '-' | '*' | '/' => {
                spans.push(Span::styled(c.to_string(), operator_style));
            }
            ' ' => {
                spans.push(Span::raw(" "));
            }
            _ => {
                spans.push(Span::styled(c.to_string(), base_style));
            }
        }
    }

    if !current.is_empty() {
        spans.push(Span::styled(current, number_style));
    }

    spans
}
