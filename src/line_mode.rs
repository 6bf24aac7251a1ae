use std::io::{stdin, stdout, Write};

use anyhow::Result;
use postcalc::calc_engine::{
    evaluate_postfix, evaluate_tokens, format_tokens, format_with_spaces, to_postfix, tokenize,
};
use termion::{
    event::Key,
    input::TermRead,
    raw::IntoRawMode,
    cursor::{Goto, DetectCursorPos},
    clear::CurrentLine as ClearLine,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

// Функция для преобразования позиции графемы в байтовую позицию
fn grapheme_index_to_byte_index(s: &str, grapheme_index: usize) -> usize {
    s.grapheme_indices(true)
        .nth(grapheme_index)
        .map(|(i, _)| i)
        .unwrap_or_else(|| s.len())
}

pub fn run_line() -> Result<()> {
    println!("PostCalc - infix to postfix calculator");
    println!("Operators: +, -, *, / and parentheses");
    println!("Precedence: a pending + or / waits for a following - or *");
    println!("Navigation: ←/→, Backspace/Delete, Home/End, ↑/↓ for history");
    println!("Special commands: 'quit' to exit, 'clear' to reset history");
    println!("\rAdd 'details' before an expression to see its postfix form,");
    println!("\ror start with 'postfix' to evaluate postfix input directly\n");

    let mut stdout = stdout().into_raw_mode()?;
    let mut history: Vec<String> = Vec::new();
    let mut history_index = 0;

    loop {
        write!(stdout, "{}Expression: ", ClearLine)?;
        stdout.flush()?;

        let mut expression = String::new();
        let mut cursor_pos = 0; // позиция курсора в графемах
        let (_, initial_y) = stdout.cursor_pos()?;

        let stdin = stdin();
        let mut keys = stdin.keys();

        loop {
            write!(
                stdout,
                "{}{}Expression: {}",
                Goto(1, initial_y),
                ClearLine,
                expression
            )?;

            // Вычисляем экранную колонку курсора
            let prefix: String = expression.graphemes(true).take(cursor_pos).collect();
            write!(stdout, "{}", Goto((13 + prefix.width()) as u16, initial_y))?;
            stdout.flush()?;

            let key = match keys.next() {
                Some(key) => key?,
                None => return Ok(()),
            };

            match key {
                Key::Char('\n') => break,
                Key::Char(c) => {
                    // Вставляем символ по правильной позиции
                    let byte_idx = grapheme_index_to_byte_index(&expression, cursor_pos);
                    expression.insert(byte_idx, c);
                    cursor_pos = expression[..byte_idx + c.len_utf8()]
                        .graphemes(true)
                        .count();
                }
                Key::Backspace if cursor_pos > 0 => {
                    cursor_pos -= 1;
                    let start = grapheme_index_to_byte_index(&expression, cursor_pos);
                    let end = grapheme_index_to_byte_index(&expression, cursor_pos + 1);
                    expression.drain(start..end);
                }
                Key::Delete if cursor_pos < expression.graphemes(true).count() => {
                    let start = grapheme_index_to_byte_index(&expression, cursor_pos);
                    let end = grapheme_index_to_byte_index(&expression, cursor_pos + 1);
                    expression.drain(start..end);
                }
                Key::Left if cursor_pos > 0 => cursor_pos -= 1,
                Key::Right if cursor_pos < expression.graphemes(true).count() => cursor_pos += 1,
                Key::Home => cursor_pos = 0,
                Key::End => cursor_pos = expression.graphemes(true).count(),
                Key::Up => {
                    if history_index > 0 {
                        history_index -= 1;
                        expression = history[history_index].clone();
                        cursor_pos = expression.graphemes(true).count();
                    }
                }
                Key::Down => {
                    if history_index < history.len().saturating_sub(1) {
                        history_index += 1;
                        expression = history[history_index].clone();
                        cursor_pos = expression.graphemes(true).count();
                    } else {
                        history_index = history.len();
                        expression.clear();
                        cursor_pos = 0;
                    }
                }
                _ => {}
            }
        }

        let input = expression.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("\r\nGoodbye!");
                return Ok(());
            }
            "clear" | "reset" => {
                history.clear();
                history_index = 0;
                println!("\r\nHistory cleared\n");
                continue;
            }
            _ => {}
        }

        let (detailed_mode, processed_input) = if input.to_lowercase().starts_with("details ") {
            (true, input[8..].trim())
        } else if input.to_lowercase().ends_with(" details") {
            (true, input[..input.len() - 7].trim())
        } else {
            (false, input)
        };

        if processed_input.is_empty() {
            println!("\r\nPlease enter a valid expression after 'details'");
            continue;
        }

        history.push(input.to_string());
        history_index = history.len();

        if processed_input.to_lowercase().starts_with("postfix ") {
            let rpn = processed_input["postfix ".len()..].trim();
            let formatted = format_with_spaces(rpn);
            match evaluate_postfix(rpn) {
                Ok(result) => print!("\r\n  {} = {}\n", formatted, result),
                Err(e) => println!("\r\n  {} = Error: {}\n", formatted, e),
            }
            continue;
        }

        let formatted_expr = format_with_spaces(processed_input);
        match to_postfix(&tokenize(processed_input)) {
            Ok(tokens) => match evaluate_tokens(&tokens) {
                Ok(result) => {
                    print!("\r\n  {} = {}\n", formatted_expr, result);
                    if detailed_mode {
                        println!("\r  Postfix: {}\n", format_tokens(&tokens));
                    }
                }
                Err(e) => println!("\r\n  {} = Error: {}\n", formatted_expr, e),
            },
            Err(e) => println!("\r\n  {} = Error: {}\n", formatted_expr, e),
        }
    }
}
