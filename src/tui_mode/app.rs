use postcalc::calc_engine::{
    evaluate_postfix, evaluate_tokens, format_tokens, format_with_spaces, to_postfix, tokenize,
    CalcError,
};
use unicode_segmentation::UnicodeSegmentation;

pub struct HistoryEntry {
    pub input: String,
    pub result: Result<f64, CalcError>,
    pub postfix: Option<String>,
    pub detailed_mode: bool,
    pub duration: std::time::Duration,
}

pub struct App {
    pub input: String,
    pub cursor_position: usize,
    pub input_scroll: usize,
    pub history: Vec<HistoryEntry>,
    pub cursor_history: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    pub list_height: usize,
    pub item_start_indices: Vec<usize>,
    pub history_scroll: usize,
    pub scroll_to_bottom: bool,
    pub terminal_too_small: bool,
}

impl App {
    pub fn new() -> Self {
        App {
            input: String::new(),
            cursor_position: 0,
            input_scroll: 0,
            history: Vec::new(),
            cursor_history: 0,
            should_quit: false,
            show_help: false,
            help_scroll: 0,
            list_height: 5,
            item_start_indices: Vec::new(),
            history_scroll: 0,
            scroll_to_bottom: false,
            terminal_too_small: false,
        }
    }

    pub fn adjust_input_scroll(&mut self, visible_width: usize) {
        let total = self.input.graphemes(true).count();
        let cursor_pos = self.cursor_position;

        if cursor_pos < self.input_scroll {
            self.input_scroll = cursor_pos;
        }
        else if cursor_pos >= self.input_scroll + visible_width {
            self.input_scroll = cursor_pos - visible_width + 1;
        }

        if self.input_scroll > total.saturating_sub(visible_width) {
            self.input_scroll = total.saturating_sub(visible_width);
        }
    }

    pub fn submit(&mut self) {
        let input = self.input.trim();
        if input.is_empty() {
            return;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                self.should_quit = true;
                return;
            }
            "clear" | "reset" => {
                self.history.clear();
                self.cursor_history = 0;
                self.clear_input();
                self.history_scroll = 0;
                return;
            }
            "help" => {
                self.show_help = true;
                self.clear_input();
                return;
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
            self.history.push(HistoryEntry {
                input: input.to_string(),
                result: Err(CalcError::EmptyInput),
                postfix: None,
                detailed_mode: false,
                duration: std::time::Duration::ZERO,
            });
            self.clear_input();
            return;
        }

        let start_time = std::time::Instant::now();
        // "postfix 2 3 4 * +" feeds the evaluator directly, skipping the
        // infix conversion
        let (result, postfix) = if processed_input.to_lowercase().starts_with("postfix ") {
            let rpn = processed_input["postfix ".len()..].trim();
            (evaluate_postfix(rpn), Some(format_with_spaces(rpn)))
        } else {
            match to_postfix(&tokenize(processed_input)) {
                Ok(tokens) => (evaluate_tokens(&tokens), Some(format_tokens(&tokens))),
                Err(e) => (Err(e), None),
            }
        };
        let duration = start_time.elapsed();

        self.history.push(HistoryEntry {
            input: processed_input.to_string(),
            result,
            postfix,
            detailed_mode,
            duration,
        });

        self.cursor_history = self.history.len().saturating_sub(1);
        self.clear_input();
        self.scroll_to_bottom = true;
    }

    pub fn move_cursor(&mut self, direction: i32) {
        match direction {
            -1 => self.cursor_position = self.cursor_position.saturating_sub(1),
            1 => {
                self.cursor_position =
                    (self.cursor_position + 1).min(self.input.graphemes(true).count())
            }
            _ => {}
        }
    }

    pub fn move_cursor_by_words(&mut self, direction: i32) {
        let graphemes: Vec<&str> = self.input.graphemes(true).collect();
        let is_space = |g: &str| g.chars().all(char::is_whitespace);
        // the cursor can sit past the last cluster when a combining mark
        // arrived as its own key event
        let mut pos = self.cursor_position.min(graphemes.len());

        if direction < 0 {
            while pos > 0 && is_space(graphemes[pos - 1]) {
                pos -= 1;
            }
            while pos > 0 && !is_space(graphemes[pos - 1]) {
                pos -= 1;
            }
        } else {
            let len = graphemes.len();
            while pos < len && !is_space(graphemes[pos]) {
                pos += 1;
            }
            while pos < len && is_space(graphemes[pos]) {
                pos += 1;
            }
        }

        self.cursor_position = pos;
    }

    pub fn navigate_history(&mut self, direction: i32) {
        if direction < 0 && self.cursor_history > 0 {
            self.cursor_history -= 1;
        } else if direction > 0 && self.cursor_history < self.history.len().saturating_sub(1) {
            self.cursor_history += 1;
        }

        if self.cursor_history < self.history.len() {
            self.input = self.history[self.cursor_history].input.clone();
        } else {
            self.input.clear();
        }
        self.cursor_position = self.input.graphemes(true).count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn scroll_history(&mut self, direction: i32) {
        let step = self.list_height.saturating_sub(1);
        if direction < 0 {
            self.cursor_history = self.cursor_history.saturating_sub(step);
        } else {
            self.cursor_history = self.cursor_history.saturating_add(step)
                .min(self.history.len().saturating_sub(1));
        }

        if self.cursor_history < self.history.len() {
            self.input = self.history[self.cursor_history].input.clone();
        }
        self.cursor_position = self.input.graphemes(true).count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
        self.input_scroll = 0;
    }

    pub fn grapheme_index_to_byte_index(s: &str, grapheme_index: usize) -> usize {
        s.grapheme_indices(true)
            .nth(grapheme_index)
            .map(|(i, _)| i)
            .unwrap_or_else(|| s.len())
    }

    pub fn remove_grapheme(&mut self, index: usize) {
        let start = Self::grapheme_index_to_byte_index(&self.input, index);
        let end = Self::grapheme_index_to_byte_index(&self.input, index + 1);
        if start < end {
            self.input.drain(start..end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit_line(app: &mut App, line: &str) {
        app.input = line.to_string();
        app.cursor_position = app.input.graphemes(true).count();
        app.submit();
    }

    #[test]
    fn submit_records_result_and_postfix() {
        let mut app = App::new();
        submit_line(&mut app, "2 + 3 * 4");

        assert_eq!(app.history.len(), 1);
        let entry = &app.history[0];
        assert_eq!(entry.result, Ok(14.0));
        assert_eq!(entry.postfix.as_deref(), Some("2 3 4 * +"));
        assert!(!entry.detailed_mode);
        assert!(app.input.is_empty());
    }

    #[test]
    fn submit_details_prefix_flags_the_entry() {
        let mut app = App::new();
        submit_line(&mut app, "details 8 / 4 * 2");

        let entry = &app.history[0];
        assert_eq!(entry.input, "8 / 4 * 2");
        assert_eq!(entry.result, Ok(1.0));
        assert_eq!(entry.postfix.as_deref(), Some("8 4 2 * /"));
        assert!(entry.detailed_mode);
    }

    #[test]
    fn submit_postfix_command_evaluates_directly() {
        let mut app = App::new();
        submit_line(&mut app, "postfix 5 1 2 + 4 * + 3 -");

        let entry = &app.history[0];
        assert_eq!(entry.result, Ok(14.0));
        assert_eq!(entry.postfix.as_deref(), Some("5 1 2 + 4 * + 3 -"));
    }

    #[test]
    fn submit_conversion_failure_keeps_no_postfix() {
        let mut app = App::new();
        submit_line(&mut app, "3 + 4)");

        let entry = &app.history[0];
        assert_eq!(entry.result, Err(CalcError::UnmatchedParenthesis));
        assert!(entry.postfix.is_none());
    }

    #[test]
    fn submit_quit_sets_flag_without_history() {
        let mut app = App::new();
        submit_line(&mut app, "quit");

        assert!(app.should_quit);
        assert!(app.history.is_empty());
    }

    #[test]
    fn navigate_history_restores_previous_input() {
        let mut app = App::new();
        submit_line(&mut app, "1 + 2");
        submit_line(&mut app, "3 * 4");

        app.navigate_history(-1);
        assert_eq!(app.input, "1 + 2");
        app.navigate_history(1);
        assert_eq!(app.input, "3 * 4");
    }

    #[test]
    fn remove_grapheme_takes_whole_cluster() {
        let mut app = App::new();
        app.input = "1a\u{0301}2".to_string();
        app.remove_grapheme(1);
        assert_eq!(app.input, "12");
    }

    #[test]
    fn move_cursor_by_words_stops_at_token_edges() {
        let mut app = App::new();
        app.input = "12 + 34".to_string();
        app.cursor_position = 7;

        app.move_cursor_by_words(-1);
        assert_eq!(app.cursor_position, 5);
        app.move_cursor_by_words(-1);
        assert_eq!(app.cursor_position, 3);
        app.move_cursor_by_words(1);
        assert_eq!(app.cursor_position, 5);
    }

    #[test]
    fn move_cursor_by_words_clamps_to_the_grapheme_count() {
        let mut app = App::new();
        // "a" followed by a combining acute is one cluster, but a cursor
        // advanced per char sits at 2
        app.input = "a\u{301}".to_string();
        app.cursor_position = 2;

        app.move_cursor_by_words(-1);
        assert_eq!(app.cursor_position, 0);
    }

    #[test]
    fn submit_details_suffix_flags_the_entry() {
        let mut app = App::new();
        submit_line(&mut app, "2 + 3 * 4 details");

        let entry = &app.history[0];
        assert_eq!(entry.input, "2 + 3 * 4");
        assert_eq!(entry.result, Ok(14.0));
        assert_eq!(entry.postfix.as_deref(), Some("2 3 4 * +"));
        assert!(entry.detailed_mode);
    }

    #[test]
    fn submit_clear_command_wipes_history() {
        let mut app = App::new();
        submit_line(&mut app, "1 + 2");
        submit_line(&mut app, "clear");

        assert!(app.history.is_empty());
        assert_eq!(app.cursor_history, 0);
        assert!(app.input.is_empty());
    }

    #[test]
    fn submit_help_command_opens_the_overlay() {
        let mut app = App::new();
        submit_line(&mut app, "help");

        assert!(app.show_help);
        assert!(app.history.is_empty());
        assert!(app.input.is_empty());
    }
}
