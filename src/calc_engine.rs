use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Op(char),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Op(c) => write!(f, "{}", c),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    /// A closing parenthesis arrived with no `(` left on the operator stack.
    UnmatchedParenthesis,
    /// An operator reached the evaluator with fewer than two values available.
    InsufficientOperands { op: char },
    /// A symbol that is neither a number nor one of `+ - * /` reached the evaluator.
    UnrecognizedToken { token: char },
    /// Nothing to evaluate.
    EmptyInput,
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::UnmatchedParenthesis => write!(f, "Unmatched closing parenthesis"),
            CalcError::InsufficientOperands { op } => {
                write!(f, "Operator '{}' needs two operands", op)
            }
            CalcError::UnrecognizedToken { token } => {
                write!(f, "Unrecognized token '{}'", token)
            }
            CalcError::EmptyInput => write!(f, "Empty expression"),
        }
    }
}

impl std::error::Error for CalcError {}

/// Splits an expression into number and symbol tokens. Never fails: any
/// character outside the numeric grammar becomes a one-character symbol.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            '0'..='9' => {
                tokens.push(scan_number(&mut chars));
            }
            '.' if chars.clone().nth(1).is_some_and(|d| d.is_ascii_digit()) => {
                tokens.push(scan_number(&mut chars));
            }
            _ => {
                tokens.push(Token::Op(c));
                chars.next();
            }
        }
    }

    tokens
}

fn scan_number(chars: &mut Peekable<Chars<'_>>) -> Token {
    let mut num_str = String::new();
    let mut has_dot = false;

    while let Some(&ch) = chars.peek() {
        match ch {
            '0'..='9' => {
                num_str.push(ch);
                chars.next();
            }
            '.' if !has_dot => {
                has_dot = true;
                num_str.push(ch);
                chars.next();
            }
            'e' | 'E' => {
                // the marker only belongs to the literal when digits follow it
                let mut ahead = chars.clone();
                ahead.next();
                if matches!(ahead.peek(), Some('+') | Some('-')) {
                    ahead.next();
                }
                if !ahead.peek().is_some_and(|d| d.is_ascii_digit()) {
                    break;
                }

                num_str.push(ch);
                chars.next();
                if let Some(&sign) = chars.peek() {
                    if sign == '+' || sign == '-' {
                        num_str.push(sign);
                        chars.next();
                    }
                }
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    num_str.push(d);
                    chars.next();
                }
                break;
            }
            _ => break,
        }
    }

    // the scanned lexeme always matches the f64 grammar
    Token::Number(num_str.parse().unwrap_or(f64::NAN))
}

pub fn is_operator(c: char) -> bool {
    c == '+' || c == '/' || c == '-' || c == '*'
}

// '+' and '/' form the low tier, '-' and '*' the high tier; an operator is
// lower-precedence only across tiers, never within one.
fn is_lower_precedence(a: char, b: char) -> bool {
    (a == '/' || a == '+') && (b == '-' || b == '*')
}

/// Converts an infix token sequence to postfix order. The only failure is a
/// closing parenthesis with no matching `(` on the operator stack.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, CalcError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Token> = Vec::new();

    for &tok in tokens {
        match tok {
            Token::Number(_) => output.push(tok),
            Token::LParen => ops.push(tok),
            Token::Op(op) if is_operator(op) => {
                while let Some(&top) = ops.last() {
                    match top {
                        Token::Op(stacked) if !is_lower_precedence(stacked, op) => {
                            output.push(top);
                            ops.pop();
                        }
                        _ => break,
                    }
                }
                ops.push(tok);
            }
            // every other symbol closes a group, exactly like `)`
            _ => loop {
                match ops.pop() {
                    Some(Token::LParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(CalcError::UnmatchedParenthesis),
                }
            },
        }
    }

    // flush the pending operators; a leftover `(` ends the flush and drops
    // whatever sits beneath it
    while let Some(op) = ops.pop() {
        if matches!(op, Token::LParen) {
            break;
        }
        output.push(op);
    }

    Ok(output)
}

/// Runs the postfix stack machine over an already converted token sequence.
pub fn evaluate_tokens(tokens: &[Token]) -> Result<f64, CalcError> {
    let mut stack: Vec<f64> = Vec::new();

    for &tok in tokens {
        match tok {
            Token::Number(n) => stack.push(n),
            Token::Op(op) if is_operator(op) => {
                let right = stack.pop().ok_or(CalcError::InsufficientOperands { op })?;
                let left = stack.pop().ok_or(CalcError::InsufficientOperands { op })?;
                stack.push(combine(left, right, op));
            }
            Token::Op(op) => return Err(CalcError::UnrecognizedToken { token: op }),
            Token::LParen => return Err(CalcError::UnrecognizedToken { token: '(' }),
            Token::RParen => return Err(CalcError::UnrecognizedToken { token: ')' }),
        }
    }

    stack.pop().ok_or(CalcError::EmptyInput)
}

fn combine(left: f64, right: f64, op: char) -> f64 {
    match op {
        '+' => left + right,
        '-' => left - right,
        '*' => left * right,
        '/' => left / right,
        _ => f64::NAN,
    }
}

pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = Vec::new();
    for t in tokens {
        out.push(t.to_string());
    }
    out.join(" ")
}

/// Re-renders an expression with one space between tokens, e.g. for history
/// display. Numbers come back in their parsed form, so "1E2" turns into "100".
pub fn format_with_spaces(expr: &str) -> String {
    format_tokens(&tokenize(expr))
}

/// Evaluates an infix expression through the full pipeline.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let postfix = to_postfix(&tokenize(expression))?;
    evaluate_tokens(&postfix)
}

/// Evaluates a space-separated postfix expression directly.
pub fn evaluate_postfix(postfix: &str) -> Result<f64, CalcError> {
    evaluate_tokens(&tokenize(postfix))
}

/// Evaluates an infix expression, collapsing every failure to NaN. A NaN
/// result therefore means "malformed input" or "mathematically undefined"
/// without distinction; use [`evaluate`] to tell the two apart.
pub fn calculate(expression: &str) -> f64 {
    evaluate(expression).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix_of(expr: &str) -> String {
        let tokens =
            to_postfix(&tokenize(expr)).unwrap_or_else(|e| panic!("to_postfix({expr:?}): {e}"));
        format_tokens(&tokens)
    }

    fn eval_ok(expr: &str) -> f64 {
        evaluate(expr).unwrap_or_else(|e| panic!("evaluate({expr:?}): {e}"))
    }

    #[test]
    fn tokenize_integer_and_decimal_literals() {
        assert_eq!(tokenize("42"), vec![Token::Number(42.0)]);
        assert_eq!(tokenize("3.14"), vec![Token::Number(3.14)]);
        assert_eq!(tokenize(".5"), vec![Token::Number(0.5)]);
        assert_eq!(tokenize("3."), vec![Token::Number(3.0)]);
    }

    #[test]
    fn tokenize_exponent_literals() {
        assert_eq!(tokenize("1E2"), vec![Token::Number(100.0)]);
        assert_eq!(tokenize("2.5e-1"), vec![Token::Number(0.25)]);
        assert_eq!(tokenize("1e+4"), vec![Token::Number(10000.0)]);
        assert_eq!(tokenize(".5E2"), vec![Token::Number(50.0)]);
    }

    #[test]
    fn tokenize_exponent_marker_needs_digits() {
        assert_eq!(tokenize("1E"), vec![Token::Number(1.0), Token::Op('E')]);
        assert_eq!(
            tokenize("1e+"),
            vec![Token::Number(1.0), Token::Op('e'), Token::Op('+')]
        );
    }

    #[test]
    fn tokenize_symbols_and_whitespace() {
        assert_eq!(
            tokenize(" ( 1+2 ) *3 "),
            vec![
                Token::LParen,
                Token::Number(1.0),
                Token::Op('+'),
                Token::Number(2.0),
                Token::RParen,
                Token::Op('*'),
                Token::Number(3.0),
            ]
        );
    }

    #[test]
    fn tokenize_keeps_unknown_symbols() {
        assert_eq!(
            tokenize("2 @ 3"),
            vec![Token::Number(2.0), Token::Op('@'), Token::Number(3.0)]
        );
        assert_eq!(tokenize("."), vec![Token::Op('.')]);
    }

    #[test]
    fn postfix_low_tier_stays_under_high_tier() {
        // '+' is lower than '*', so it keeps waiting on the stack
        assert_eq!(postfix_of("2 + 3 * 4"), "2 3 4 * +");
        // '/' is lower than '*', giving 8 / (4 * 2) rather than (8 / 4) * 2
        assert_eq!(postfix_of("8 / 4 * 2"), "8 4 2 * /");
        assert_eq!(postfix_of("1 + 2 - 3"), "1 2 3 - +");
    }

    #[test]
    fn postfix_high_tier_pops_for_anything() {
        assert_eq!(postfix_of("2 * 3 + 4"), "2 3 * 4 +");
        assert_eq!(postfix_of("8 * 4 / 2"), "8 4 * 2 /");
        assert_eq!(postfix_of("1 - 2 + 3"), "1 2 - 3 +");
        // a pending '-' gives way to nothing, not even '*'
        assert_eq!(postfix_of("9 - 2 * 3"), "9 2 - 3 *");
        assert_eq!(postfix_of("2 + 6 / 4"), "2 6 + 4 /");
    }

    #[test]
    fn postfix_same_tier_is_left_associative() {
        assert_eq!(postfix_of("1 + 2 + 3"), "1 2 + 3 +");
        assert_eq!(postfix_of("2 - 3 - 4"), "2 3 - 4 -");
        assert_eq!(postfix_of("8 / 2 / 2"), "8 2 / 2 /");
    }

    #[test]
    fn postfix_parentheses_group_first() {
        assert_eq!(postfix_of("((1+2)*(3-1))"), "1 2 + 3 1 - *");
        assert_eq!(postfix_of("(2 + 3) * 4"), "2 3 + 4 *");
    }

    #[test]
    fn postfix_unmatched_close_paren_fails() {
        assert_eq!(
            to_postfix(&tokenize("3 + 4)")),
            Err(CalcError::UnmatchedParenthesis)
        );
        assert_eq!(
            to_postfix(&tokenize("1+2]")),
            Err(CalcError::UnmatchedParenthesis)
        );
    }

    #[test]
    fn postfix_open_paren_is_tolerated() {
        assert_eq!(postfix_of("(3+4"), "3 4 +");
        // operators buried under a leftover '(' never reach the output
        assert_eq!(postfix_of("((3+4*(5-1"), "3 4 5 1 -");
    }

    #[test]
    fn postfix_stray_symbol_closes_a_group() {
        assert_eq!(postfix_of("(1+2]"), "1 2 +");
    }

    #[test]
    fn evaluate_postfix_directly() {
        assert_eq!(evaluate_postfix("3 4 +"), Ok(7.0));
        assert_eq!(evaluate_postfix("2 3 4 * +"), Ok(14.0));
        assert_eq!(evaluate_postfix("5 1 2 + 4 * + 3 -"), Ok(14.0));
    }

    #[test]
    fn evaluate_postfix_failures() {
        assert_eq!(
            evaluate_postfix("3 +"),
            Err(CalcError::InsufficientOperands { op: '+' })
        );
        assert_eq!(
            evaluate_postfix("3 4 %"),
            Err(CalcError::UnrecognizedToken { token: '%' })
        );
        // parentheses never survive conversion, so the evaluator treats
        // them as stray symbols
        assert_eq!(
            evaluate_postfix("3 4 ("),
            Err(CalcError::UnrecognizedToken { token: '(' })
        );
        assert_eq!(
            evaluate_postfix("1 2 + )"),
            Err(CalcError::UnrecognizedToken { token: ')' })
        );
        assert_eq!(evaluate_postfix(""), Err(CalcError::EmptyInput));
        assert_eq!(evaluate_postfix("   "), Err(CalcError::EmptyInput));
    }

    #[test]
    fn evaluate_postfix_keeps_only_the_top_value() {
        assert_eq!(evaluate_postfix("1 2 3 +"), Ok(5.0));
        assert_eq!(evaluate_postfix("3 4"), Ok(4.0));
    }

    #[test]
    fn evaluate_uses_the_tier_rule() {
        assert_eq!(eval_ok("2 + 3 * 4"), 14.0);
        assert_eq!(eval_ok("2 * 3 + 4"), 10.0);
        assert_eq!(eval_ok("8 / 4 * 2"), 1.0);
        assert_eq!(eval_ok("9 - 2 * 3"), 21.0);
        assert_eq!(eval_ok("2 + 6 / 4"), 2.0);
        assert_eq!(eval_ok("((1+2)*(3-1))"), 6.0);
    }

    #[test]
    fn evaluate_ignores_spacing() {
        assert_eq!(eval_ok("2+3*4"), eval_ok(" 2 + 3 * 4 "));
    }

    #[test]
    fn evaluate_exponent_literals() {
        assert_eq!(eval_ok("1E2 + 1"), 101.0);
        assert_eq!(postfix_of("1E2 + 1"), "100 1 +");
    }

    #[test]
    fn evaluate_division_by_zero_is_not_an_error() {
        assert_eq!(evaluate("5 / 0"), Ok(f64::INFINITY));
        assert_eq!(evaluate("(0 - 5) / 0"), Ok(f64::NEG_INFINITY));
        assert!(matches!(evaluate("0 / 0"), Ok(v) if v.is_nan()));
    }

    #[test]
    fn evaluate_reports_typed_failures() {
        assert_eq!(evaluate("3 + 4)"), Err(CalcError::UnmatchedParenthesis));
        assert_eq!(
            evaluate("2 +"),
            Err(CalcError::InsufficientOperands { op: '+' })
        );
        assert_eq!(evaluate(""), Err(CalcError::EmptyInput));
        assert_eq!(evaluate(" \t "), Err(CalcError::EmptyInput));
    }

    #[test]
    fn calculate_collapses_failures_to_nan() {
        assert!(calculate("3 + 4)").is_nan());
        assert!(calculate("2 +").is_nan());
        assert!(calculate("").is_nan());
        assert!(calculate("3 @ 4").is_nan());
        // division by zero stays infinite, which is the only way a caller of
        // calculate can tell it apart from a malformed expression
        assert_eq!(calculate("5 / 0"), f64::INFINITY);
        assert_eq!(calculate("2 + 3 * 4"), 14.0);
        assert_eq!(calculate("3 4"), 4.0);
    }

    #[test]
    fn format_with_spaces_normalizes_input() {
        assert_eq!(format_with_spaces("2+3*4"), "2 + 3 * 4");
        assert_eq!(format_with_spaces("((1+2))"), "( ( 1 + 2 ) )");
        assert_eq!(format_with_spaces("1E2+1"), "100 + 1");
    }

    #[test]
    fn formatted_postfix_round_trips() {
        for expr in [
            "2 + 3 * 4",
            "2 * 3 + 4",
            "((1+2)*(3-1))",
            "8 / 4 * 2",
            "1E2 + 1",
            "0.5 * (2 - 3.25)",
        ] {
            let direct = evaluate(expr);
            let through_string = evaluate_postfix(&postfix_of(expr));
            assert_eq!(direct, through_string, "round trip diverged for {expr:?}");
        }
    }

    #[test]
    fn overflowing_literals_do_not_round_trip() {
        // "1E309" overflows to inf, which the numeric grammar cannot spell,
        // so its rendered postfix is display-only
        assert_eq!(evaluate("1E309"), Ok(f64::INFINITY));
        assert_eq!(postfix_of("1E309"), "inf");
        assert_eq!(
            evaluate_postfix("inf"),
            Err(CalcError::UnrecognizedToken { token: 'i' })
        );
    }
}
