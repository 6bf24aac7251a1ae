#[cfg(all(feature = "line", not(feature = "tui")))]
mod line_mode;
#[cfg(feature = "tui")]
mod render_help;
#[cfg(feature = "tui")]
mod tui_mode;

#[cfg(feature = "tui")]
fn main() -> anyhow::Result<()> {
    tui_mode::run_tui()
}

#[cfg(all(feature = "line", not(feature = "tui")))]
fn main() -> anyhow::Result<()> {
    line_mode::run_line()
}

#[cfg(not(any(feature = "tui", feature = "line")))]
fn main() {
    use std::io;

    println!("PostCalc");
    println!("Operators: +, -, *, / and parentheses");
    println!("Precedence: a pending + or / waits for a following - or *");
    println!("Type 'quit' to exit");

    loop {
        println!("\nEnter an expression:");

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("Goodbye!");
            break;
        }

        println!("= {}", postcalc::calculate(input));
    }
}
