//! Terminal prompts

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Print `message` and read one trimmed line.
pub fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Ask a yes/no question; only `y` or `yes` confirm.
pub fn confirm(message: &str) -> Result<bool> {
    let answer = prompt(&format!("{} (y/n): ", message))?;
    Ok(is_yes(&answer))
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Read lines until an empty one.
pub fn read_multiline(message: &str) -> Result<String> {
    println!("{}", message);
    let stdin = io::stdin();
    read_until_blank(stdin.lock())
}

fn read_until_blank<R: BufRead>(reader: R) -> Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim_end_matches('\r').is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Read whitespace or newline separated items until an empty line.
pub fn read_items(message: &str) -> Result<Vec<String>> {
    let text = read_multiline(message)?;
    Ok(split_items(&text))
}

pub fn split_items(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}
