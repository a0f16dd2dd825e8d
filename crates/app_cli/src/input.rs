use std::io::{self, BufRead};

/// One line without its terminator, or `None` at end of input.
pub fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Free text ended by two consecutive blank lines (or end of input). Single
/// blank lines inside the text are kept; trailing ones are dropped.
pub fn read_multiline<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut lines = Vec::new();
    let mut blank_run = 0;
    while let Some(line) = read_line(input)? {
        if line.is_empty() {
            blank_run += 1;
            if blank_run >= 2 {
                break;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    Ok(lines.join("\n"))
}

/// Splits comma-separated tag input, trimming entries and dropping empty ones.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
