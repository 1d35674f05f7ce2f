//! Line-oriented prompts over any reader/writer pair

use std::io::{self, BufRead, Write};

use crate::validate::Rule;

/// End of input is reported as `UnexpectedEof` so menus unwind to exit
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `label` and read one trimmed line
    pub fn line(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(buf.trim().to_string())
    }

    /// Read until a non-empty line is entered
    pub fn required(&mut self, label: &str) -> io::Result<String> {
        loop {
            let value = self.line(label)?;
            if !value.is_empty() {
                return Ok(value);
            }
            writeln!(self.output, "A value is required.")?;
        }
    }

    /// Read a number within `range`, re-prompting on bad input
    pub fn number(&mut self, label: &str, range: std::ops::RangeInclusive<u32>) -> io::Result<u32> {
        loop {
            match self.line(label)?.parse::<u32>() {
                Ok(n) if range.contains(&n) => return Ok(n),
                _ => writeln!(
                    self.output,
                    "Please enter a number from {} to {}.",
                    range.start(),
                    range.end()
                )?,
            }
        }
    }

    /// Menu choice; anything unparseable becomes 0, which no menu uses
    pub fn choice(&mut self) -> io::Result<u32> {
        Ok(self.line("Enter choice: ")?.parse().unwrap_or(0))
    }

    /// Read until `parse` accepts the line
    pub fn parsed<T>(
        &mut self,
        label: &str,
        message: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> io::Result<T> {
        loop {
            let value = self.line(label)?;
            if let Some(parsed) = parse(&value) {
                return Ok(parsed);
            }
            writeln!(self.output, "Invalid input. {}", message)?;
        }
    }

    /// Like [`Prompt::parsed`], but a blank line returns `None`
    pub fn parsed_or_skip<T>(
        &mut self,
        label: &str,
        message: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> io::Result<Option<T>> {
        let label = format!("{}(press Enter to skip) ", label);
        loop {
            let value = self.line(&label)?;
            if value.is_empty() {
                return Ok(None);
            }
            if let Some(parsed) = parse(&value) {
                return Ok(Some(parsed));
            }
            writeln!(self.output, "Invalid input. {}", message)?;
        }
    }

    pub fn matching(&mut self, label: &str, rule: &Rule) -> io::Result<String> {
        self.parsed(label, rule.message, |v| rule.matches(v).then(|| v.to_string()))
    }

    pub fn matching_or_skip(&mut self, label: &str, rule: &Rule) -> io::Result<Option<String>> {
        self.parsed_or_skip(label, rule.message, |v| {
            rule.matches(v).then(|| v.to_string())
        })
    }

    pub fn confirm(&mut self, label: &str) -> io::Result<bool> {
        Ok(self.line(label)?.eq_ignore_ascii_case("y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Rules;
    use std::io::Cursor;

    fn prompt(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_line_trims_and_reports_eof() {
        let mut p = prompt("  hello \n");
        assert_eq!(p.line("> ").unwrap(), "hello");
        let err = p.line("> ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_number_retries_until_in_range() {
        let mut p = prompt("abc\n150\n95\n");
        assert_eq!(p.number("Score: ", 0..=100).unwrap(), 95);
        let output = String::from_utf8(p.output).unwrap();
        assert_eq!(output.matches("Please enter a number").count(), 2);
    }

    #[test]
    fn test_matching_optional_blank_skips() {
        let rules = Rules::new().unwrap();
        let mut p = prompt("\n");
        assert_eq!(p.matching_or_skip("Phone: ", &rules.phone).unwrap(), None);
    }

    #[test]
    fn test_matching_rejects_then_accepts() {
        let rules = Rules::new().unwrap();
        let mut p = prompt("12345\n0917123456\n");
        assert_eq!(
            p.matching("Phone: ", &rules.phone).unwrap(),
            "0917123456"
        );
    }

    #[test]
    fn test_choice_defaults_to_zero() {
        let mut p = prompt("x\n3\n");
        assert_eq!(p.choice().unwrap(), 0);
        assert_eq!(p.choice().unwrap(), 3);
    }
}
