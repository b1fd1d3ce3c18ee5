/// Overwrite confirmation for an existing output file.
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Ask whether `path` may be overwritten. Only the first character of the
/// answer counts: `Y`, `y`, or just Enter means yes; anything else, including
/// end of input, means no.
pub fn confirm_overwrite<R, W>(input: &mut R, output: &mut W, path: &Path) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(
        output,
        "The specified output file ({}) already exists. Do you want to overwrite it? [Y/n]: ",
        path.display()
    )?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    Ok(matches!(answer.chars().next(), Some('Y' | 'y' | '\n' | '\r')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(answer: &str) -> bool {
        let mut input = answer.as_bytes();
        let mut output = Vec::new();
        let ok = confirm_overwrite(&mut input, &mut output, Path::new("/tmp/out.csv")).unwrap();
        assert!(String::from_utf8(output).unwrap().contains("/tmp/out.csv"));
        ok
    }

    #[test]
    fn accepts_y_and_enter() {
        assert!(ask("y\n"));
        assert!(ask("Y\n"));
        assert!(ask("\n"));
        assert!(ask("y\r\n"));
        assert!(ask("yes please\n"));
    }

    #[test]
    fn anything_else_cancels() {
        assert!(!ask("n\n"));
        assert!(!ask("no\n"));
        assert!(!ask(" y\n"));
        assert!(!ask(""));
    }
}
