use anyhow::Context;
use std::io::{BufRead, BufReader, BufWriter, Write};

/// Open a file for buffered reading. `stdin` reads standard input and
/// files ending in `.gz` are decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = ancar::reader("tests/ancar/genomes.txt").unwrap();
/// let lines: Vec<_> = reader.lines().collect();
/// assert!(lines.len() > 3);
///
/// assert!(ancar::reader("tests/ancar/not-exists.txt").is_err());
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = std::path::Path::new(input);
        let file = std::fs::File::open(path)
            .with_context(|| format!("could not open {}", path.display()))?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// Open a file for buffered writing. `stdout` writes to the screen.
pub fn writer(output: &str) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output)
            .with_context(|| format!("could not create {}", output))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

/// Non-empty lines that do not start with `#`, trimmed, with 1-based line numbers.
pub fn read_data_lines(input: &str) -> anyhow::Result<Vec<(usize, String)>> {
    let mut lines = vec![];
    for (i, line) in reader(input)?.lines().enumerate() {
        let line = line.with_context(|| format!("{}: failed reading line {}", input, i + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        lines.push((i + 1, line.to_string()));
    }

    Ok(lines)
}
