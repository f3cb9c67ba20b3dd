use anyhow::Context;
use std::io::{BufRead, BufReader, BufWriter, Write};

fn is_stdio(name: &str) -> bool {
    name == "-" || name == "stdin" || name == "stdout"
}

/// Opens `input` for buffered reading. `stdin` (or `-`) reads the standard
/// input, a `.gz` extension is decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = isat::reader("tests/bed/sites.bed").unwrap();
/// let lines = reader.lines().collect::<Vec<_>>();
/// assert_eq!(lines.len(), 6);
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if is_stdio(input) {
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

pub fn writer(output: &str) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if is_stdio(output) {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output)
            .with_context(|| format!("could not create {}", output))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}
