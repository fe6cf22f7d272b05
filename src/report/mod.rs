use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write_delimited(
    path: &Path,
    delimiter: &str,
    header: &[&str],
    rows: &[Vec<String>],
) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{}", header.join(delimiter))?;
    for row in rows {
        writeln!(w, "{}", row.join(delimiter))?;
    }
    w.flush()?;
    Ok(())
}

pub fn format_metric(v: f64) -> String {
    format!("{:.6}", v)
}
