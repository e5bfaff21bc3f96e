use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;

/// Creates (or truncates) `path` for buffered writing, creating missing
/// parent directories first.
pub fn create_file_buf_write<P: AsRef<Path>>(path: P) -> io::Result<BufWriter<File>> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let file = File::create(path)?;
    Ok(BufWriter::new(file))
}

pub fn open_file_buf_read<P: AsRef<Path>>(path: P) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    Ok(BufReader::new(file))
}

pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> io::Result<()> {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

// directly copied from [https://doc.rust-lang.org/std/io/trait.BufRead.html#method.has_data_left]
// unfortunately, that method isn't stable yet
pub fn has_data_left<R: BufRead>(mut reader: R) -> io::Result<bool> {
    reader.fill_buf().map(|b| !b.is_empty())
}
