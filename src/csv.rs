//! Utilities for working with CSV files. Comma-separated, no quoting or escape
//! handling; the round exports this crate consumes never embed commas in fields.

use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::ops::Index;
use std::path::Path;

/// A line-oriented CSV reader that consumes the header row on open and maps
/// column names to ordinals.
pub struct CsvReader {
    header: Vec<String>,
    lines: Lines<BufReader<File>>,
}
impl CsvReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::open(path)?;
        let mut lines = BufReader::new(file).lines();
        let header = match lines.next() {
            None => vec![],
            Some(line) => split(&line?),
        };
        Ok(Self { header, lines })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Ordinal of a named column, if present in the header.
    pub fn ordinal(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|name| name == column)
    }
}

impl Iterator for CsvReader {
    type Item = Result<Vec<String>, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(|line| line.map(|line| split(&line)))
    }
}

fn split(line: &str) -> Vec<String> {
    line.split(',').map(|frag| frag.trim().to_string()).collect()
}

pub struct CsvWriter {
    writer: BufWriter<File>,
}
impl CsvWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn append<R>(&mut self, record: R) -> Result<(), io::Error>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut first = true;
        for datum in record {
            if !first {
                self.writer.write_all(b",")?;
            }
            first = false;
            self.writer.write_all(datum.as_ref().as_bytes())?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }
}

/// A fixed-width output record whose cells are addressed by a column enum
/// convertible to an ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    items: Vec<String>,
}
impl Record {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: vec![String::new(); capacity],
        }
    }

    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        Self {
            items: values.into_iter().map(|value| value.to_string()).collect(),
        }
    }

    pub fn set(&mut self, ordinal: impl Into<usize>, value: impl ToString) {
        self.items[ordinal.into()] = value.to_string();
    }
}

impl IntoIterator for Record {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<I: Into<usize>> Index<I> for Record {
    type Output = str;

    fn index(&self, index: I) -> &Self::Output {
        &self.items[index.into()]
    }
}
