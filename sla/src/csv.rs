//! Functions for reading/writing CSV format.
use crate::Error;
use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};
use serde::Serialize;
use std::io::Cursor;

/// Parse raw CSV rows from string, the rows can have different lengths.
pub(crate) fn parse_rows(s: &str) -> Result<Vec<StringRecord>, Error> {
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(s))
        .records()
        .collect::<Result<_, _>>()?)
}

/// Dump CSV to string. The header is taken from the field names.
pub fn dump_csv<'a, C, S>(c: C) -> Result<String, Error>
where
    C: Into<std::borrow::Cow<'a, [S]>>,
    S: Serialize + Clone + 'a,
{
    let mut w = Writer::from_writer(Vec::new());
    let v = c.into().into_owned();
    v.into_iter().try_for_each(|c| w.serialize(c))?;
    into_string(w)
}

/// Dump raw rows to CSV string, the rows can have different lengths.
pub(crate) fn dump_rows<I, R>(rows: I) -> Result<String, Error>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut w = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    rows.into_iter().try_for_each(|r| w.write_record(r))?;
    into_string(w)
}

fn into_string(w: Writer<Vec<u8>>) -> Result<String, Error> {
    let buf = w
        .into_inner()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(buf).map_err(|e| Error::Io(std::io::Error::other(e)))
}
