use std::fmt;

use crate::{matches_wildcard, Error, FilterContentType, ParameterMatching};

/// One media range read from an `Accept` header.
///
/// Spans borrow from the header and are kept exactly as written, surrounding
/// whitespace included.
#[derive(Clone, PartialEq, Debug)]
pub struct MediaTypeCandidate<'a> {
    type_: &'a str,
    subtype: &'a str,
    parameters: Vec<&'a str>,
    quality: f64,
}

impl<'a> MediaTypeCandidate<'a> {
    pub fn type_(&self) -> &'a str {
        self.type_
    }

    pub fn subtype(&self) -> &'a str {
        self.subtype
    }

    /// Raw `key=value` spans in header order, quality excluded.
    pub fn parameters(&self) -> &[&'a str] {
        &self.parameters
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    /// Whether this range covers `filter`, e.g. `text/*` covers `text/plain`.
    pub fn is_superset_of(&self, filter: &FilterContentType, matching: ParameterMatching) -> bool {
        matches_wildcard(self.type_, filter.type_())
            && matches_wildcard(self.subtype, filter.subtype())
            && matching.is_satisfied(&self.parameters, filter)
    }
}

impl fmt::Display for MediaTypeCandidate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{};q={}", self.type_, self.subtype, self.quality)?;
        for param in &self.parameters {
            write!(f, ";{param}")?;
        }
        Ok(())
    }
}

/// Reads an `Accept` header one media range at a time.
#[derive(Clone, Debug)]
pub(crate) struct CandidateParser<'a> {
    header: &'a str,
    position: usize,
}

impl<'a> CandidateParser<'a> {
    pub(crate) fn new(header: &'a str) -> Self {
        Self {
            header,
            position: 0,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.position >= self.header.len()
    }

    /// Parses the range starting at the cursor and moves the cursor past its
    /// terminating comma.
    ///
    /// `Ok(None)` means the range had no `type/subtype` and should be
    /// skipped. Only a malformed quality value is an error.
    pub(crate) fn parse_next(&mut self) -> Result<Option<MediaTypeCandidate<'a>>, Error> {
        let header = self.header;
        let bytes = header.as_bytes();

        let mut type_ = None;
        let mut subtype = None;
        let mut parameters = Vec::new();
        let mut quality = 1.;

        let mut start = self.position;
        let mut end = bytes.len();
        let mut next = bytes.len();

        let mut cursor = self.position;
        while cursor < bytes.len() {
            match bytes[cursor] {
                b'/' if type_.is_none() && subtype.is_none() => {
                    type_ = Some(&header[start..cursor]);
                    start = cursor + 1;
                }
                b';' => {
                    let segment = &header[start..cursor];
                    match subtype {
                        None => subtype = Some(segment),
                        Some(_) => push_segment(segment, &mut quality, &mut parameters)?,
                    }
                    start = cursor + 1;
                }
                b',' => {
                    end = cursor;
                    next = cursor + 1;
                    break;
                }
                _ => {}
            }
            cursor += 1;
        }

        let segment = &header[start..end];
        match subtype {
            None => subtype = Some(segment),
            Some(_) => push_segment(segment, &mut quality, &mut parameters)?,
        }
        self.position = next;

        Ok(type_.zip(subtype).map(|(type_, subtype)| MediaTypeCandidate {
            type_,
            subtype,
            parameters,
            quality,
        }))
    }
}

fn push_segment<'a>(
    segment: &'a str,
    quality: &mut f64,
    parameters: &mut Vec<&'a str>,
) -> Result<(), Error> {
    if let Some(value) = quality_value(segment) {
        let value = value
            .trim()
            .parse::<f64>()
            .map_err(|err| Error::InvalidQuality { source: err })?;
        if !value.is_finite() {
            return Err(Error::NonFiniteQuality);
        }
        *quality = value;
    } else if !segment.trim().is_empty() {
        parameters.push(segment);
    }
    Ok(())
}

fn quality_value(segment: &str) -> Option<&str> {
    let segment = segment.trim_start();
    segment
        .get(..2)
        .filter(|key| key.eq_ignore_ascii_case("q="))
        .map(|_| &segment[2..])
}
