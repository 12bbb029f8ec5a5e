use std::{mem, vec};

use tracing::{debug, trace};

use crate::{
    candidate::CandidateParser, Error, FilterContentType, MediaTypeCandidate, ParameterMatching,
};

#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct MatcherOptions {
    /// Iterate the header even when it lists `*/*`, instead of treating it
    /// as "accept anything".
    pub respect_literal_header: bool,
    pub parameter_matching: ParameterMatching,
}

#[derive(Debug)]
enum State<'a> {
    Parsing {
        parser: CandidateParser<'a>,
        buffer: Vec<MediaTypeCandidate<'a>>,
    },
    Replay {
        pending: vec::IntoIter<MediaTypeCandidate<'a>>,
    },
}

/// Walks the media ranges of an `Accept` header in preference order.
///
/// Parsing is lazy: a range with quality 1 is produced as soon as it is read,
/// so a header opening with the preferred type is never scanned to the end.
/// Lower quality ranges compatible with every filter are kept aside and
/// replayed, best first, once the whole header has been read. Ranges of
/// equal quality replay in header order.
///
/// Construction already advances to the first range, see
/// [`has_valid_values`](Self::has_valid_values) and [`current`](Self::current).
#[derive(Debug)]
pub struct MediaTypeMatcher<'a> {
    accept_header: &'a str,
    filters: &'a [FilterContentType],
    parameter_matching: ParameterMatching,
    state: State<'a>,
    current: Option<MediaTypeCandidate<'a>>,
    has_valid_values: bool,
}

impl<'a> MediaTypeMatcher<'a> {
    pub fn new(header: &'a str, respect_literal_header: bool) -> Result<Self, Error> {
        Self::with_filters(header, respect_literal_header, &[])
    }

    pub fn with_filters(
        header: &'a str,
        respect_literal_header: bool,
        filters: &'a [FilterContentType],
    ) -> Result<Self, Error> {
        Self::with_options(
            header,
            MatcherOptions {
                respect_literal_header,
                ..MatcherOptions::default()
            },
            filters,
        )
    }

    pub fn with_options(
        header: &'a str,
        options: MatcherOptions,
        filters: &'a [FilterContentType],
    ) -> Result<Self, Error> {
        let accepts_anything =
            header.is_empty() || (!options.respect_literal_header && header.contains("*/*"));

        let (accept_header, state) = if accepts_anything {
            debug!(accept_header = header, "accept header treated as accept anything");
            (
                "",
                State::Replay {
                    pending: Vec::new().into_iter(),
                },
            )
        } else {
            (
                header,
                State::Parsing {
                    parser: CandidateParser::new(header),
                    buffer: Vec::new(),
                },
            )
        };

        let mut matcher = Self {
            accept_header,
            filters,
            parameter_matching: options.parameter_matching,
            state,
            current: None,
            has_valid_values: false,
        };
        matcher.has_valid_values = matcher.advance()?;
        Ok(matcher)
    }

    /// The header being matched, empty when it was taken as "accept anything".
    pub fn accept_header(&self) -> &'a str {
        self.accept_header
    }

    /// Whether construction found at least one range to offer.
    pub fn has_valid_values(&self) -> bool {
        self.has_valid_values
    }

    /// Moves to the next range, returning `false` once none is left.
    ///
    /// An invalid quality value anywhere in the part of the header read by
    /// this call fails the whole negotiation.
    pub fn advance(&mut self) -> Result<bool, Error> {
        if let State::Parsing { parser, buffer } = &mut self.state {
            while !parser.is_done() {
                let Some(candidate) = parser.parse_next()? else {
                    continue;
                };
                if candidate.quality() >= 1. && !parser.is_done() {
                    trace!(%candidate, "top quality candidate");
                    self.current = Some(candidate);
                    return Ok(true);
                }
                if is_compatible(self.filters, self.parameter_matching, &candidate) {
                    trace!(%candidate, "candidate kept for replay");
                    insert_sorted(buffer, candidate);
                }
            }

            let buffer = mem::take(buffer);
            debug!(kept = buffer.len(), "accept header fully parsed");
            self.state = State::Replay {
                pending: buffer.into_iter(),
            };
        }

        match &mut self.state {
            State::Replay { pending } => match pending.next() {
                Some(candidate) => {
                    self.current = Some(candidate);
                    Ok(true)
                }
                None => Ok(false),
            },
            State::Parsing { .. } => Ok(false),
        }
    }

    /// Canonical form of the latest range, `type/subtype;q=quality;params...`.
    pub fn current(&self) -> Option<String> {
        self.current.as_ref().map(ToString::to_string)
    }

    pub fn current_candidate(&self) -> Option<&MediaTypeCandidate<'a>> {
        self.current.as_ref()
    }

    /// Whether the latest range covers `filter`. False before any range was
    /// produced.
    pub fn is_superset_of(&self, filter: &FilterContentType) -> bool {
        self.current
            .as_ref()
            .is_some_and(|candidate| candidate.is_superset_of(filter, self.parameter_matching))
    }

    /// Whether `candidate` covers every filter this matcher was built with.
    pub fn is_compatible(&self, candidate: &MediaTypeCandidate<'_>) -> bool {
        is_compatible(self.filters, self.parameter_matching, candidate)
    }

    /// Every valid range of the header in the order written, ignoring
    /// quality and filters. Does not move the matcher.
    pub fn collect_all(&self) -> Result<Vec<String>, Error> {
        let mut parser = CandidateParser::new(self.accept_header);
        let mut all = Vec::new();
        while !parser.is_done() {
            if let Some(candidate) = parser.parse_next()? {
                all.push(candidate.to_string());
            }
        }
        Ok(all)
    }
}

fn is_compatible(
    filters: &[FilterContentType],
    matching: ParameterMatching,
    candidate: &MediaTypeCandidate<'_>,
) -> bool {
    filters
        .iter()
        .all(|filter| candidate.is_superset_of(filter, matching))
}

fn insert_sorted<'a>(buffer: &mut Vec<MediaTypeCandidate<'a>>, candidate: MediaTypeCandidate<'a>) {
    let index = buffer
        .iter()
        .position(|kept| kept.quality() < candidate.quality())
        .unwrap_or(buffer.len());
    buffer.insert(index, candidate);
}
