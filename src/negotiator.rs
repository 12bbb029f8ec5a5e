use tracing::trace;

use crate::{Error, FilterContentType, MatcherOptions, MediaTypeMatcher, ParameterMatching};

pub trait AsNegotiationStr {
    fn as_str(&self) -> &str;
}

impl AsNegotiationStr for &str {
    fn as_str(&self) -> &str {
        self
    }
}

impl AsNegotiationStr for String {
    fn as_str(&self) -> &str {
        self
    }
}

/// Chooses among the content types a server can produce, given an `Accept`
/// header.
///
/// Supported types are tried in the order they were registered for every
/// header range, ranges being walked by [`MediaTypeMatcher`].
#[derive(Clone, Debug)]
pub struct Negotiator<T> {
    supported: Vec<(FilterContentType, T)>,
    options: MatcherOptions,
}

impl<T> Negotiator<T>
where
    T: AsNegotiationStr,
{
    pub fn new<I>(iter: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
    {
        let supported = iter
            .into_iter()
            .map(|s| Ok((s.as_str().parse::<FilterContentType>()?, s)))
            .collect::<Result<Vec<_>, Error>>()?;
        if supported.is_empty() {
            return Err(Error::NoSupportedTypes);
        }
        Ok(Self {
            supported,
            options: MatcherOptions::default(),
        })
    }
}

impl<T> Negotiator<T> {
    pub fn respect_literal_header(mut self, respect: bool) -> Self {
        self.options.respect_literal_header = respect;
        self
    }

    pub fn parameter_matching(mut self, matching: ParameterMatching) -> Self {
        self.options.parameter_matching = matching;
        self
    }

    pub fn len(&self) -> usize {
        self.supported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supported.is_empty()
    }

    pub fn unwrap_first(&self) -> &T {
        &self.supported[0].1
    }

    /// Returns the supported value to respond with, `None` when the header
    /// accepts none of them.
    pub fn negotiate(&self, header: &str) -> Result<Option<&T>, Error> {
        let mut matcher = MediaTypeMatcher::with_options(header, self.options, &[])?;
        if matcher.accept_header().is_empty() {
            return Ok(self.supported.first().map(|(_, value)| value));
        }

        let mut available = matcher.has_valid_values();
        while available {
            if let Some((content_type, value)) = self
                .supported
                .iter()
                .find(|(content_type, _)| matcher.is_superset_of(content_type))
            {
                trace!(%content_type, "negotiated");
                return Ok(Some(value));
            }
            available = matcher.advance()?;
        }
        Ok(None)
    }
}
