use std::{fmt, str::FromStr};

use crate::Error;

/// A concrete content type the server is able to produce.
///
/// Header candidates are checked against these with
/// [`MediaTypeCandidate::is_superset_of`](crate::MediaTypeCandidate::is_superset_of).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FilterContentType {
    type_: String,
    subtype: String,
    parameters: Vec<(String, String)>,
}

impl FilterContentType {
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            subtype: subtype.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }
}

impl FromStr for FilterContentType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(';');
        let left = parts.next().ok_or(Error::InvalidHeader)?.trim();

        let (main, sub) = left.split_once('/').ok_or(Error::MissingSeparator('/'))?;
        if sub.contains('/') {
            return Err(Error::TooManyParts);
        }
        let (main, sub) = (main.trim(), sub.trim());
        if main == "*" || sub == "*" {
            return Err(Error::InvalidWildcard);
        }

        let parameters = parts
            .map(str::trim)
            .filter(|param| !param.is_empty())
            .map(|param| {
                let (k, v) = param.split_once('=').ok_or(Error::InvalidHeader)?;
                let k = k.trim();
                if k.eq_ignore_ascii_case("q") {
                    return Err(Error::QualityNotAllowed);
                }
                Ok((k.to_owned(), v.trim().to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            type_: main.to_owned(),
            subtype: sub.to_owned(),
            parameters,
        })
    }
}

impl fmt::Display for FilterContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.parameters {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}

/// How the parameters of a header candidate are compared with those of a
/// [`FilterContentType`].
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub enum ParameterMatching {
    /// Every filter parameter the candidate mentions must carry the same
    /// value. Parameters the candidate leaves out are satisfied.
    #[default]
    Exact,
    /// Prefix/suffix comparison on the raw `key=value` spans where the first
    /// span starting with a filter parameter name settles the outcome, and a
    /// span ending with the filter value counts as a mismatch.
    Legacy,
}

impl ParameterMatching {
    pub(crate) fn is_satisfied(self, spans: &[&str], filter: &FilterContentType) -> bool {
        match self {
            ParameterMatching::Exact => exact_superset(spans, &filter.parameters),
            ParameterMatching::Legacy => legacy_superset(spans, &filter.parameters),
        }
    }
}

fn exact_superset(spans: &[&str], required: &[(String, String)]) -> bool {
    required.iter().all(|(name, value)| {
        spans
            .iter()
            .filter_map(|span| span.split_once('='))
            .filter(|(k, _)| k.trim().eq_ignore_ascii_case(name))
            .all(|(_, v)| unquote(v.trim()).eq_ignore_ascii_case(unquote(value)))
    })
}

fn legacy_superset(spans: &[&str], required: &[(String, String)]) -> bool {
    for (name, value) in required {
        for span in spans {
            if starts_with_ignore_case(span, name) {
                return !ends_with_ignore_case(span, value);
            }
        }
    }
    true
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn ends_with_ignore_case(haystack: &str, suffix: &str) -> bool {
    haystack
        .len()
        .checked_sub(suffix.len())
        .and_then(|start| haystack.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

#[cfg(test)]
mod tests {
    use super::{FilterContentType, ParameterMatching};
    use crate::Error;

    #[test]
    fn parse() {
        // Basic.
        assert_eq!(
            "text/plain".parse::<FilterContentType>().unwrap(),
            FilterContentType::new("text", "plain"),
        );

        // With one param.
        assert_eq!(
            "text/html;level=1".parse::<FilterContentType>().unwrap(),
            FilterContentType::new("text", "html").with_parameter("level", "1"),
        );

        // Param with space.
        assert_eq!(
            "text/html; level=1".parse::<FilterContentType>().unwrap(),
            FilterContentType::new("text", "html").with_parameter("level", "1"),
        );

        // Multiple params keep their order.
        assert_eq!(
            "text/html;origin=EU;level=1"
                .parse::<FilterContentType>()
                .unwrap()
                .parameters(),
            &[
                ("origin".to_owned(), "EU".to_owned()),
                ("level".to_owned(), "1".to_owned()),
            ]
        );

        assert_eq!(
            "text/plain;q=1".parse::<FilterContentType>().unwrap_err(),
            Error::QualityNotAllowed,
        );

        assert_eq!(
            "text/*".parse::<FilterContentType>().unwrap_err(),
            Error::InvalidWildcard
        );

        assert_eq!(
            "*/*".parse::<FilterContentType>().unwrap_err(),
            Error::InvalidWildcard
        );

        assert_eq!(
            "text".parse::<FilterContentType>().unwrap_err(),
            Error::MissingSeparator('/')
        );

        assert_eq!(
            "text/plain/extra".parse::<FilterContentType>().unwrap_err(),
            Error::TooManyParts
        );

        assert_eq!(
            "text/plain;flowed".parse::<FilterContentType>().unwrap_err(),
            Error::InvalidHeader
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            FilterContentType::new("text", "plain")
                .with_parameter("charset", "utf-8")
                .to_string(),
            "text/plain;charset=utf-8"
        );
    }

    #[test]
    fn exact_parameters() {
        let filter = FilterContentType::new("text", "plain").with_parameter("charset", "utf-8");
        let exact = ParameterMatching::Exact;

        // Absent is satisfied.
        assert!(exact.is_satisfied(&[], &filter));
        assert!(exact.is_satisfied(&["format=flowed"], &filter));
        // Equal values, ignoring case, spacing and quotes.
        assert!(exact.is_satisfied(&["charset=utf-8"], &filter));
        assert!(exact.is_satisfied(&[" CharSet=UTF-8"], &filter));
        assert!(exact.is_satisfied(&["charset=\"utf-8\""], &filter));
        // Different value.
        assert!(!exact.is_satisfied(&["charset=latin1"], &filter));
        // A filter without parameters accepts anything.
        assert!(exact.is_satisfied(&["charset=latin1"], &FilterContentType::new("text", "plain")));
    }

    #[test]
    fn legacy_parameters() {
        let filter = FilterContentType::new("text", "plain").with_parameter("charset", "utf-8");
        let legacy = ParameterMatching::Legacy;

        assert!(legacy.is_satisfied(&[], &filter));
        assert!(legacy.is_satisfied(&["format=flowed"], &filter));
        // Found and equal reads as a mismatch.
        assert!(!legacy.is_satisfied(&["charset=utf-8"], &filter));
        assert!(!legacy.is_satisfied(&["CHARSET=UTF-8"], &filter));
        // Found and different reads as a match.
        assert!(legacy.is_satisfied(&["charset=latin1"], &filter));

        // The first filter parameter found settles the whole check.
        let filter = filter.with_parameter("level", "1");
        assert!(legacy.is_satisfied(&["charset=latin1", "level=1"], &filter));
    }
}
