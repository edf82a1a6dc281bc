//! `Accept` header negotiation over the registered formatters.

use std::cmp::Ordering;

use lectern_docs::SharedFormatter;

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
}

impl MediaRange {
    /// Parses `type/subtype[;param]*`. Returns `None` for malformed ranges.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(';');
        let essence = parts.next()?.trim();
        let (kind, subtype) = essence.split_once('/')?;
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if kind.is_empty() || subtype.is_empty() || (kind == "*" && subtype != "*") {
            return None;
        }

        let mut quality = 1.0;
        for param in parts {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse::<f32>().ok()?.clamp(0.0, 1.0);
                }
            }
        }

        Some(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            quality,
        })
    }

    /// The `q` value, 1.0 when absent.
    #[must_use]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// 2 for `type/sub`, 1 for `type/*`, 0 for `*/*`.
    #[must_use]
    pub fn specificity(&self) -> u8 {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }

    /// Whether `media_type` falls inside this range.
    #[must_use]
    pub fn matches(&self, media_type: &str) -> bool {
        let Some((kind, subtype)) = media_type.split_once('/') else {
            return false;
        };
        (self.kind == "*" || self.kind.eq_ignore_ascii_case(kind))
            && (self.subtype == "*" || self.subtype.eq_ignore_ascii_case(subtype))
    }
}

/// Parses an `Accept` header into acceptable ranges, most preferred first.
///
/// Ranges with `q=0` and malformed entries are dropped. Ties on quality go
/// to the more specific range, then to header order.
#[must_use]
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter(|raw| !raw.trim().is_empty())
        .filter_map(MediaRange::parse)
        .filter(|range| range.quality > 0.0)
        .collect();

    // sort_by is stable, so header order breaks remaining ties.
    ranges.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.specificity().cmp(&a.specificity()))
    });
    ranges
}

/// The formatter and media type chosen for a response.
#[derive(Debug, Clone)]
pub struct Negotiated {
    /// Formatter that will serialize the document.
    pub formatter: SharedFormatter,
    /// Value for the `Content-Type` header.
    pub media_type: &'static str,
}

/// Picks a formatter for the given `Accept` header.
///
/// Falls back to the first formatter's default media type when nothing in
/// the header is acceptable. Returns `None` only when no formatter is
/// registered or the first one declares no media types.
#[must_use]
pub fn negotiate(accept: Option<&str>, formatters: &[SharedFormatter]) -> Option<Negotiated> {
    let ranges = accept.map(parse_accept).unwrap_or_default();

    for range in &ranges {
        for formatter in formatters {
            if let Some(media_type) = formatter
                .media_types()
                .iter()
                .find(|media_type| range.matches(media_type))
            {
                return Some(Negotiated {
                    formatter: formatter.clone(),
                    media_type: *media_type,
                });
            }
        }
    }

    let formatter = formatters.first()?;
    let media_type = *formatter.media_types().first()?;
    if accept.is_some() {
        tracing::debug!(
            accept = accept.unwrap_or_default(),
            fallback = media_type,
            "no acceptable media type, using the default formatter"
        );
    }
    Some(Negotiated {
        formatter: formatter.clone(),
        media_type,
    })
}
