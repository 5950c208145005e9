use super::error::ApiError;
use hexbot::GenerationConfig;
use regex::Regex;
use std::sync::LazyLock;

/// One or two groups of three hex digits at the end of the string.
static SEED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[0-9a-fA-F]{3}){1,2}$").expect("seed pattern is a valid regex")
});

/// A validated generation request, ready to hand to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub count: usize,
    /// Raw `(width, height)`; sanitized by [`hexbot::Dimensions::new`].
    pub dimensions: Option<(i64, i64)>,
    /// Seeds reduced to their trailing three or six hex digits.
    pub seeds: Vec<String>,
}

impl GenerationRequest {
    /// Builds a request from decoded query pairs.
    ///
    /// Only the first value of a repeated parameter is used.
    ///
    /// - `count`: missing or empty means 1.
    /// - `width`/`height`: used only when both are present. A value that is
    ///   not an integer counts as 0, which sanitizes to 1.
    /// - `seed`: comma-separated; entries without a trailing hex color are
    ///   dropped.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidCount`] if `count` is not a non-negative integer.
    /// - [`ApiError::CountTooLarge`] if `count` exceeds `max_count`.
    pub fn from_query(pairs: &[(String, String)], max_count: usize) -> Result<Self, ApiError> {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let count = match first("count") {
            None | Some("") => 1,
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| ApiError::InvalidCount {
                value: raw.to_string(),
            })?,
        };
        if count > max_count {
            return Err(ApiError::CountTooLarge {
                count,
                max: max_count,
            });
        }

        let dimensions = match (first("width"), first("height")) {
            (Some(w), Some(h)) => Some((parse_side(w), parse_side(h))),
            _ => None,
        };

        let seeds = first("seed")
            .map(|raw| {
                filter_seeds(raw.split(','))
                    .into_iter()
                    .filter_map(normalize_seed)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(Self {
            count,
            dimensions,
            seeds,
        })
    }

    pub fn into_config(self) -> GenerationConfig {
        let builder = GenerationConfig::builder()
            .count(self.count)
            .seeds(&self.seeds);
        match self.dimensions {
            Some((width, height)) => builder.dimensions(width, height).build(),
            None => builder.build(),
        }
    }
}

fn parse_side(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// Keeps the seeds that end in a three or six digit hex color, in order.
pub fn filter_seeds<'a, I>(seeds: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    seeds
        .into_iter()
        .filter(|seed| SEED_PATTERN.is_match(seed))
        .collect()
}

/// Reduces an accepted seed to the hex digits the pattern matched, e.g.
/// `#AABBCC` to `AABBCC`.
fn normalize_seed(seed: &str) -> Option<String> {
    SEED_PATTERN.find(seed).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexbot::{Dimensions, Rgb};

    fn pairs(query: &[(&str, &str)]) -> Vec<(String, String)> {
        query
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn filters_invalid_seeds() {
        assert_eq!(
            filter_seeds(["abc123", "zzz", "AABBCC"]),
            vec!["abc123", "AABBCC"]
        );
        assert_eq!(filter_seeds(["", "12", "12345g", "#fff"]), vec!["#fff"]);
    }

    #[test]
    fn normalizes_to_trailing_digits() {
        assert_eq!(normalize_seed("#AABBCC").as_deref(), Some("AABBCC"));
        assert_eq!(normalize_seed("1234567").as_deref(), Some("234567"));
        assert_eq!(normalize_seed("xyzabcd").as_deref(), Some("bcd"));
        assert_eq!(normalize_seed("zzz"), None);
    }

    #[test]
    fn defaults_to_a_single_plain_color() {
        let request = GenerationRequest::from_query(&[], 100).unwrap();
        assert_eq!(
            request,
            GenerationRequest {
                count: 1,
                dimensions: None,
                seeds: Vec::new()
            }
        );

        let request = GenerationRequest::from_query(&pairs(&[("count", "")]), 100).unwrap();
        assert_eq!(request.count, 1);
    }

    #[test]
    fn rejects_bad_counts() {
        assert_eq!(
            GenerationRequest::from_query(&pairs(&[("count", "-5")]), 100),
            Err(ApiError::InvalidCount {
                value: "-5".to_string()
            })
        );
        assert!(GenerationRequest::from_query(&pairs(&[("count", "lots")]), 100).is_err());
        assert_eq!(
            GenerationRequest::from_query(&pairs(&[("count", "101")]), 100),
            Err(ApiError::CountTooLarge { count: 101, max: 100 })
        );
    }

    #[test]
    fn first_value_wins() {
        let request =
            GenerationRequest::from_query(&pairs(&[("count", "3"), ("count", "9")]), 100).unwrap();
        assert_eq!(request.count, 3);
    }

    #[test]
    fn dimensions_need_both_sides() {
        let only_width = GenerationRequest::from_query(&pairs(&[("width", "5")]), 100).unwrap();
        assert_eq!(only_width.dimensions, None);

        let both = GenerationRequest::from_query(
            &pairs(&[("width", "-7"), ("height", "oops")]),
            100,
        )
        .unwrap();
        assert_eq!(both.dimensions, Some((-7, 0)));
        assert_eq!(
            both.into_config().dimensions(),
            Some(Dimensions::new(7, 1))
        );
    }

    #[test]
    fn seeds_reach_the_core_parsed() {
        let request = GenerationRequest::from_query(
            &pairs(&[("seed", "abc123,zzz,AABBCC,#0f0")]),
            100,
        )
        .unwrap();
        assert_eq!(request.seeds, vec!["abc123", "AABBCC", "0f0"]);
        assert_eq!(
            request.into_config().seeds(),
            &[
                Rgb::new(0xab, 0xc1, 0x23),
                Rgb::new(0xaa, 0xbb, 0xcc),
                Rgb::new(0x00, 0xff, 0x00)
            ]
        );
    }
}
