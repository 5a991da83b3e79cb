use std::{convert::Infallible, ops::Deref, str::FromStr};

const WILDCARD: &str = "*";
const WEAK_PREFIX: &str = "W/";

/**
The entity tags listed in an
[`If-Match`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-Match)
or
[`If-None-Match`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-None-Match)
header.

Each element is either the wildcard `*` or an unquoted tag value. Weak
markers are stripped during parsing, so `W/"a"` and `"a"` both produce
`a`. Elements that are not wrapped in a matching pair of double quotes
are dropped rather than rejecting the whole header.

```
use trillium_conditional::MatchList;
let list: MatchList = r#""aa", *, W/"bb", cc"#.parse().unwrap();
assert_eq!(&*list, ["aa", "*", "bb"]);
assert!(list.is_wildcard());
```
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchList(Vec<String>);

/// Parse an optional header value into a [`MatchList`]. Alias for
/// [`MatchList::parse`]
pub fn parse_match_list(header_value: Option<&str>) -> MatchList {
    MatchList::parse(header_value)
}

impl MatchList {
    /// Parse an optional header value. An absent header and an empty
    /// header both produce an empty list.
    pub fn parse(header_value: Option<&str>) -> Self {
        header_value
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter_map(parse_element)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// returns true if this list includes the `*` wildcard
    pub fn is_wildcard(&self) -> bool {
        self.0.iter().any(|tag| tag == WILDCARD)
    }

    /// returns true if this list includes exactly the provided tag
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// consumes this list, returning the contained tags
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

fn parse_element(element: &str) -> Option<&str> {
    if element == WILDCARD {
        return Some(element);
    }

    let element = element.strip_prefix(WEAK_PREFIX).unwrap_or(element);
    if element.len() > 2 && element.starts_with('"') && element.ends_with('"') {
        Some(&element[1..element.len() - 1])
    } else {
        None
    }
}

impl FromStr for MatchList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(Some(s)))
    }
}

impl Deref for MatchList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl<S: Into<String>> FromIterator<S> for MatchList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for MatchList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MatchList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(s: &str) -> Vec<String> {
        MatchList::parse(Some(s)).into_inner()
    }

    #[test]
    fn absent_and_empty() {
        assert!(MatchList::parse(None).is_empty());
        assert!(parse_match_list(Some("")).is_empty());
        assert!(parse_match_list(Some(" , ,")).is_empty());
    }

    #[test]
    fn quoted_tags() {
        assert_eq!(parse(r#""aa""#), ["aa"]);
        assert_eq!(parse(r#""aa", "bb""#), ["aa", "bb"]);
        assert_eq!(parse(r#""aa",*,"bb""#), ["aa", "*", "bb"]);
        assert_eq!(parse(r#"  "aa"  ,   "bb"  "#), ["aa", "bb"]);
    }

    #[test]
    fn weak_tags() {
        assert_eq!(parse(r#"W/"w1""#), ["w1"]);
        assert_eq!(parse(r#"W/"w1", W/"w2""#), ["w1", "w2"]);
        assert_eq!(parse(r#"W/"w1", "s1""#), ["w1", "s1"]);
    }

    #[test]
    fn quoted_wildcard() {
        let list = MatchList::parse(Some(r#""*""#));
        assert_eq!(&*list, ["*"]);
        assert!(list.is_wildcard());
    }

    #[test]
    fn malformed_elements_are_dropped() {
        assert!(parse("aa").is_empty());
        assert!(parse(r#""""#).is_empty());
        assert!(parse(r#"""#).is_empty());
        assert!(parse("W/").is_empty());
        assert!(parse("W/aa").is_empty());
        assert!(parse(r#""aa"#).is_empty());
        assert!(parse(r#"aa""#).is_empty());
        assert_eq!(parse(r#"aa, "bb", 'cc', "dd"#), ["bb"]);
        assert_eq!(parse(r#"**, "bb""#), ["bb"]);
    }

    #[test]
    fn lookups() {
        let list: MatchList = r#""xyzzy", W/"abc""#.parse().unwrap();
        assert!(list.contains_tag("xyzzy"));
        assert!(list.contains_tag("abc"));
        assert!(!list.contains_tag("\"xyzzy\""));
        assert!(!list.is_wildcard());
        assert_eq!(list.len(), 2);
    }
}
