use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location inside a response body, e.g. `data[0].owner.name`.
///
/// Kept as segments while diffing; rendered to the dotted form only for output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath(Vec<Segment>);

impl JsonPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First segment only, i.e. the top-level field this path lives under.
    pub fn head(&self) -> JsonPath {
        Self(self.0.iter().take(1).cloned().collect())
    }

    /// Everything after the first segment.
    pub fn tail(&self) -> JsonPath {
        Self(self.0.iter().skip(1).cloned().collect())
    }
}

impl From<Vec<Segment>> for JsonPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl From<&[Segment]> for JsonPath {
    fn from(segments: &[Segment]) -> Self {
        Self(segments.to_vec())
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for JsonPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();
        let mut key = String::new();
        let mut chars = s.chars();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                    let mut digits = String::new();
                    for d in chars.by_ref() {
                        if d == ']' {
                            break;
                        }
                        digits.push(d);
                    }
                    let index = digits
                        .parse()
                        .map_err(|_| format!("invalid array index '{}' in path '{}'", digits, s))?;
                    segments.push(Segment::Index(index));
                }
                _ => key.push(c),
            }
        }
        if !key.is_empty() {
            segments.push(Segment::Key(key));
        }

        Ok(Self(segments))
    }
}

impl Serialize for JsonPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> Segment {
        Segment::Key(k.to_string())
    }

    #[test]
    fn test_render() {
        let path = JsonPath::from(vec![key("data"), Segment::Index(0), key("owner")]);
        assert_eq!(path.to_string(), "data[0].owner");

        let path = JsonPath::from(vec![Segment::Index(0), key("b")]);
        assert_eq!(path.to_string(), "[0].b");

        assert_eq!(JsonPath::root().to_string(), "");
    }

    #[test]
    fn test_parse_matches_render() {
        for text in ["name", "[0].b", "data[0].owner.name", "matrix[0][0]"] {
            let path: JsonPath = text.parse().unwrap();
            assert_eq!(path.to_string(), text);
        }
        assert!("items[x]".parse::<JsonPath>().is_err());
    }

    #[test]
    fn test_head_and_tail() {
        let path: JsonPath = "user.address.city".parse().unwrap();
        assert_eq!(path.head().to_string(), "user");
        assert_eq!(path.tail().to_string(), "address.city");
    }
}
