//! Parses a RESTCONF data path (the part after `{module}:`) into segments,
//! splitting list-entry keys off with `=`.

/// One path segment: the schema identifier and, for list entries, the
/// (possibly compound) key value(s) taken from `ident=key1,key2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub ident: String,
    pub keys: Vec<String>,
}

impl PathSegment {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            keys: Vec::new(),
        }
    }
}

/// Splits a path like `tire=front-left/pressure` into
/// `[{ident: "tire", keys: ["front-left"]}, {ident: "pressure", keys: []}]`.
/// Empty segments (leading/trailing/doubled `/`) are dropped.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((ident, keys)) => PathSegment {
                ident: ident.to_string(),
                keys: keys.split(',').map(str::to_string).collect(),
            },
            None => PathSegment::new(segment),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_segments() {
        assert_eq!(parse_path("a/b/c"), vec![PathSegment::new("a"), PathSegment::new("b"), PathSegment::new("c")]);
    }

    #[test]
    fn parses_list_key() {
        assert_eq!(
            parse_path("tire=front-left/pressure"),
            vec![
                PathSegment { ident: "tire".into(), keys: vec!["front-left".into()] },
                PathSegment::new("pressure"),
            ]
        );
    }

    #[test]
    fn parses_compound_key() {
        let segs = parse_path("entry=a,b,c");
        assert_eq!(segs[0].keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_path_yields_no_segments() {
        assert!(parse_path("").is_empty());
        assert!(parse_path("/").is_empty());
    }
}
