//! URL segmentation utilities.
//!
//! These are pure functions over path text; none of them touch a socket or
//! a device. They exist because the dispatcher needs to peel a RESTCONF
//! path apart one segment at a time, optionally pulling a `=device-id`
//! marker out of the first segment along the way.

/// Splits `path` at the first occurrence of `delim`, after first consuming
/// a single leading `delim` if present.
///
/// Returns `(segment, remainder)`. `remainder` does not include the
/// consumed delimiter. If `delim` does not occur, the whole (leading-
/// delimiter-stripped) path is returned as the segment and the remainder
/// is empty.
///
/// ```
/// use restconf_core::url::shift;
/// assert_eq!(shift("/data/car:tires", '/'), ("data".to_string(), "car:tires".to_string()));
/// assert_eq!(shift("data", '/'), ("data".to_string(), String::new()));
/// ```
pub fn shift(path: &str, delim: char) -> (String, String) {
    let rest = path.strip_prefix(delim).unwrap_or(path);
    match rest.find(delim) {
        Some(idx) => (
            rest[..idx].to_string(),
            rest[idx + delim.len_utf8()..].to_string(),
        ),
        None => (rest.to_string(), String::new()),
    }
}

/// Splits a path segment that may carry an optional `key=value`-shaped
/// parameter ahead of the next segment delimiter, e.g. `restconf=dev1/data`.
///
/// Returns `(segment-before-param-delim, optional-value, remainder-after-
/// seg-delim)`. A leading `seg_delim` is consumed first, mirroring [`shift`].
///
/// ```
/// use restconf_core::url::shift_optional_param;
/// assert_eq!(
///     shift_optional_param("/restconf=dev1/data", '=', '/'),
///     ("restconf".to_string(), Some("dev1".to_string()), "data".to_string()),
/// );
/// assert_eq!(
///     shift_optional_param("/restconf/data", '=', '/'),
///     ("restconf".to_string(), None, "data".to_string()),
/// );
/// ```
pub fn shift_optional_param(
    path: &str,
    param_delim: char,
    seg_delim: char,
) -> (String, Option<String>, String) {
    let rest = path.strip_prefix(seg_delim).unwrap_or(path);
    let (segment, remainder) = match rest.find(seg_delim) {
        Some(idx) => (&rest[..idx], &rest[idx + seg_delim.len_utf8()..]),
        None => (rest, ""),
    };
    match segment.find(param_delim) {
        Some(idx) => (
            segment[..idx].to_string(),
            Some(segment[idx + param_delim.len_utf8()..].to_string()),
            remainder.to_string(),
        ),
        None => (segment.to_string(), None, remainder.to_string()),
    }
}

/// Extracts the device id from a URL of the shape `.../restconf=ID/...`.
/// Returns an empty string when the marker is absent.
///
/// ```
/// use restconf_core::url::find_device_id_in_url;
/// assert_eq!(find_device_id_in_url("http://h/restconf=dev7/data"), "dev7");
/// assert_eq!(find_device_id_in_url("http://h/restconf/data"), "");
/// ```
pub fn find_device_id_in_url(addr: &str) -> String {
    const MARKER: &str = "/restconf=";
    match addr.find(MARKER) {
        Some(pos) => {
            let rest = &addr[pos + MARKER.len()..];
            match rest.find('/') {
                Some(idx) => rest[..idx].to_string(),
                None => rest.to_string(),
            }
        }
        None => String::new(),
    }
}

/// Splits an absolute URL `scheme://host[:port]/seg/{module}:{path}` into
/// `(base, module, path)`, where `base` includes the trailing slash before
/// the module-qualified segment.
///
/// The module name is everything between the *last* `/` before the first
/// `:` and that colon, not everything after the first `/` past the host —
/// a path like `.../restconf/data/car:tires` has several slashes ahead of
/// the colon, and only the last one bounds the module name.
pub fn split_address(full_url: &str) -> Result<(String, String, String), crate::error::RestconfError> {
    let double_slash = full_url
        .find("//")
        .ok_or_else(|| crate::error::RestconfError::invalid_value("address missing scheme separator"))?;
    let after_scheme = double_slash + 2;
    let path_start_rel = full_url[after_scheme..]
        .find('/')
        .ok_or_else(|| crate::error::RestconfError::invalid_value("address missing path"))?;
    let path_start = after_scheme + path_start_rel;
    let colon_idx = path_start
        + full_url[path_start..]
            .find(':')
            .ok_or_else(|| crate::error::RestconfError::invalid_value("address missing module qualifier"))?;
    let module_begin = full_url[..colon_idx]
        .rfind('/')
        .ok_or_else(|| crate::error::RestconfError::invalid_value("address missing path"))?;
    let base = &full_url[..=module_begin];
    let module = &full_url[module_begin + 1..colon_idx];
    let path = &full_url[colon_idx + 1..];
    Ok((base.to_string(), module.to_string(), path.to_string()))
}

/// Appends `segment` to `base`, inserting exactly one `/` between them.
pub fn append_segment(base: &str, segment: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{segment}")
    } else {
        format!("{base}/{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shift_consumes_leading_delim_once() {
        assert_eq!(shift("//a/b", '/'), ("".to_string(), "a/b".to_string()));
    }

    #[test]
    fn shift_no_delim_returns_whole_segment() {
        assert_eq!(shift("leaf", '/'), ("leaf".to_string(), String::new()));
    }

    #[test]
    fn shift_optional_param_without_param() {
        assert_eq!(
            shift_optional_param("restconf/data", '=', '/'),
            ("restconf".to_string(), None, "data".to_string())
        );
    }

    #[test]
    fn shift_optional_param_last_segment() {
        assert_eq!(
            shift_optional_param("restconf=dev1", '=', '/'),
            ("restconf".to_string(), Some("dev1".to_string()), String::new())
        );
    }

    #[test]
    fn find_device_id_absent() {
        assert_eq!(find_device_id_in_url("http://h/restconf/data"), "");
    }

    #[test]
    fn find_device_id_present() {
        assert_eq!(
            find_device_id_in_url("http://h/restconf=abc-123/data/x:y"),
            "abc-123"
        );
    }

    #[test]
    fn find_device_id_trailing_with_no_slash() {
        assert_eq!(find_device_id_in_url("http://h/restconf=abc"), "abc");
    }

    #[test]
    fn split_address_happy_path() {
        let (base, module, path) = split_address("http://h.example/restconf/data/car:tires/front").unwrap();
        assert_eq!(base, "http://h.example/restconf/data/");
        assert_eq!(module, "car");
        assert_eq!(path, "tires/front");
    }

    #[test]
    fn split_address_uses_last_slash_before_colon() {
        let (base, module, path) = split_address("http://h.example/restconf/data/car:tire=0/pressure").unwrap();
        assert_eq!(base, "http://h.example/restconf/data/");
        assert_eq!(module, "car");
        assert_eq!(path, "tire=0/pressure");
    }

    #[test]
    fn split_address_rejects_missing_colon() {
        assert!(split_address("http://h.example/restconf/data/tires").is_err());
    }

    #[test]
    fn append_segment_inserts_single_slash() {
        assert_eq!(append_segment("http://h/", "data"), "http://h/data");
        assert_eq!(append_segment("http://h", "data"), "http://h/data");
    }

    proptest! {
        #[test]
        fn shift_never_panics(s in "\\PC*") {
            let _ = shift(&s, '/');
            let _ = shift(&s, ':');
        }

        #[test]
        fn shift_recombination_without_leading_delim(seg in "[a-zA-Z0-9]{0,12}", rest in "[a-zA-Z0-9]{0,12}") {
            let path = format!("{seg}/{rest}");
            let (got_seg, got_rest) = shift(&path, '/');
            prop_assert_eq!(got_seg, seg);
            prop_assert_eq!(got_rest, rest);
        }

        #[test]
        fn find_device_id_never_panics(s in "\\PC*") {
            let _ = find_device_id_in_url(&s);
        }
    }
}
