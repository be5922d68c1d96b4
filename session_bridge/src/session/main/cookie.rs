use std::borrow::Cow;

use http::header::{COOKIE, HeaderMap};

/// Value of the first cookie called `cookie_name` across all `Cookie` headers.
///
/// Values are unquoted and percent-decoded the way browsers' cookie libraries
/// do it; a value that fails to decode is returned verbatim.
pub(crate) fn get_cookie_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let found = headers.get_all(COOKIE).iter().find_map(|header| {
        let cookie_str = String::from_utf8_lossy(header.as_bytes());
        find_cookie(&cookie_str, cookie_name)
    });

    if found.is_none() {
        tracing::debug!("No session cookie '{}' found in cookies", cookie_name);
    }

    found
}

fn find_cookie(cookie_str: &str, cookie_name: &str) -> Option<String> {
    cookie_str.split(';').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name.trim() == cookie_name).then(|| decode_cookie_value(value.trim()).into_owned())
    })
}

fn decode_cookie_value(raw: &str) -> Cow<'_, str> {
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw);

    if unquoted.contains('%') {
        urlencoding::decode(unquoted).unwrap_or(Cow::Borrowed(unquoted))
    } else {
        Cow::Borrowed(unquoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers_with(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn test_no_cookie_header() {
        assert_eq!(get_cookie_from_headers(&HeaderMap::new(), "osu_session"), None);
    }

    #[test]
    fn test_finds_named_cookie() {
        let headers = headers_with(&["theme=dark; osu_session=abc; locale=en"]);
        assert_eq!(
            get_cookie_from_headers(&headers, "osu_session"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_ignores_similarly_named_cookies() {
        let headers = headers_with(&["xosu_session=nope; osu_session_old=nope"]);
        assert_eq!(get_cookie_from_headers(&headers, "osu_session"), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let headers = headers_with(&["osu_session=first; osu_session=second"]);
        assert_eq!(
            get_cookie_from_headers(&headers, "osu_session"),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_searches_every_cookie_header() {
        let headers = headers_with(&["theme=dark", "osu_session=abc"]);
        assert_eq!(
            get_cookie_from_headers(&headers, "osu_session"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_value_keeps_equals_signs() {
        let headers = headers_with(&["osu_session=eyJpdiI6IjEifQ=="]);
        assert_eq!(
            get_cookie_from_headers(&headers, "osu_session"),
            Some("eyJpdiI6IjEifQ==".to_string())
        );
    }

    #[test]
    fn test_percent_decoding_and_quotes() {
        let headers = headers_with(&["osu_session=\"eyJpdiI6IjEifQ%3D%3D\""]);
        assert_eq!(
            get_cookie_from_headers(&headers, "osu_session"),
            Some("eyJpdiI6IjEifQ==".to_string())
        );
    }

    #[test]
    fn test_invalid_percent_encoding_is_kept() {
        assert_eq!(decode_cookie_value("abc%FF"), "abc%FF");
    }

    #[test]
    fn test_empty_value() {
        let headers = headers_with(&["osu_session="]);
        assert_eq!(
            get_cookie_from_headers(&headers, "osu_session"),
            Some(String::new())
        );
    }

    #[test]
    fn test_non_utf8_header_does_not_hide_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(
            COOKIE,
            HeaderValue::from_bytes(b"name=caf\xe9; osu_session=abc").unwrap(),
        );
        assert_eq!(
            get_cookie_from_headers(&headers, "osu_session"),
            Some("abc".to_string())
        );
    }
}
