//! Outcome message carried by the page a form submission lands on
//!
//! After `POST /check` the backend redirects to its index page, which embeds
//! the flashed result as `<div id="toast" data-message="..." data-type="...">`.

use crate::status::StatusKind;

/// Flashed result of a form submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageToast {
    pub message: String,
    pub kind: StatusKind,
}

/// Find the toast element in `html` and read its message and type
///
/// Returns `None` when there is no toast element or its message is empty.
pub fn toast_from_page(html: &str) -> Option<PageToast> {
    let marker = html.find("id=\"toast\"")?;
    let start = html[..marker].rfind('<')?;
    let end = marker + html[marker..].find('>')?;
    let tag = &html[start..end];

    let message = decode_entities(attribute(tag, "data-message")?.trim());
    if message.is_empty() {
        return None;
    }

    let kind = match attribute(tag, "data-type").map(str::trim) {
        Some("error") | Some("danger") => StatusKind::Error,
        Some("success") => StatusKind::Success,
        _ => StatusKind::Info,
    };

    Some(PageToast { message, kind })
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let token = format!(" {}=\"", name);
    let start = tag.find(&token)? + token.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

/// Undo the escaping a template engine applies to attribute values
fn decode_entities(raw: &str) -> String {
    raw.replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&#34;", "\"")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_toast() {
        let html = r#"<body><div id="toast" class="toast" data-message="Library closed. Hours: 7 AM - 8 PM" data-type="error"></div></body>"#;
        assert_eq!(
            toast_from_page(html),
            Some(PageToast {
                message: "Library closed. Hours: 7 AM - 8 PM".into(),
                kind: StatusKind::Error,
            })
        );
    }

    #[test]
    fn test_success_toast_with_escaped_name() {
        let html = r#"<div data-type="success" id="toast" data-message="Welcome! Dara O&#39;Neil entered the library."></div>"#;
        let toast = toast_from_page(html).unwrap();
        assert_eq!(toast.kind, StatusKind::Success);
        assert_eq!(toast.message, "Welcome! Dara O'Neil entered the library.");
    }

    #[test]
    fn test_empty_or_missing_toast() {
        assert!(toast_from_page(r#"<div id="toast" data-message="" data-type="info"></div>"#).is_none());
        assert!(toast_from_page("<html><body>Welcome</body></html>").is_none());
    }

    #[test]
    fn test_unknown_type_reads_as_info() {
        let toast = toast_from_page(r#"<div id="toast" data-message="Hello"></div>"#).unwrap();
        assert_eq!(toast.kind, StatusKind::Info);
    }
}
