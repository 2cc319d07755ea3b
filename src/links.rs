//! Deep links and the outbound request form
//!
//! Items are deep-linked through the URL fragment `#item={uid}`. A client name arrives as
//! the `name` query parameter and enables the request form, which is pre-filled with the
//! title-cased name and the selected items.

use crate::config::RequestFormConfig;
use crate::types::Item;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn item_hash_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#item=(\d+)$").ok()).as_ref()
}

/// Parse a `#item=42` fragment into the item uid
pub fn parse_item_hash(hash: &str) -> Option<i64> {
    item_hash_regex()?
        .captures(hash)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Fragment for an open item; `None` clears it
pub fn item_hash(uid: Option<i64>) -> String {
    match uid {
        Some(uid) => format!("#item={}", uid),
        None => String::new(),
    }
}

/// Value of the `name` parameter in a query string such as `?name=jane%20doe`
///
/// The leading `?` is optional. An empty value counts as absent.
pub fn client_name_from_query(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Client name from a full page URL
pub fn client_name_from_url(url: &Url) -> Option<String> {
    url.query().and_then(client_name_from_query)
}

/// Upper-case the first character of every word
///
/// A word starts after any character that is not alphanumeric or `_`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        let in_word = c.is_alphanumeric() || c == '_';
        if in_word && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !in_word;
    }
    out
}

/// Newline-separated `- {name} ({section})` lines
pub fn item_list(items: &[Item]) -> String {
    items
        .iter()
        .map(|item| format!("- {} ({})", item.name, item.section))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pre-filled request form URL for `client_name` and the selected `items`
///
/// Returns `None` when there is no client name, nothing is selected, or no form is
/// configured.
pub fn request_form_url(
    config: &RequestFormConfig,
    client_name: Option<&str>,
    items: &[Item],
) -> Option<String> {
    let name = client_name.map(str::trim).filter(|n| !n.is_empty())?;
    if items.is_empty() || config.form_url.is_empty() {
        return None;
    }

    let separator = if config.form_url.contains('?') { '&' } else { '?' };
    Some(format!(
        "{}{}{}={}&{}={}",
        config.form_url,
        separator,
        config.name_entry,
        urlencoding::encode(&title_case(name)),
        config.items_entry,
        urlencoding::encode(&item_list(items)),
    ))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, section: &str) -> Item {
        Item {
            id: format!("rec_{}", name),
            uid: 1,
            name: name.to_string(),
            images: vec![],
            note: String::new(),
            section: section.to_string(),
            tags: String::new(),
            collections: vec![],
            size: String::new(),
            featured: false,
        }
    }

    fn form() -> RequestFormConfig {
        RequestFormConfig {
            form_url: "https://forms.example.com/d/e/abc/viewform?usp=pp_url".to_string(),
            name_entry: "entry.111".to_string(),
            items_entry: "entry.222".to_string(),
        }
    }

    #[test]
    fn test_parse_item_hash() {
        assert_eq!(parse_item_hash("#item=42"), Some(42));
        assert_eq!(parse_item_hash("#item=0"), Some(0));
        assert_eq!(parse_item_hash(""), None);
        assert_eq!(parse_item_hash("#item="), None);
        assert_eq!(parse_item_hash("#item=-3"), None);
        assert_eq!(parse_item_hash("#item=42x"), None);
        assert_eq!(parse_item_hash("item=42"), None);
        assert_eq!(parse_item_hash("#item=99999999999999999999"), None);
    }

    #[test]
    fn test_item_hash() {
        assert_eq!(item_hash(Some(7)), "#item=7");
        assert_eq!(item_hash(None), "");
        assert_eq!(parse_item_hash(&item_hash(Some(123))), Some(123));
    }

    #[test]
    fn test_client_name_from_query() {
        assert_eq!(client_name_from_query("?name=jane"), Some("jane".to_string()));
        assert_eq!(
            client_name_from_query("foo=1&name=jane%20doe"),
            Some("jane doe".to_string())
        );
        assert_eq!(
            client_name_from_query("name=mary+ann"),
            Some("mary ann".to_string())
        );
        assert_eq!(client_name_from_query("?name="), None);
        assert_eq!(client_name_from_query("?other=x"), None);
        assert_eq!(client_name_from_query(""), None);
    }

    #[test]
    fn test_client_name_from_url() {
        let url = Url::parse("https://closet.example.com/?name=frodo#item=3").unwrap();
        assert_eq!(client_name_from_url(&url), Some("frodo".to_string()));

        let bare = Url::parse("https://closet.example.com/").unwrap();
        assert_eq!(client_name_from_url(&bare), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("jane doe"), "Jane Doe");
        assert_eq!(title_case("mary-ann o'neil"), "Mary-Ann O'Neil");
        assert_eq!(title_case("ALREADY Up"), "ALREADY Up");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_request_form_url() {
        let items = vec![item("Silk Top Hat", "Hats"), item("Riding Boots", "Shoes")];
        let url = request_form_url(&form(), Some("jane doe"), &items).unwrap();

        assert_eq!(
            url,
            "https://forms.example.com/d/e/abc/viewform?usp=pp_url\
             &entry.111=Jane%20Doe\
             &entry.222=-%20Silk%20Top%20Hat%20%28Hats%29%0A-%20Riding%20Boots%20%28Shoes%29"
        );
    }

    #[test]
    fn test_request_form_requires_name_and_items() {
        let items = vec![item("Silk Top Hat", "Hats")];

        assert!(request_form_url(&form(), None, &items).is_none());
        assert!(request_form_url(&form(), Some("  "), &items).is_none());
        assert!(request_form_url(&form(), Some("jane"), &[]).is_none());
        assert!(request_form_url(&RequestFormConfig::default(), Some("jane"), &items).is_none());
    }

    #[test]
    fn test_request_form_url_without_existing_query() {
        let config = RequestFormConfig {
            form_url: "https://forms.example.com/f".to_string(),
            ..form()
        };
        let url = request_form_url(&config, Some("sam"), &[item("Cape", "Outerwear")]).unwrap();
        assert!(url.starts_with("https://forms.example.com/f?entry.111=Sam&entry.222="));
    }
}
