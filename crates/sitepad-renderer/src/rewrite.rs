//! Static link rewriting for preview documents.
//!
//! Only the reference attributes of `<link href>`, `<script src>` and
//! `<img src>` are touched. Everything else in the document, including
//! whitespace and attribute quoting, is passed through byte for byte.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::resource::ResourceHandle;
use crate::site_map::SiteMap;

/// Quoted attribute values may contain `>`.
const ATTRS: &str = r#"(?:[^>"']|"[^"]*"|'[^']*')*"#;

/// Comments and `<script>` bodies are matched whole so that nothing inside
/// them is mistaken for a tag.
fn markup_regex() -> &'static Regex {
    static RE_MARKUP: OnceLock<Regex> = OnceLock::new();
    RE_MARKUP.get_or_init(|| {
        Regex::new(&format!(
            r"(?is)(?P<comment><!--.*?-->)|(?P<script><script\b{ATTRS}>)(?P<body>.*?</script\s*>)|(?P<tag><(?P<name>link|script|img)\b{ATTRS}>)"
        ))
        .unwrap()
    })
}

/// One attribute per match, so quoted values are consumed with their name.
fn attr_regex() -> &'static Regex {
    static RE_ATTR: OnceLock<Regex> = OnceLock::new();
    RE_ATTR.get_or_init(|| {
        Regex::new(
            r#"(\s)([^\s"'>/=]+)(?:(\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#,
        )
        .unwrap()
    })
}

fn scheme_regex() -> &'static Regex {
    static RE_SCHEME: OnceLock<Regex> = OnceLock::new();
    RE_SCHEME.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap())
}

/// Whether a reference is an absolute URL (`http:`, `data:`, `//host`, ...).
pub fn has_scheme(reference: &str) -> bool {
    reference.starts_with("//") || scheme_regex().is_match(reference)
}

/// The handle a reference resolves to, if it is site-relative and the site
/// has a resource at that address.
pub fn resolve_reference<'a>(
    reference: &str,
    site_map: &'a SiteMap,
) -> Option<&'a ResourceHandle> {
    if reference.is_empty() || has_scheme(reference) {
        return None;
    }
    site_map.get(&SiteMap::address_for(reference))
}

/// Rewrite every resolvable static reference in `html` to its handle.
///
/// References that are absolute, or that name no built resource, are left
/// exactly as written.
pub fn rewrite_links(html: &str, site_map: &SiteMap) -> String {
    let mut rewritten = 0usize;
    let out = markup_regex().replace_all(html, |m: &Captures| {
        if let Some(script) = m.name("script") {
            let (text, changed) = rewrite_tag(script.as_str(), "src", site_map);
            rewritten += usize::from(changed);
            return format!("{text}{}", &m["body"]);
        }
        let (Some(tag), Some(name)) = (m.name("tag"), m.name("name")) else {
            return m[0].to_owned();
        };
        let wanted = if name.as_str().eq_ignore_ascii_case("link") {
            "href"
        } else {
            "src"
        };
        let (text, changed) = rewrite_tag(tag.as_str(), wanted, site_map);
        rewritten += usize::from(changed);
        text
    });
    tracing::trace!(rewritten, "static links rewritten");
    out.into_owned()
}

fn rewrite_tag(tag: &str, wanted: &str, site_map: &SiteMap) -> (String, bool) {
    let mut seen = false;
    let mut changed = false;
    let out = attr_regex().replace_all(tag, |attr: &Captures| {
        let whole = attr[0].to_owned();
        if seen || !attr[2].eq_ignore_ascii_case(wanted) {
            return whole;
        }
        seen = true;

        let (value, quote) = match (attr.get(4), attr.get(5), attr.get(6)) {
            (Some(v), _, _) => (v.as_str(), "\""),
            (_, Some(v), _) => (v.as_str(), "'"),
            (_, _, Some(v)) => (v.as_str(), ""),
            _ => return whole,
        };
        match resolve_reference(value, site_map) {
            Some(handle) => {
                changed = true;
                format!("{}{}{}{quote}{handle}{quote}", &attr[1], &attr[2], &attr[3])
            }
            None => whole,
        }
    });
    (out.into_owned(), changed)
}
