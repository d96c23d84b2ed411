//! Template parameter substitution.
//!
//! Batch printing renders the same label once per parameter row. Text
//! content, QR data and barcode data may contain `{{name}}` placeholders
//! which are replaced from the row before layout. Placeholders with no
//! matching value are left verbatim so the missing column is visible on the
//! printed label.

use std::borrow::Cow;
use std::collections::BTreeMap;

use super::item::{ItemKind, LabelItem};

/// One row of parameter values, keyed by placeholder name.
pub type ParameterValues = BTreeMap<String, String>;

/// Replace `{{name}}` placeholders in `template`.
///
/// Whitespace inside the braces is ignored (`{{ name }}` works).
/// Borrows when nothing was replaced.
///
/// ```
/// use labelpress::label::{substitute, ParameterValues};
///
/// let mut row = ParameterValues::new();
/// row.insert("sku".into(), "A-17".into());
/// assert_eq!(substitute("SKU {{sku}}", &row), "SKU A-17");
/// assert_eq!(substitute("{{missing}}", &row), "{{missing}}");
/// ```
pub fn substitute<'a>(template: &'a str, values: &ParameterValues) -> Cow<'a, str> {
    if values.is_empty() || !template.contains("{{") {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut replaced = false;

    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        let name = after_open[..close].trim();
        out.push_str(&rest[..open]);
        match values.get(name) {
            Some(value) => {
                out.push_str(value);
                replaced = true;
            }
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }

    if !replaced {
        return Cow::Borrowed(template);
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Apply a parameter row to every text, QR and barcode item.
pub fn apply_parameters(items: &[LabelItem], values: &ParameterValues) -> Vec<LabelItem> {
    items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            match &mut item.kind {
                ItemKind::Text(t) => {
                    if let Cow::Owned(s) = substitute(&t.content, values) {
                        t.content = s;
                    }
                }
                ItemKind::Qr(q) => {
                    if let Cow::Owned(s) = substitute(&q.data, values) {
                        q.data = s;
                    }
                }
                ItemKind::Barcode(b) => {
                    if let Cow::Owned(s) = substitute(&b.data, values) {
                        b.data = s;
                    }
                }
                ItemKind::Image(_) | ItemKind::Shape(_) => {}
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> ParameterValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_multiple() {
        let values = row(&[("a", "1"), ("b", "two")]);
        assert_eq!(substitute("{{a}}-{{ b }}-{{a}}", &values), "1-two-1");
    }

    #[test]
    fn test_substitute_borrows_without_placeholders() {
        let values = row(&[("a", "1")]);
        assert!(matches!(substitute("plain", &values), Cow::Borrowed(_)));
    }

    #[test]
    fn test_substitute_unclosed() {
        let values = row(&[("a", "1")]);
        assert_eq!(substitute("{{a}} {{a", &values), "1 {{a");
    }

    #[test]
    fn test_substitute_keeps_unknown_next_to_known() {
        let values = row(&[("a", "1")]);
        assert_eq!(substitute("{{x}}{{a}}", &values), "{{x}}1");
    }

    #[test]
    fn test_apply_parameters_touches_codes() {
        let items = vec![
            LabelItem::text("Name: {{name}}", 20.0),
            LabelItem::qr("https://x.test/{{id}}", 40),
        ];
        let values = row(&[("name", "Ada"), ("id", "42")]);
        let out = apply_parameters(&items, &values);
        assert!(matches!(&out[0].kind, ItemKind::Text(t) if t.content == "Name: Ada"));
        assert!(matches!(&out[1].kind, ItemKind::Qr(q) if q.data == "https://x.test/42"));
    }
}
