use std::fmt;

use super::fields::FieldMap;

/// The view of a markup element that form signing needs.
///
/// Implement this for whatever document model the application renders
/// forms with. [`HtmlForm`] is a self-contained implementation.
pub trait FormElement {
    /// Lowercase tag name (`form`, `div`, ...).
    fn tag_name(&self) -> &str;

    /// Attribute value, if present.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Append `<input type="hidden" name=".." value="..">` as the last child.
    fn append_hidden(&mut self, name: &str, value: &str);
}

/// A hidden input appended to a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenInput {
    pub name: String,
    pub value: String,
}

/// Minimal in-memory element that renders to HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlForm {
    tag: String,
    attributes: Vec<(String, String)>,
    inputs: Vec<HiddenInput>,
}

impl HtmlForm {
    /// A `<form>` with the given `name` attribute.
    pub fn new(name: &str) -> Self {
        Self::element("form").with_attribute("name", name)
    }

    /// An arbitrary element with no attributes.
    pub fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Set an attribute, replacing an existing value.
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name, value.to_string())),
        }
        self
    }

    pub fn hidden_inputs(&self) -> &[HiddenInput] {
        &self.inputs
    }

    /// The fields a browser would submit for this element's hidden inputs.
    pub fn submitted_fields(&self) -> FieldMap {
        FieldMap::from_pairs(
            self.inputs
                .iter()
                .map(|input| (input.name.as_str(), input.value.as_str())),
        )
    }

    pub fn to_html(&self) -> String {
        let mut html = format!("<{}", self.tag);
        for (name, value) in &self.attributes {
            html.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        html.push('>');
        for input in &self.inputs {
            html.push_str(&format!(
                "\n  <input type=\"hidden\" name=\"{}\" value=\"{}\">",
                escape(&input.name),
                escape(&input.value)
            ));
        }
        if !self.inputs.is_empty() {
            html.push('\n');
        }
        html.push_str(&format!("</{}>", self.tag));
        html
    }
}

impl FormElement for HtmlForm {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn append_hidden(&mut self, name: &str, value: &str) {
        self.inputs.push(HiddenInput {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
}

impl fmt::Display for HtmlForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes() {
        let form = HtmlForm::new("contact").with_attribute("ACTION", "/send");
        assert_eq!(form.tag_name(), "form");
        assert_eq!(form.attribute("name"), Some("contact"));
        assert_eq!(form.attribute("action"), Some("/send"));
        assert_eq!(form.attribute("method"), None);

        let renamed = form.with_attribute("name", "other");
        assert_eq!(renamed.attribute("name"), Some("other"));
    }

    #[test]
    fn test_render_escapes() {
        let mut form = HtmlForm::new("a\"b");
        form.append_hidden("x[y]", "<&>");
        let html = form.to_html();

        assert!(html.starts_with("<form name=\"a&quot;b\">"));
        assert!(html.contains("<input type=\"hidden\" name=\"x[y]\" value=\"&lt;&amp;&gt;\">"));
        assert!(html.ends_with("</form>"));
    }

    #[test]
    fn test_submitted_fields() {
        let mut form = HtmlForm::new("contact");
        form.append_hidden("contact[verification][ip]", "10.0.0.1");
        form.append_hidden("contact[verification][name]", "contact");

        let fields = form.submitted_fields();
        let verification = fields
            .map("contact")
            .and_then(|c| c.map("verification"))
            .unwrap();
        assert_eq!(verification.text("ip"), Some("10.0.0.1"));
        assert_eq!(verification.text("name"), Some("contact"));
    }
}
