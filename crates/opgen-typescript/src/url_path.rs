use opgen_core::naming::{Casing, apply_case};

/// A path template such as `/pets/{petId}`, with its TypeScript renderings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPath {
    path: String,
}

enum Segment<'a> {
    Literal(&'a str),
    Param(&'a str),
}

impl UrlPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Template literal with path parameters interpolated:
    /// `` `/pets/${petId}` ``.
    pub fn template(&self) -> String {
        let mut out = String::from("`");
        for segment in self.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(&text.replace('`', "\\`")),
                Segment::Param(name) => {
                    out.push_str("${");
                    out.push_str(&Self::identifier(name));
                    out.push('}');
                }
            }
        }
        out.push('`');
        out
    }

    /// Express-style form: `/pets/:petId`.
    pub fn to_url(&self) -> String {
        self.segments()
            .map(|segment| match segment {
                Segment::Literal(text) => text.to_string(),
                Segment::Param(name) => format!(":{}", Self::identifier(name)),
            })
            .collect()
    }

    /// The TypeScript identifier a path parameter is bound to.
    pub fn identifier(name: &str) -> String {
        apply_case(name, Casing::Camel)
    }

    fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        let mut rest = self.path.as_str();
        std::iter::from_fn(move || {
            if rest.is_empty() {
                return None;
            }
            match rest.find('{') {
                Some(0) => match rest.find('}') {
                    Some(end) => {
                        let name = &rest[1..end];
                        rest = &rest[end + 1..];
                        Some(Segment::Param(name))
                    }
                    // Unterminated brace: keep the remainder verbatim
                    None => {
                        let text = rest;
                        rest = "";
                        Some(Segment::Literal(text))
                    }
                },
                Some(start) => {
                    let text = &rest[..start];
                    rest = &rest[start..];
                    Some(Segment::Literal(text))
                }
                None => {
                    let text = rest;
                    rest = "";
                    Some(Segment::Literal(text))
                }
            }
        })
    }
}
