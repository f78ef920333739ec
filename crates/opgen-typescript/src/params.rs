/// One formal parameter of a generated TypeScript function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionParam {
    pub name: String,
    pub ty: Option<String>,
    pub required: bool,
    pub default: Option<String>,
    /// Disabled parameters are skipped when rendering.
    pub enabled: bool,
}

impl FunctionParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            required: true,
            default: None,
            enabled: true,
        }
    }

    pub fn typed(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn render(&self) -> String {
        // A default value makes the parameter optional on its own; `?` and an
        // initializer cannot be combined.
        let marker = if self.required || self.default.is_some() {
            ""
        } else {
            "?"
        };
        let mut out = format!("{}{marker}", self.name);
        if let Some(ty) = &self.ty {
            out.push_str(": ");
            out.push_str(ty);
        }
        if let Some(default) = &self.default {
            out.push_str(" = ");
            out.push_str(default);
        }
        out
    }
}

/// Ordered parameter list; parameters keep their position whether or not
/// their neighbours are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionParams {
    params: Vec<FunctionParam>,
}

impl FunctionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, param: FunctionParam) -> &mut Self {
        self.params.push(param);
        self
    }

    pub fn extend(&mut self, params: impl IntoIterator<Item = FunctionParam>) -> &mut Self {
        self.params.extend(params);
        self
    }

    pub fn render(&self) -> String {
        self.enabled()
            .map(FunctionParam::render)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn enabled(&self) -> impl Iterator<Item = &FunctionParam> {
        self.params.iter().filter(|p| p.enabled)
    }
}
