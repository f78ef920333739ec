use serde::Serialize;

use crate::manager::ResolvedFile;

/// Where an imported symbol comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImportSource {
    /// A package specifier, written as-is (`swr/mutation`).
    Module(String),
    /// Another generated file, by its path from the output root. Printers
    /// make it relative to the importing file.
    File(String),
}

impl ImportSource {
    pub fn as_str(&self) -> &str {
        match self {
            ImportSource::Module(s) | ImportSource::File(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportEntry {
    pub symbol: String,
    pub source: ImportSource,
    pub type_only: bool,
    pub is_default: bool,
    /// Local binding of a named import (`symbol as alias`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ImportEntry {
    pub fn value(symbol: impl Into<String>, source: ImportSource) -> Self {
        Self {
            symbol: symbol.into(),
            source,
            type_only: false,
            is_default: false,
            alias: None,
        }
    }

    pub fn type_only(symbol: impl Into<String>, source: ImportSource) -> Self {
        Self {
            type_only: true,
            ..Self::value(symbol, source)
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name the symbol is bound to in the importing file.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub exported: bool,
    /// Type parameters, without the surrounding angle brackets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generics: Option<String>,
    /// Rendered parameter list, without parentheses.
    pub params: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// JSDoc lines, without comment markers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jsdoc: Vec<String>,
    /// Function body, already indented.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    pub name: String,
    pub exported: bool,
    /// Right-hand side of the alias.
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jsdoc: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Function(FunctionDecl),
    Type(TypeDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(f) => &f.name,
            Declaration::Type(t) => &t.name,
        }
    }
}

impl From<FunctionDecl> for Declaration {
    fn from(decl: FunctionDecl) -> Self {
        Declaration::Function(decl)
    }
}

impl From<TypeDecl> for Declaration {
    fn from(decl: TypeDecl) -> Self {
        Declaration::Type(decl)
    }
}

/// One generated file, ready to be printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedFile {
    pub file: ResolvedFile,
    pub imports: Vec<ImportEntry>,
    pub declarations: Vec<Declaration>,
}

impl SynthesizedFile {
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }
}

/// Accumulates imports, then declarations, into a [`SynthesizedFile`].
#[derive(Debug)]
pub struct FileBuilder {
    file: ResolvedFile,
    imports: Vec<ImportEntry>,
    declarations: Vec<Declaration>,
}

impl FileBuilder {
    pub fn new(file: ResolvedFile) -> Self {
        Self {
            file,
            imports: Vec::new(),
            declarations: Vec::new(),
        }
    }

    /// Add an import. Duplicates by `(symbol, alias, source)` are merged, with a
    /// value import taking precedence over a type-only one; imports from the
    /// file itself are skipped.
    pub fn import(&mut self, entry: ImportEntry) -> &mut Self {
        if entry.source == ImportSource::File(self.file.path.clone()) {
            return self;
        }
        match self
            .imports
            .iter_mut()
            .find(|i| i.symbol == entry.symbol && i.alias == entry.alias && i.source == entry.source)
        {
            Some(existing) => {
                existing.type_only &= entry.type_only;
                existing.is_default |= entry.is_default;
            }
            None => self.imports.push(entry),
        }
        self
    }

    pub fn imports(&mut self, entries: impl IntoIterator<Item = ImportEntry>) -> &mut Self {
        for entry in entries {
            self.import(entry);
        }
        self
    }

    pub fn declare(&mut self, declaration: impl Into<Declaration>) -> &mut Self {
        self.declarations.push(declaration.into());
        self
    }

    pub fn build(self) -> SynthesizedFile {
        SynthesizedFile {
            file: self.file,
            imports: self.imports,
            declarations: self.declarations,
        }
    }
}
