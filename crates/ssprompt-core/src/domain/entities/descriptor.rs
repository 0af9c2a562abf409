//! Project descriptor: the `<name>.yaml` file at the root of every prompt
//! project.
//!
//! ```yaml
//! meta:
//!   name: example
//!   version: 0.1.0
//!   description: ""
//!   tag: [common]
//!   author: ["Jane <jane@example.com>"]
//!   llm: [gpt-3.5-turbo]
//!   readme_format: md
//!   license: MIT
//! text_prompt:
//!   dirname: text
//! python_prompt:
//!   dirname: python
//!   list:
//!     - name: prompt
//!       dependencies:
//!         - langchain: ^0.0.266
//! ```
//!
//! The model is plain data. Parsing and rendering live behind the
//! `DescriptorCodec` port.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, SectionKind, VersionConstraint};

static META_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]\d?(\.([1-9]?\d)){2}$").expect("meta version pattern is valid")
});

const MAX_DESCRIPTION_LEN: usize = 255;

/// Name given to the item created when a section is added from scratch.
pub const DEFAULT_ITEM_NAME: &str = "prompt";

// ── DependencySpec ────────────────────────────────────────────────────────────

/// One declared requirement: a package name and its constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencySpec {
    package: String,
    constraint: String,
}

impl DependencySpec {
    pub fn new(package: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            package: package.into().trim().to_string(),
            constraint: constraint.into().trim().to_string(),
        }
    }

    /// Parse the command-line form `name@constraint`.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let err = |reason: &str| DomainError::InvalidDependency {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (package, constraint) = input.split_once('@').ok_or_else(|| err("missing '@'"))?;
        if package.trim().is_empty() {
            return Err(err("package name is empty"));
        }
        VersionConstraint::parse(constraint)?;
        Ok(Self::new(package, constraint))
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn constraint(&self) -> &str {
        &self.constraint
    }

    /// The parsed constraint.
    pub fn version_constraint(&self) -> Result<VersionConstraint, DomainError> {
        VersionConstraint::parse(&self.constraint)
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package, self.constraint)
    }
}

// ── Descriptor model ──────────────────────────────────────────────────────────

/// Dependencies as written on disk: single-key maps, `- langchain: ^0.0.266`.
pub type DependencyMap = IndexMap<String, String>;

/// `meta` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default, alias = "authors")]
    pub author: Vec<String>,
    #[serde(default)]
    pub llm: Vec<String>,
    #[serde(default = "default_readme_format", alias = "readme")]
    pub readme_format: String,
    #[serde(default = "default_license")]
    pub license: Option<String>,
}

fn default_readme_format() -> String {
    "md".to_string()
}

fn default_license() -> Option<String> {
    Some("MIT".to_string())
}

impl MetaConfig {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            tag: Vec::new(),
            author: Vec::new(),
            llm: Vec::new(),
            readme_format: default_readme_format(),
            license: default_license(),
        }
    }
}

/// A named prompt inside a section, with its own dependency list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<DependencyMap>,
}

impl PromptItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
        }
    }

    /// Flattened dependency specs, in declaration order.
    pub fn specs(&self) -> impl Iterator<Item = DependencySpec> + '_ {
        self.dependencies
            .iter()
            .flat_map(|map| map.iter().map(|(k, v)| DependencySpec::new(k, v)))
    }

    /// Add `spec` unless an identical entry is already declared.
    ///
    /// Returns `true` if the list changed.
    pub fn add_dependency(&mut self, spec: &DependencySpec) -> bool {
        if self.specs().any(|s| &s == spec) {
            return false;
        }
        let mut entry = DependencyMap::new();
        entry.insert(spec.package().to_string(), spec.constraint().to_string());
        self.dependencies.push(entry);
        true
    }
}

/// A typed prompt section: a directory and, except for text, its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSection {
    #[serde(default)]
    pub dirname: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<PromptItem>,
}

impl PromptSection {
    pub fn new(dirname: impl Into<String>) -> Self {
        Self {
            dirname: dirname.into(),
            list: Vec::new(),
        }
    }

    /// Section created from scratch: default dirname, one default item.
    pub fn scaffold(kind: SectionKind) -> Self {
        let mut section = Self::new(kind.as_str());
        if kind.has_items() {
            section.list.push(PromptItem::new(DEFAULT_ITEM_NAME));
        }
        section
    }
}

/// A prompt project's structured metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub meta: MetaConfig,
    #[serde(default, alias = "text", skip_serializing_if = "Option::is_none")]
    pub text_prompt: Option<PromptSection>,
    #[serde(default, alias = "json", skip_serializing_if = "Option::is_none")]
    pub json_prompt: Option<PromptSection>,
    #[serde(default, alias = "yaml", skip_serializing_if = "Option::is_none")]
    pub yaml_prompt: Option<PromptSection>,
    #[serde(default, alias = "python", skip_serializing_if = "Option::is_none")]
    pub python_prompt: Option<PromptSection>,
}

impl ProjectDescriptor {
    pub fn new(meta: MetaConfig) -> Self {
        Self {
            meta,
            text_prompt: None,
            json_prompt: None,
            yaml_prompt: None,
            python_prompt: None,
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&PromptSection> {
        match kind {
            SectionKind::Text => self.text_prompt.as_ref(),
            SectionKind::Json => self.json_prompt.as_ref(),
            SectionKind::Yaml => self.yaml_prompt.as_ref(),
            SectionKind::Python => self.python_prompt.as_ref(),
        }
    }

    pub fn section_mut(&mut self, kind: SectionKind) -> &mut Option<PromptSection> {
        match kind {
            SectionKind::Text => &mut self.text_prompt,
            SectionKind::Json => &mut self.json_prompt,
            SectionKind::Yaml => &mut self.yaml_prompt,
            SectionKind::Python => &mut self.python_prompt,
        }
    }

    /// Present sections, in descriptor order.
    pub fn sections(&self) -> impl Iterator<Item = (SectionKind, &PromptSection)> {
        SectionKind::ALL
            .into_iter()
            .filter_map(|kind| self.section(kind).map(|s| (kind, s)))
    }

    /// Every declared dependency, deduplicated.
    ///
    /// Sections are walked in descriptor order and items in list order;
    /// the first occurrence of a `(package, constraint)` pair wins.
    pub fn dependencies(&self) -> Vec<DependencySpec> {
        let mut seen = HashSet::new();
        self.sections()
            .filter(|(kind, _)| kind.has_items())
            .flat_map(|(_, section)| section.list.iter())
            .flat_map(PromptItem::specs)
            .filter(|spec| seen.insert(spec.clone()))
            .collect()
    }

    /// Declare `specs` on every item of the selected sections.
    ///
    /// Missing sections are scaffolded first. Returns the number of
    /// dependency entries actually added.
    pub fn add_dependencies(&mut self, kinds: &[SectionKind], specs: &[DependencySpec]) -> usize {
        let mut added = 0;
        for kind in kinds.iter().copied() {
            let section = self
                .section_mut(kind)
                .get_or_insert_with(|| PromptSection::scaffold(kind));
            if !kind.has_items() {
                continue;
            }
            if section.list.is_empty() {
                section.list.push(PromptItem::new(DEFAULT_ITEM_NAME));
            }
            for item in &mut section.list {
                added += specs.iter().filter(|spec| item.add_dependency(spec)).count();
            }
        }
        added
    }

    /// Check required fields and value formats.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.validate_meta()?;

        for (kind, section) in self.sections() {
            let field = kind.field_name();
            if section.dirname.trim().is_empty() {
                return Err(missing(format!("{field}.dirname")));
            }
            if !kind.has_items() {
                continue;
            }
            if section.list.is_empty() {
                return Err(missing(format!("{field}.list")));
            }
            for (idx, item) in section.list.iter().enumerate() {
                if item.name.trim().is_empty() {
                    return Err(missing(format!("{field}.list[{idx}].name")));
                }
                if item.dependencies.iter().all(IndexMap::is_empty) {
                    return Err(missing(format!("{field}.list[{idx}].dependencies")));
                }
                for spec in item.specs() {
                    if spec.package().is_empty() {
                        return Err(DomainError::InvalidDescriptor(format!(
                            "{field}.list[{idx}] declares a dependency without a name"
                        )));
                    }
                    spec.version_constraint()?;
                }
            }
        }
        Ok(())
    }

    fn validate_meta(&self) -> Result<(), DomainError> {
        let meta = &self.meta;
        if meta.name.trim().is_empty() {
            return Err(missing("meta.name".into()));
        }
        if meta.version.trim().is_empty() {
            return Err(missing("meta.version".into()));
        }
        if !META_VERSION.is_match(&meta.version) {
            return Err(DomainError::InvalidDescriptor(format!(
                "meta.version '{}' is not a MAJOR.MINOR.PATCH version",
                meta.version
            )));
        }
        if meta.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(DomainError::InvalidDescriptor(format!(
                "meta.description is longer than {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        Ok(())
    }
}

fn missing(field: String) -> DomainError {
    DomainError::MissingRequiredField { field }
}
