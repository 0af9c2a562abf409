//! YAML descriptor codec.

use ssprompt_core::{
    application::{ApplicationError, ports::DescriptorCodec},
    domain::ProjectDescriptor,
    error::SspromptResult,
};

/// Reads and writes `<project>.yaml` descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDescriptorCodec;

impl YamlDescriptorCodec {
    pub fn new() -> Self {
        Self
    }
}

impl DescriptorCodec for YamlDescriptorCodec {
    fn parse(&self, text: &str) -> SspromptResult<ProjectDescriptor> {
        serde_yaml::from_str(text).map_err(|e| {
            ApplicationError::Codec {
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn render(&self, descriptor: &ProjectDescriptor) -> SspromptResult<String> {
        serde_yaml::to_string(descriptor).map_err(|e| {
            ApplicationError::Codec {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssprompt_core::domain::{DependencySpec, SectionKind};

    const SAMPLE: &str = r#"
meta:
  name: demo
  version: 0.0.1
  description: A demo prompt project
  author: [someone]
text_prompt:
  dirname: text
python_prompt:
  dirname: python
  list:
    - name: prompt
      dependencies:
        - langchain: ^0.0.266
        - openai: latest
"#;

    #[test]
    fn parses_descriptor_with_dependencies() {
        let descriptor = YamlDescriptorCodec.parse(SAMPLE).unwrap();
        assert_eq!(descriptor.meta.name, "demo");
        assert_eq!(descriptor.meta.readme_format, "md");
        assert!(descriptor.section(SectionKind::Json).is_none());
        assert_eq!(
            descriptor.dependencies(),
            [
                DependencySpec::new("langchain", "^0.0.266"),
                DependencySpec::new("openai", "latest"),
            ]
        );
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn short_section_names_are_accepted() {
        let text = "meta: {name: demo, version: 0.0.1}\npython:\n  dirname: py\n  list:\n    - name: p\n      dependencies: [{openai: latest}]\n";
        let descriptor = YamlDescriptorCodec.parse(text).unwrap();
        assert_eq!(descriptor.section(SectionKind::Python).unwrap().dirname, "py");
    }

    #[test]
    fn rendered_text_parses_back() {
        let codec = YamlDescriptorCodec;
        let descriptor = codec.parse(SAMPLE).unwrap();
        let text = codec.render(&descriptor).unwrap();
        assert!(text.contains("python_prompt:"));
        assert!(!text.contains("json_prompt"));
        assert_eq!(codec.parse(&text).unwrap(), descriptor);
    }

    #[test]
    fn multi_key_dependency_entries_keep_declared_order() {
        let text = "meta: {name: demo, version: 0.0.1}\npython:\n  dirname: py\n  list:\n    - name: p\n      dependencies:\n        - {zeta: latest, alpha: ^1.0}\n";
        let codec = YamlDescriptorCodec;
        let descriptor = codec.parse(text).unwrap();
        let expected = [
            DependencySpec::new("zeta", "latest"),
            DependencySpec::new("alpha", "^1.0"),
        ];
        assert_eq!(descriptor.dependencies(), expected);

        let rendered = codec.render(&descriptor).unwrap();
        assert!(rendered.find("zeta").unwrap() < rendered.find("alpha").unwrap());
        assert_eq!(codec.parse(&rendered).unwrap().dependencies(), expected);
    }

    #[test]
    fn syntax_errors_are_codec_errors() {
        let err = YamlDescriptorCodec.parse("meta: [unclosed").unwrap_err();
        assert!(err.to_string().contains("descriptor codec error"));
    }
}
