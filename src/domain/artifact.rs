//! Sub-project descriptors and the artifacts copied out of them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::matcher::NameMatcher;

/// Extension given to every canonical artifact name
pub const ARTIFACT_EXTENSION: &str = "jar";

/// Everything needed to build one sub-project and pick up its output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    /// Short project name (e.g., "compiler")
    pub name: String,

    /// Base of the canonical artifact name (e.g., "rattlesnake-runtime")
    pub artifact: String,

    /// Project root; the build command runs here
    pub dir: PathBuf,

    /// Shell command that produces the artifact
    pub build: String,

    /// Directory holding build outputs, relative to `dir`
    pub output_dir: PathBuf,

    /// Rule selecting the artifact inside `output_dir`
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub matcher: NameMatcher,

    /// Whether the skip keyword excludes this project
    #[serde(default)]
    pub skippable: bool,
}

impl ProjectDescriptor {
    /// Canonical file name in the destination directory
    pub fn canonical_name(&self, version: &str) -> String {
        format!("{}-{}.{}", self.artifact, version, ARTIFACT_EXTENSION)
    }

    /// Directory searched for the freshly built artifact
    pub fn search_dir(&self) -> PathBuf {
        self.dir.join(&self.output_dir)
    }

    /// Resolve relative paths against `base`
    pub fn rebased(mut self, base: &Path) -> Self {
        if self.dir.is_relative() {
            self.dir = base.join(&self.dir);
        }
        self
    }
}

/// An artifact that was copied into the destination directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopiedArtifact {
    /// Project that produced the artifact
    pub project: String,

    /// File found in the project's output directory
    pub source: PathBuf,

    /// Canonical path in the destination directory
    pub destination: PathBuf,

    /// Size in bytes
    pub size_bytes: u64,

    /// SHA-256 of the copied file (hex)
    pub sha256: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> ProjectDescriptor {
        ProjectDescriptor {
            name: "runtime".to_string(),
            artifact: "rattlesnake-runtime".to_string(),
            dir: PathBuf::from("../rattlesnake-runtime"),
            build: "mvn clean package".to_string(),
            output_dir: PathBuf::from("target"),
            matcher: NameMatcher::suffix("with-dependencies.jar"),
            skippable: false,
        }
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(
            runtime().canonical_name("0.2.0-snapshot"),
            "rattlesnake-runtime-0.2.0-snapshot.jar"
        );
    }

    #[test]
    fn test_search_dir() {
        assert_eq!(
            runtime().search_dir(),
            PathBuf::from("../rattlesnake-runtime/target")
        );
    }

    #[test]
    fn test_rebased_keeps_absolute_dirs() {
        let base = Path::new("/work/mkjars-script");
        assert_eq!(
            runtime().rebased(base).dir,
            PathBuf::from("/work/mkjars-script/../rattlesnake-runtime")
        );

        let absolute = ProjectDescriptor {
            dir: PathBuf::from("/opt/agent"),
            ..runtime()
        };
        assert_eq!(absolute.rebased(base).dir, PathBuf::from("/opt/agent"));
    }

    #[test]
    fn test_descriptor_flow_style_matcher() {
        let yaml = r#"
name: runtime
artifact: rattlesnake-runtime
dir: ../rattlesnake-runtime
build: mvn clean package
output_dir: target
matcher: { suffix: with-dependencies.jar }
"#;
        let descriptor: ProjectDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(descriptor, runtime());
    }

    #[test]
    fn test_descriptor_yaml() {
        let yaml = r#"
name: compiler
artifact: rattlesnake-compiler
dir: ../rattlesnake-compiler
build: sbt assembly
output_dir: target/scala-3.5.0
matcher:
  prefix: Rattlesnake-assembly
skippable: true
"#;
        let descriptor: ProjectDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(descriptor.name, "compiler");
        assert!(descriptor.skippable);
        assert_eq!(descriptor.matcher, NameMatcher::prefix("Rattlesnake-assembly"));
        assert_eq!(
            descriptor.search_dir(),
            PathBuf::from("../rattlesnake-compiler/target/scala-3.5.0")
        );
    }
}
