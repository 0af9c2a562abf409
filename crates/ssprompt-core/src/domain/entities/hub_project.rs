use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::DomainError;

/// A project on the hub: `owner/repo`, optionally narrowed to a sub-project
/// directory inside that repository.
///
/// Invariant: `main_project` contains exactly one `/` with non-empty halves,
/// and `sub_project` never contains empty, `.` or `..` segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HubProject {
    main_project: String,
    sub_project: Option<String>,
}

impl HubProject {
    /// Build a hub project. An empty `sub_project` means the repository root.
    pub fn new(main_project: &str, sub_project: Option<&str>) -> Result<Self, DomainError> {
        let main_project = main_project.trim();
        let invalid = |reason: &str| DomainError::InvalidProjectName {
            name: main_project.to_string(),
            reason: reason.to_string(),
        };

        let Some((owner, repo)) = main_project.split_once('/') else {
            return Err(invalid("expected owner/repository"));
        };
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid("expected exactly one '/' between owner and repository"));
        }
        if main_project.chars().any(char::is_whitespace) {
            return Err(invalid("whitespace is not allowed"));
        }

        let sub_project = match sub_project.map(|s| s.trim().trim_matches('/')) {
            None | Some("") => None,
            Some(sub) => {
                if sub
                    .split('/')
                    .any(|seg| seg.is_empty() || seg == "." || seg == "..")
                {
                    return Err(DomainError::InvalidProjectName {
                        name: sub.to_string(),
                        reason: "sub-project path has empty or relative segments".into(),
                    });
                }
                Some(sub.to_string())
            }
        };

        Ok(Self {
            main_project: main_project.to_string(),
            sub_project,
        })
    }

    /// `owner/repo`.
    pub fn main_project(&self) -> &str {
        &self.main_project
    }

    pub fn sub_project(&self) -> Option<&str> {
        self.sub_project.as_deref()
    }

    pub fn repo_name(&self) -> &str {
        self.main_project
            .split_once('/')
            .map_or(self.main_project.as_str(), |(_, repo)| repo)
    }

    /// Last segment of the sub-project, or the repository name.
    pub fn project_name(&self) -> &str {
        match &self.sub_project {
            Some(sub) => sub.rsplit('/').next().unwrap_or(sub),
            None => self.repo_name(),
        }
    }

    /// Remote directory mirrored by a pull (`""` is the repository root).
    pub fn remote_root(&self) -> &str {
        self.sub_project.as_deref().unwrap_or("")
    }

    /// `<project_name>.yaml`.
    pub fn descriptor_file_name(&self) -> String {
        format!("{}.yaml", self.project_name())
    }

    /// Repository path of the descriptor file.
    pub fn remote_descriptor_path(&self) -> String {
        match &self.sub_project {
            Some(sub) => format!("{sub}/{}", self.descriptor_file_name()),
            None => self.descriptor_file_name(),
        }
    }

    /// Local directory the project is pulled into.
    ///
    /// With `dir_flag` the project gets its own directory under `base`;
    /// without it, files land directly in `base`.
    pub fn save_dir(&self, base: &Path, dir_flag: bool) -> PathBuf {
        if dir_flag {
            base.join(self.project_name())
        } else {
            base.to_path_buf()
        }
    }
}

impl fmt::Display for HubProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_project {
            Some(sub) => write!(f, "{}/{}", self.main_project, sub),
            None => f.write_str(&self.main_project),
        }
    }
}
