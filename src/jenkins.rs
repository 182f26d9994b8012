use crate::error::{AppError, Result};

/// Build identifiers decoded from a Jenkins status URL.
///
/// Example:
/// `https://ci-masstack.masstack.com/job/mas-stack/job/mm-monorepo-build/job/PR-70374/1/display/redirect`
/// yields directory `mas-stack`, job name `mm-monorepo-build`, branch
/// `PR-70374`, build number `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReference {
    pub status_url: String,
    pub directory: String,
    pub job_name: String,
    pub branch: String,
    pub build_number: String,
}

impl BuildReference {
    /// Decode a status URL into build identifiers.
    ///
    /// Either every field is populated or parsing fails; no partially filled
    /// reference is ever returned.
    pub fn parse(status_url: &str) -> Result<Self> {
        let url = status_url
            .strip_suffix("/display/redirect")
            .unwrap_or(status_url);

        // Segment 0 is the Jenkins root, then directory, job name, and
        // "<branch>/<build number>".
        let parts: Vec<&str> = url.split("/job/").collect();
        if parts.len() < 4 {
            return Err(AppError::MalformedUrl(format!(
                "expected at least 4 parts after splitting on \"/job/\": {url}"
            )));
        }

        let directory = parts[1];
        let job_name = parts[2];

        let mut tail = parts[3].splitn(2, '/');
        let branch = tail.next().unwrap_or_default();
        let build_number = tail.next().unwrap_or_default();

        if directory.is_empty()
            || job_name.is_empty()
            || branch.is_empty()
            || build_number.is_empty()
            || build_number.contains('/')
        {
            return Err(AppError::MalformedUrl(format!(
                "expected \"<branch>/<build number>\" after the last \"/job/\": {url}"
            )));
        }

        Ok(Self {
            status_url: status_url.to_string(),
            directory: directory.to_string(),
            job_name: job_name.to_string(),
            branch: branch.to_string(),
            build_number: build_number.to_string(),
        })
    }
}
