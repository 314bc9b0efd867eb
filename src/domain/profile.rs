//! The node profile record and its load-time validation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::error::ProfileError;

/// One named class of build agent: everything the provisioning tool
/// needs to boot a VM and register it with Jenkins.
///
/// The `labels` field and the URL-encoded label list embedded in
/// `script` serve different consumers (scheduling metadata vs. the
/// registration call) and are independently authoritative. The authored
/// table contains deliberate divergences between the two; they are data,
/// not bugs, and validation does not compare them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeProfile {
    /// Bootstrap script template, executed as cloud-init user data on
    /// the fresh VM. Starts with a shebang, carries `{{ var }}`
    /// placeholders, and contains exactly one `%s` site where the
    /// instance-unique suffix lands at render time.
    pub script: String,
    /// Name of the SSH keypair the provider injects into the VM.
    pub keyname: String,
    /// Base OS image to boot (e.g. `"Ubuntu 16.04"`).
    pub image_name: String,
    /// Compute flavor identifier (e.g. `"c2-30"`).
    pub size: String,
    /// Scheduling tags matched against job requirements.
    pub labels: BTreeSet<String>,
    /// Cloud backend identifier (e.g. `"openstack"`).
    pub provider: String,
    /// Extra disk in GB. Absent means the image/provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<u32>,
}

impl NodeProfile {
    /// Checks the load-time invariants for the entry named `name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidProfile` naming the entry and the first violated
    /// invariant: an empty required field, a script without a shebang,
    /// a `%s` count other than one, or a registration call count other
    /// than one.
    pub fn validate(&self, name: &str) -> Result<(), ProfileError> {
        let invalid = |reason: String| ProfileError::InvalidProfile {
            name: name.to_string(),
            reason,
        };

        for (field, value) in [
            ("script", &self.script),
            ("keyname", &self.keyname),
            ("image_name", &self.image_name),
            ("size", &self.size),
            ("provider", &self.provider),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("'{field}' must not be empty")));
            }
        }
        if self.labels.is_empty() {
            return Err(invalid("'labels' must not be empty".to_string()));
        }
        if !self.script.starts_with("#!") {
            return Err(invalid("script must start with a shebang".to_string()));
        }

        let suffix_sites = self.script.matches("%s").count();
        if suffix_sites != 1 {
            return Err(invalid(format!(
                "script must contain exactly one '%s' instance-suffix site, found {suffix_sites}"
            )));
        }

        let registration_calls = self
            .script
            .lines()
            .filter(|line| line.contains("| bash") && line.contains("curl"))
            .count();
        if registration_calls != 1 {
            return Err(invalid(format!(
                "script must contain exactly one 'curl ... | bash' registration call, \
                 found {registration_calls}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> NodeProfile {
        NodeProfile {
            script: "#!/bin/bash\nset -ex\ncurl \"{{ prado_url }}/?nodename=t__%s\" | bash\n"
                .to_string(),
            keyname: "jenkins-build".to_string(),
            image_name: "Centos 7.4".to_string(),
            size: "c2-7".to_string(),
            labels: ["amd64", "centos7"].iter().map(ToString::to_string).collect(),
            provider: "openstack".to_string(),
            storage: None,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_profile() {
        assert!(sample().validate("t").is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_keyname() {
        let mut profile = sample();
        profile.keyname = String::new();
        let err = profile.validate("t").unwrap_err().to_string();
        assert!(err.contains("keyname"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_whitespace_only_size() {
        let mut profile = sample();
        profile.size = "   ".to_string();
        assert!(profile.validate("t").is_err());
    }

    #[test]
    fn test_validate_rejects_empty_labels() {
        let mut profile = sample();
        profile.labels.clear();
        let err = profile.validate("t").unwrap_err().to_string();
        assert!(err.contains("labels"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_missing_shebang() {
        let mut profile = sample();
        profile.script = "set -ex\ncurl \"http://x/?nodename=t__%s\" | bash\n".to_string();
        let err = profile.validate("t").unwrap_err().to_string();
        assert!(err.contains("shebang"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_script_without_suffix_site() {
        let mut profile = sample();
        profile.script = "#!/bin/bash\ncurl \"http://x/?nodename=t\" | bash\n".to_string();
        let err = profile.validate("t").unwrap_err().to_string();
        assert!(err.contains("%s"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_script_with_two_suffix_sites() {
        let mut profile = sample();
        profile.script =
            "#!/bin/bash\nhostname t__%s\ncurl \"http://x/?nodename=t__%s\" | bash\n".to_string();
        assert!(profile.validate("t").is_err());
    }

    #[test]
    fn test_validate_rejects_script_without_registration_call() {
        let mut profile = sample();
        profile.script = "#!/bin/bash\necho t__%s\n".to_string();
        let err = profile.validate("t").unwrap_err().to_string();
        assert!(err.contains("registration"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_script_with_two_registration_calls() {
        let mut profile = sample();
        profile.script = "#!/bin/bash\ncurl \"http://x/?nodename=t__%s\" | bash\n\
                          curl \"http://x/again\" | bash\n"
            .to_string();
        assert!(profile.validate("t").is_err());
    }

    #[test]
    fn test_storage_field_defaults_to_none() {
        let yaml = "script: \"#!/bin/bash\\ncurl x__%s | bash\"\nkeyname: k\n\
                    image_name: i\nsize: s\nlabels: [a]\nprovider: p\n";
        let profile: NodeProfile = serde_yaml::from_str(yaml).expect("valid yaml");
        assert_eq!(profile.storage, None);
    }

    #[test]
    fn test_storage_field_roundtrips() {
        let mut profile = sample();
        profile.storage = Some(100);
        let yaml = serde_yaml::to_string(&profile).expect("serialize");
        let back: NodeProfile = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back.storage, Some(100));
    }

    #[test]
    fn test_labels_deserialize_as_a_set() {
        let yaml = "script: \"#!/bin/bash\\ncurl x__%s | bash\"\nkeyname: k\n\
                    image_name: i\nsize: s\nlabels: [b, a, b]\nprovider: p\n";
        let profile: NodeProfile = serde_yaml::from_str(yaml).expect("valid yaml");
        assert_eq!(profile.labels.len(), 2);
        assert!(profile.labels.contains("a"));
    }
}
