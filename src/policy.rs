//! Comparison policy: which metadata attributes participate in equality
//!
//! A policy is an ordered attribute list drawn from the canonical order
//! `mode, owner, group, size`. Callers build one by excluding names
//! (`--ignore-owner`, `--exclude size`, ...). The device id is never part of
//! the list; it is added per entry kind by [`ComparisonPolicy::effective_for`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PolicyError;
use crate::metadata::EntryKind;

/// A comparable metadata attribute.
///
/// Discriminants double as indices into the metadata accessor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Permission bits (including setuid/setgid/sticky)
    Mode = 0,
    /// Owner user id
    Owner = 1,
    /// Owner group id
    Group = 2,
    /// Size in bytes
    Size = 3,
    /// Device id of a special node; always compared for special nodes
    Device = 4,
}

impl Attribute {
    /// Attributes a policy may contain, in canonical order.
    pub const CONFIGURABLE: [Attribute; 4] = [
        Attribute::Mode,
        Attribute::Owner,
        Attribute::Group,
        Attribute::Size,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Mode => "mode",
            Attribute::Owner => "owner",
            Attribute::Group => "group",
            Attribute::Size => "size",
            Attribute::Device => "device",
        }
    }

    pub fn is_configurable(&self) -> bool {
        !matches!(self, Attribute::Device)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mode" | "perms" | "permissions" => Ok(Attribute::Mode),
            "owner" | "uid" | "user" => Ok(Attribute::Owner),
            "group" | "gid" => Ok(Attribute::Group),
            "size" => Ok(Attribute::Size),
            "device" | "rdev" => Ok(Attribute::Device),
            _ => Err(PolicyError::UnknownAttribute(s.to_string())),
        }
    }
}

/// The effective, ordered set of attributes compared between two entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPolicy {
    attributes: Vec<Attribute>,
}

impl Default for ComparisonPolicy {
    fn default() -> Self {
        Self {
            attributes: Attribute::CONFIGURABLE.to_vec(),
        }
    }
}

impl ComparisonPolicy {
    /// Resolve a policy from attribute names to leave out.
    ///
    /// Fails on the first unknown name, or on `device`, which cannot be excluded.
    pub fn excluding<I, S>(names: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = Self::default();
        for name in names {
            let name = name.as_ref();
            let attribute: Attribute = name.parse()?;
            if !attribute.is_configurable() {
                return Err(PolicyError::NotExcludable(name.to_string()));
            }
            policy = policy.without(attribute);
        }
        Ok(policy)
    }

    /// Remove one attribute, keeping the canonical order of the rest.
    pub fn without(mut self, attribute: Attribute) -> Self {
        self.attributes.retain(|a| *a != attribute);
        self
    }

    /// The configured attributes in canonical order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }

    /// Attributes to compare for two entries of the given kind.
    ///
    /// Symlink permission bits and directory sizes are skipped; special nodes
    /// always add the device id.
    pub fn effective_for(&self, kind: EntryKind) -> impl Iterator<Item = Attribute> + '_ {
        let device = kind.is_special().then_some(Attribute::Device);
        self.attributes
            .iter()
            .copied()
            .filter(move |attribute| match attribute {
                Attribute::Mode => kind != EntryKind::Symlink,
                Attribute::Size => kind != EntryKind::Directory,
                _ => true,
            })
            .chain(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_canonical_order() {
        let policy = ComparisonPolicy::default();
        assert_eq!(
            policy.attributes(),
            &[
                Attribute::Mode,
                Attribute::Owner,
                Attribute::Group,
                Attribute::Size
            ]
        );
    }

    #[test]
    fn test_excluding_preserves_order() {
        let policy = ComparisonPolicy::excluding(["size", "owner"]).unwrap();
        assert_eq!(policy.attributes(), &[Attribute::Mode, Attribute::Group]);

        // Exclusion order does not matter, nor do duplicates
        let again = ComparisonPolicy::excluding(["owner", "size", "owner"]).unwrap();
        assert_eq!(policy, again);
    }

    #[test]
    fn test_excluding_accepts_aliases() {
        let policy = ComparisonPolicy::excluding(["Perms", "UID", "gid"]).unwrap();
        assert_eq!(policy.attributes(), &[Attribute::Size]);
    }

    #[test]
    fn test_excluding_rejects_unknown_name() {
        let err = ComparisonPolicy::excluding(["mtime"]).unwrap_err();
        assert_eq!(err, PolicyError::UnknownAttribute("mtime".to_string()));
    }

    #[test]
    fn test_excluding_rejects_device() {
        let err = ComparisonPolicy::excluding(["device"]).unwrap_err();
        assert_eq!(err, PolicyError::NotExcludable("device".to_string()));
    }

    #[test]
    fn test_effective_for_regular_file() {
        let policy = ComparisonPolicy::default();
        let attrs: Vec<_> = policy.effective_for(EntryKind::File).collect();
        assert_eq!(attrs, Attribute::CONFIGURABLE.to_vec());
    }

    #[test]
    fn test_effective_for_skips_symlink_mode_and_directory_size() {
        let policy = ComparisonPolicy::default();

        let link: Vec<_> = policy.effective_for(EntryKind::Symlink).collect();
        assert!(!link.contains(&Attribute::Mode));
        assert!(link.contains(&Attribute::Size));

        let dir: Vec<_> = policy.effective_for(EntryKind::Directory).collect();
        assert!(!dir.contains(&Attribute::Size));
        assert!(dir.contains(&Attribute::Mode));
    }

    #[test]
    fn test_effective_for_special_always_adds_device() {
        let policy = ComparisonPolicy::excluding(["mode", "owner", "group", "size"]).unwrap();
        assert!(policy.attributes().is_empty());

        let attrs: Vec<_> = policy.effective_for(EntryKind::CharDevice).collect();
        assert_eq!(attrs, vec![Attribute::Device]);

        let attrs: Vec<_> = policy.effective_for(EntryKind::File).collect();
        assert!(attrs.is_empty());
    }
}
