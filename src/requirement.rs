//! Version requirements as accepted by `-v/--version`
//!
//! A requirement is an ordered list of `(operator, version)` constraints,
//! written comma-separated on the command line:
//!
//! ```text
//! 1.2.3
//! >= 1.0, < 2
//! ~> 0.4.1.pre
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::YankError;

const VERSION_PATTERN: &str = r"[0-9]+(?:\.[0-9a-zA-Z]+)*(?:-[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?";

fn constraint_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^\s*(=|!=|>=|<=|~>|>|<)?\s*({VERSION_PATTERN})\s*$"))
            .expect("constraint pattern is valid")
    })
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^\s*({VERSION_PATTERN})\s*$")).expect("version pattern is valid")
    })
}

/// Comparison operator of a single constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    /// Pessimistic (`~>`)
    Approx,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Ge => ">=",
            Op::Le => "<=",
            Op::Approx => "~>",
        }
    }
}

impl FromStr for Op {
    type Err = YankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Op::Eq),
            "!=" => Ok(Op::Ne),
            ">" => Ok(Op::Gt),
            "<" => Ok(Op::Lt),
            ">=" => Ok(Op::Ge),
            "<=" => Ok(Op::Le),
            "~>" => Ok(Op::Approx),
            other => Err(YankError::InvalidRequirement(format!("unknown operator '{other}'"))),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exact gem version, kept as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(String);

impl Version {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Version {
    type Err = YankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        version_regex()
            .captures(s)
            .map(|caps| Version(caps[1].to_string()))
            .ok_or_else(|| YankError::InvalidRequirement(format!("malformed version number '{s}'")))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of version constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    requirements: Vec<(Op, Version)>,
}

impl Requirement {
    #[cfg(test)]
    pub fn requirements(&self) -> &[(Op, Version)] {
        &self.requirements
    }

    /// Version of the first constraint, operator dropped
    pub fn first_version(&self) -> Option<&Version> {
        self.requirements.first().map(|(_, version)| version)
    }
}

impl FromStr for Requirement {
    type Err = YankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split(',').collect();

        // Trailing empty fields are dropped, so "1.0," reads as "1.0"
        while parts.len() > 1 && parts.last().is_some_and(|p| p.trim().is_empty()) {
            parts.pop();
        }

        let mut requirements = Vec::new();

        for part in parts {
            let caps = constraint_regex()
                .captures(part)
                .ok_or_else(|| YankError::InvalidRequirement(format!("illformed requirement '{s}'")))?;

            let op = match caps.get(1) {
                Some(op) => op.as_str().parse()?,
                None => Op::Eq,
            };
            requirements.push((op, Version(caps[2].to_string())));
        }

        Ok(Self { requirements })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .requirements
            .iter()
            .map(|(op, version)| format!("{op} {version}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Extract the exact version to act on from a raw `--version` value.
///
/// Absent, empty and malformed requirements all yield `None`.
pub fn version_from_requirement(raw: Option<&str>) -> Option<Version> {
    let raw = raw?;

    match raw.parse::<Requirement>() {
        Ok(requirement) => requirement.first_version().cloned(),
        Err(e) => {
            tracing::debug!("Ignoring version requirement {:?}: {}", raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_version_defaults_to_eq() {
        let req: Requirement = "1.2.3".parse().unwrap();
        assert_eq!(req.requirements().len(), 1);
        assert_eq!(req.requirements()[0].0, Op::Eq);
        assert_eq!(req.first_version().unwrap().as_str(), "1.2.3");
    }

    #[test]
    fn test_parse_multiple_constraints_keeps_order() {
        let req: Requirement = ">= 1.0, < 2".parse().unwrap();
        let ops: Vec<Op> = req.requirements().iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, vec![Op::Ge, Op::Lt]);
        assert_eq!(req.to_string(), ">= 1.0, < 2");
    }

    #[test]
    fn test_parse_prerelease_and_pessimistic() {
        let req: Requirement = "~>0.4.1.pre".parse().unwrap();
        assert_eq!(req.requirements()[0].0, Op::Approx);
        assert_eq!(req.first_version().unwrap().as_str(), "0.4.1.pre");
    }

    #[test]
    fn test_version_from_first_pair_drops_operator() {
        let version = version_from_requirement(Some(">= 1.2.3"));
        assert_eq!(version.unwrap().as_str(), "1.2.3");

        let version = version_from_requirement(Some("!= 0.9, > 0.1"));
        assert_eq!(version.unwrap().as_str(), "0.9");
    }

    #[test]
    fn test_version_absent_or_malformed_is_none() {
        assert!(version_from_requirement(None).is_none());
        assert!(version_from_requirement(Some("")).is_none());
        assert!(version_from_requirement(Some("   ")).is_none());
        assert!(version_from_requirement(Some("latest")).is_none());
        assert!(version_from_requirement(Some("=> 1.0")).is_none());
        assert!(version_from_requirement(Some(",1.0")).is_none());
        assert!(version_from_requirement(Some(",")).is_none());
    }

    #[test]
    fn test_trailing_empty_constraints_are_dropped() {
        assert_eq!(version_from_requirement(Some("1.0,")).unwrap().as_str(), "1.0");
        assert_eq!(version_from_requirement(Some(">= 2.1, , ")).unwrap().as_str(), "2.1");

        let req: Requirement = "~> 3.0, < 3.2,".parse().unwrap();
        assert_eq!(req.requirements().len(), 2);
    }

    #[test]
    fn test_version_parse() {
        assert_eq!("2.0.0-rc.1".parse::<Version>().unwrap().as_str(), "2.0.0-rc.1");
        assert!("v1.0".parse::<Version>().is_err());
    }
}
