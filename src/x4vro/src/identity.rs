//! Component identity parsed from asset filenames.
//!
//! X4 component macros follow the naming convention
//! `<prefix>_<faction>_<size>_<kind>_mk<tier>[_macro].xml`. The identity
//! tuple is the join key between mod-variant components and their stock
//! counterparts; a filename outside the convention yields no identity and
//! the record is silently excluded from joins.

use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Hull size class carried in component filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeClass {
    S,
    M,
    L,
    XL,
}

impl SizeClass {
    pub fn code(self) -> &'static str {
        match self {
            SizeClass::S => "s",
            SizeClass::M => "m",
            SizeClass::L => "l",
            SizeClass::XL => "xl",
        }
    }

    /// L and XL hulls share most faction-specific corrections.
    pub fn is_large_hull(self) -> bool {
        matches!(self, SizeClass::L | SizeClass::XL)
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SizeClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(SizeClass::S),
            "m" => Ok(SizeClass::M),
            "l" => Ok(SizeClass::L),
            "xl" => Ok(SizeClass::XL),
            _ => Err(()),
        }
    }
}

/// Identity fields parsed from a component filename.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity {
    pub faction: String,
    pub size: SizeClass,
    pub kind: String,
    pub tier: String,
}

/// Parse the identity out of a base filename for the given component prefix
/// (`shield`, `engine`).
///
/// Captures are greedy, so variant suffixes stay attached to the kind:
/// `shield_arg_s_standard_01_mk1_macro.xml` yields kind `standard_01`. The
/// tier keeps its literal `mkN` token. Returns `None` for any filename
/// outside the convention.
pub fn parse_identity(prefix: &str, filename: &str) -> Option<Identity> {
    let pattern = format!(
        r"^{}_(?P<faction>.+)_(?P<size>s|m|l|xl)_(?P<kind>.+)_(?P<tier>mk\d)",
        regex::escape(prefix)
    );
    let re = Regex::new(&pattern).ok()?;
    let captures = re.captures(filename)?;

    let size = captures.name("size")?.as_str().parse().ok()?;
    Some(Identity {
        faction: captures.name("faction")?.as_str().to_string(),
        size,
        kind: captures.name("kind")?.as_str().to_string(),
        tier: captures.name("tier")?.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shield_filename() {
        let identity = parse_identity("shield", "shield_arg_s_standard_01_mk1_macro.xml").unwrap();
        assert_eq!(identity.faction, "arg");
        assert_eq!(identity.size, SizeClass::S);
        assert_eq!(identity.kind, "standard_01");
        assert_eq!(identity.tier, "mk1");
    }

    #[test]
    fn test_parse_engine_filename() {
        let identity = parse_identity("engine", "engine_par_xl_allround_01_mk1_macro.xml").unwrap();
        assert_eq!(identity.faction, "par");
        assert_eq!(identity.size, SizeClass::XL);
        assert_eq!(identity.kind, "allround_01");
        assert_eq!(identity.tier, "mk1");
    }

    #[test]
    fn test_greedy_kind_keeps_variant_number() {
        let identity = parse_identity("shield", "shield_kha_m_standard_02_mk2").unwrap();
        assert_eq!(identity.kind, "standard_02");
        assert_eq!(identity.tier, "mk2");
    }

    #[test]
    fn test_unconventional_filename_yields_none() {
        assert!(parse_identity("shield", "shield_arg_standard.xml").is_none());
        assert!(parse_identity("shield", "thruster_gen_s_01_mk1.xml").is_none());
        assert!(parse_identity("engine", "engine_arg_s_template.xml").is_none());
    }

    #[test]
    fn test_size_class_parsing() {
        assert_eq!("xl".parse::<SizeClass>().unwrap(), SizeClass::XL);
        assert!("xxl".parse::<SizeClass>().is_err());
        assert!(SizeClass::L.is_large_hull());
        assert!(!SizeClass::M.is_large_hull());
    }
}
