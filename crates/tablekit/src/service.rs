//! Lookup service kinds carried by `check`, `lookup`, and `fetch` requests.
//!
//! The service kind names the category of data the lookup server expects
//! back. The dispatcher never interprets it; it is passed through to the
//! handler untouched.

use std::fmt;

/// Category of data requested from a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Alias expansion.
    Alias,
    /// Domain matching.
    Domain,
    /// Authentication credentials.
    Credentials,
    /// Network address matching.
    Netaddr,
    /// User information records.
    Userinfo,
    /// Source address selection.
    Source,
    /// Mail address matching.
    Mailaddr,
    /// Address name for the `HELO` banner.
    Addrname,
    /// Mail address to mail address mapping.
    Mailaddrmap,
    /// Relay host selection.
    Relayhost,
    /// Plain string matching, also used for unrecognised names.
    #[default]
    String,
    /// Regular expression matching.
    Regex,
}

impl ServiceKind {
    /// Every service kind, in wire order.
    pub const ALL: [Self; 12] = [
        Self::Alias,
        Self::Domain,
        Self::Credentials,
        Self::Netaddr,
        Self::Userinfo,
        Self::Source,
        Self::Mailaddr,
        Self::Addrname,
        Self::Mailaddrmap,
        Self::Relayhost,
        Self::String,
        Self::Regex,
    ];

    /// Maps a wire name to a service kind.
    ///
    /// Matching is exact and case-sensitive. Unrecognised names map to
    /// [`ServiceKind::String`] rather than failing.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "alias" => Self::Alias,
            "domain" => Self::Domain,
            "credentials" => Self::Credentials,
            "netaddr" => Self::Netaddr,
            "userinfo" => Self::Userinfo,
            "source" => Self::Source,
            "mailaddr" => Self::Mailaddr,
            "addrname" => Self::Addrname,
            "mailaddrmap" => Self::Mailaddrmap,
            "relayhost" => Self::Relayhost,
            "regex" => Self::Regex,
            _ => Self::String,
        }
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alias => "alias",
            Self::Domain => "domain",
            Self::Credentials => "credentials",
            Self::Netaddr => "netaddr",
            Self::Userinfo => "userinfo",
            Self::Source => "source",
            Self::Mailaddr => "mailaddr",
            Self::Addrname => "addrname",
            Self::Mailaddrmap => "mailaddrmap",
            Self::Relayhost => "relayhost",
            Self::String => "string",
            Self::Regex => "regex",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
