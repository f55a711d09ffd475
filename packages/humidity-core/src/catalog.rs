/// A known network: SSID and the passphrase to join it with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkIdentity {
    pub name: &'static str,
    pub secret: &'static str,
}

impl NetworkIdentity {
    pub const fn new(name: &'static str, secret: &'static str) -> Self {
        Self { name, secret }
    }
}

/// A scanned network that is also in the catalog.
///
/// The secret always comes from the catalog entry; only the name and the
/// measured signal strength come from the scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub signal_strength: i8,
    pub identity: NetworkIdentity,
}

/// Catalog entries whose name equals `name` exactly (case-sensitive).
pub fn matching<'a>(
    catalog: &'a [NetworkIdentity],
    name: &'a str,
) -> impl Iterator<Item = &'a NetworkIdentity> + 'a {
    catalog.iter().filter(move |entry| entry.name == name)
}
