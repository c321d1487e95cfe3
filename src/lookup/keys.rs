//! Store key patterns
//!
//! Several key shapes coexist in the store. They are probed in the order of
//! [`DEFAULT_KEY_PATTERNS`] and the first hit wins.

use std::fmt;

/// Namespace prefix shared by every key
pub const NAMESPACE: &str = "kob";

const DELIMITER: char = ':';

/// Transaction types written under the legacy key shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Incoming payment
    Deposit,
    /// Outgoing payment
    Withdraw,
    /// Settlement between parties
    Settlement,
}

impl TransactionType {
    /// Lowercase discriminator used in keys
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdraw => "withdraw",
            TransactionType::Settlement => "settlement",
        }
    }

    /// All types in probe order
    pub fn all() -> &'static [TransactionType] {
        &[
            TransactionType::Deposit,
            TransactionType::Withdraw,
            TransactionType::Settlement,
        ]
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lookup strategy: how to build a key from `(site, id)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPattern {
    /// `kob:{group}:{name}:{id}`. Site is not part of this shape.
    Provider {
        /// Provider group, e.g. `ttf`
        group: &'static str,
        /// Provider name, e.g. `compay`
        name: &'static str,
    },

    /// `kob:transaction:{type}:{site}:{id}`
    Legacy(TransactionType),
}

impl KeyPattern {
    /// Build the store key for a request
    pub fn build(&self, site: &str, id: &str) -> String {
        match self {
            KeyPattern::Provider { group, name } => join(&[NAMESPACE, group, name, id]),
            KeyPattern::Legacy(kind) => {
                join(&[NAMESPACE, "transaction", kind.as_str(), site, id])
            }
        }
    }

    /// Short label for logs and metrics, e.g. `provider:compay`
    pub fn label(&self) -> String {
        match self {
            KeyPattern::Provider { name, .. } => format!("provider:{name}"),
            KeyPattern::Legacy(kind) => format!("legacy:{kind}"),
        }
    }
}

fn join(parts: &[&str]) -> String {
    let mut key = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum());
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(DELIMITER);
        }
        key.push_str(part);
    }
    key
}

/// Provider-specific key shape, probed before the legacy shapes
pub const COMPAY: KeyPattern = KeyPattern::Provider {
    group: "ttf",
    name: "compay",
};

/// Probe order used by the service
pub const DEFAULT_KEY_PATTERNS: [KeyPattern; 4] = [
    COMPAY,
    KeyPattern::Legacy(TransactionType::Deposit),
    KeyPattern::Legacy(TransactionType::Withdraw),
    KeyPattern::Legacy(TransactionType::Settlement),
];
