use crate::record::EntityKind;

/// Hands out `prefix + zero-padded sequence` identifiers, continuing after
/// the highest identifier already stored.
#[derive(Debug, Clone)]
pub struct IdSequence {
    prefix: &'static str,
    last: u64,
}

impl IdSequence {
    pub fn starting_after(kind: EntityKind, highest: Option<&str>) -> Self {
        let prefix = kind.id_prefix();
        let last = highest
            .and_then(|id| sequence_number(prefix, id))
            .unwrap_or(0);

        Self { prefix, last }
    }

    pub fn next_id(&mut self) -> String {
        self.last += 1;
        format!("{}{:05}", self.prefix, self.last)
    }
}

/// Numeric suffix of `id`, or `None` when it does not carry `prefix`.
pub fn sequence_number(prefix: &str, id: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}
