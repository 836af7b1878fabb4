use crate::record::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Decimal,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Strictly greater than zero.
    Positive,
    NonNegative,
}

impl Bound {
    pub fn describe(&self) -> &'static str {
        match self {
            Bound::Positive => "greater than 0",
            Bound::NonNegative => "at least 0",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormats {
    /// `YYYY-MM-DD` only.
    Iso,
    /// ISO plus the common day/month layouts and RFC 3339 timestamps.
    Flexible,
}

/// What to do with a date cell that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFallback {
    Today,
    Reject,
}

/// What to do with a shop id that has no client in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    Reject,
    Placeholder,
}

/// Closed label set plus lower-cased synonyms for one enumerated field.
#[derive(Debug)]
pub struct EnumTable {
    pub labels: &'static [&'static str],
    pub synonyms: &'static [(&'static str, &'static str)],
}

impl EnumTable {
    /// Exact label match first, then a lower-cased synonym lookup.
    pub fn normalize(&self, raw: &str) -> Option<&'static str> {
        let raw = raw.trim();
        if let Some(label) = self.labels.iter().find(|label| **label == raw) {
            return Some(*label);
        }

        let lowered = raw.to_lowercase();
        self.synonyms
            .iter()
            .find(|(synonym, _)| *synonym == lowered)
            .map(|(_, label)| *label)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    Text,
    Number(NumberKind, Bound),
    Enum(&'static EnumTable),
    Date(DateFormats, DateFallback),
    ShopRef(Tolerance),
}

#[derive(Debug)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub required: bool,
    pub rule: FieldRule,
}

const fn required(name: &'static str, rule: FieldRule) -> ColumnSpec {
    ColumnSpec {
        name,
        required: true,
        rule,
    }
}

const fn optional(name: &'static str, rule: FieldRule) -> ColumnSpec {
    ColumnSpec {
        name,
        required: false,
        rule,
    }
}

/// Column layout and rules for importing one entity type.
#[derive(Debug)]
pub struct ImportSpec {
    pub kind: EntityKind,
    pub columns: &'static [ColumnSpec],
}

impl ImportSpec {
    pub fn for_kind(kind: EntityKind) -> &'static ImportSpec {
        match kind {
            EntityKind::Order => &ORDER_SPEC,
            EntityKind::Deposit => &DEPOSIT_SPEC,
            EntityKind::Withdrawal => &WITHDRAWAL_SPEC,
            EntityKind::Agent => &AGENT_SPEC,
        }
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().filter(|c| c.required).map(|c| c.name)
    }

    /// Position of the column holding the foreign shop reference, if any.
    pub fn reference_column(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| matches!(c.rule, FieldRule::ShopRef(_)))
    }
}

pub static PAYMENT_MODES: EnumTable = EnumTable {
    labels: &["Cash", "Bank Transfer", "Crypto", "Card"],
    synonyms: &[
        ("cash", "Cash"),
        ("bank transfer", "Bank Transfer"),
        ("bank_transfer", "Bank Transfer"),
        ("banktransfer", "Bank Transfer"),
        ("bank", "Bank Transfer"),
        ("transfer", "Bank Transfer"),
        ("wire", "Bank Transfer"),
        ("crypto", "Crypto"),
        ("cryptocurrency", "Crypto"),
        ("bitcoin", "Crypto"),
        ("btc", "Crypto"),
        ("usdt", "Crypto"),
        ("eth", "Crypto"),
        ("ethereum", "Crypto"),
        ("card", "Card"),
        ("credit card", "Card"),
        ("debit card", "Card"),
        ("credit", "Card"),
        ("debit", "Card"),
    ],
};

pub static ORDER_STATUSES: EnumTable = EnumTable {
    labels: &["Pending", "Completed", "Cancelled"],
    synonyms: &[
        ("pending", "Pending"),
        ("open", "Pending"),
        ("new", "Pending"),
        ("completed", "Completed"),
        ("complete", "Completed"),
        ("done", "Completed"),
        ("delivered", "Completed"),
        ("cancelled", "Cancelled"),
        ("canceled", "Cancelled"),
        ("void", "Cancelled"),
    ],
};

pub static ORDER_SPEC: ImportSpec = ImportSpec {
    kind: EntityKind::Order,
    columns: &[
        required("shop id", FieldRule::ShopRef(Tolerance::Reject)),
        required("date", FieldRule::Date(DateFormats::Iso, DateFallback::Today)),
        required("product", FieldRule::Text),
        required("quantity", FieldRule::Number(NumberKind::Integer, Bound::Positive)),
        required("price", FieldRule::Number(NumberKind::Decimal, Bound::NonNegative)),
        required("status", FieldRule::Enum(&ORDER_STATUSES)),
    ],
};

pub static DEPOSIT_SPEC: ImportSpec = ImportSpec {
    kind: EntityKind::Deposit,
    columns: &[
        required("shop id", FieldRule::ShopRef(Tolerance::Placeholder)),
        required("date", FieldRule::Date(DateFormats::Flexible, DateFallback::Today)),
        required("amount", FieldRule::Number(NumberKind::Decimal, Bound::Positive)),
        required("payment mode", FieldRule::Enum(&PAYMENT_MODES)),
    ],
};

pub static WITHDRAWAL_SPEC: ImportSpec = ImportSpec {
    kind: EntityKind::Withdrawal,
    columns: &[
        required("shop id", FieldRule::ShopRef(Tolerance::Reject)),
        required("date", FieldRule::Date(DateFormats::Flexible, DateFallback::Today)),
        required("amount", FieldRule::Number(NumberKind::Decimal, Bound::Positive)),
        required("payment mode", FieldRule::Enum(&PAYMENT_MODES)),
        optional("note", FieldRule::Text),
    ],
};

pub static AGENT_SPEC: ImportSpec = ImportSpec {
    kind: EntityKind::Agent,
    columns: &[
        required("name", FieldRule::Text),
        required("email", FieldRule::Text),
        optional("phone", FieldRule::Text),
        optional("region", FieldRule::Text),
        optional("joined", FieldRule::Date(DateFormats::Flexible, DateFallback::Reject)),
    ],
};
