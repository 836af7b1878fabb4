use crate::client::Client;
use crate::error::{ImportError, RowError};
use crate::ids::IdSequence;
use crate::import::parser::{ParsedCsv, RawRow};
use crate::import::spec::{
    Bound, ColumnSpec, DateFallback, DateFormats, FieldRule, ImportSpec, NumberKind, Tolerance,
};
use crate::record::{
    Agent, Deposit, EntityKind, Order, OrderStatus, PaymentMode, ValidatedRecord, Withdrawal,
};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

const ISO_FORMATS: &[&str] = &["%Y-%m-%d"];

// Day-first layouts are tried before month-first ones.
const FLEXIBLE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const FLEXIBLE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Header position of every import column, resolved once per import.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnIndex {
    positions: Vec<Option<usize>>,
}

impl ColumnIndex {
    /// Fails with every required column the header lacks.
    pub fn resolve(spec: &ImportSpec, parsed: &ParsedCsv) -> Result<Self, ImportError> {
        let positions: Vec<Option<usize>> = spec
            .columns
            .iter()
            .map(|column| parsed.column(column.name))
            .collect();

        let missing: Vec<String> = spec
            .columns
            .iter()
            .zip(&positions)
            .filter(|(column, position)| column.required && position.is_none())
            .map(|(column, _)| column.name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }
        debug!(kind = %spec.kind, ?positions, "Resolved import columns");

        Ok(Self { positions })
    }

    /// Cell of `row` for the import column at `column`; empty when the column
    /// is absent from the header or the row is short.
    pub fn cell<'r>(&self, row: &'r RawRow, column: usize) -> &'r str {
        match self.positions.get(column).copied().flatten() {
            Some(index) => row.cell(index),
            None => "",
        }
    }
}

/// Lookups shared by every row of one import.
pub struct RowContext<'a> {
    /// Known clients by shop id. Absent keys are unknown shops.
    pub clients: &'a HashMap<String, Client>,
    /// Substituted for unparseable dates where the field allows it.
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Decimal(Decimal),
    Integer(u64),
    Label(&'static str),
    Date(NaiveDate),
    Shop(Client),
    Empty,
}

#[derive(Debug, Default)]
pub struct RowValues {
    values: Vec<(&'static str, Value)>,
}

impl RowValues {
    fn push(&mut self, column: &'static str, value: Value) {
        self.values.push((column, value));
    }

    fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    fn text(&self, column: &str) -> Result<String, RowError> {
        self.opt_text(column).ok_or_else(|| missing(column))
    }

    fn opt_text(&self, column: &str) -> Option<String> {
        match self.get(column) {
            Some(Value::Text(text)) => Some(text.clone()),
            _ => None,
        }
    }

    fn decimal(&self, column: &str) -> Result<Decimal, RowError> {
        match self.get(column) {
            Some(Value::Decimal(value)) => Ok(*value),
            _ => Err(missing(column)),
        }
    }

    fn integer(&self, column: &str) -> Result<u64, RowError> {
        match self.get(column) {
            Some(Value::Integer(value)) => Ok(*value),
            _ => Err(missing(column)),
        }
    }

    fn label(&self, column: &str) -> Result<&'static str, RowError> {
        match self.get(column) {
            Some(Value::Label(label)) => Ok(*label),
            _ => Err(missing(column)),
        }
    }

    fn date(&self, column: &str) -> Result<NaiveDate, RowError> {
        self.opt_date(column).ok_or_else(|| missing(column))
    }

    fn opt_date(&self, column: &str) -> Option<NaiveDate> {
        match self.get(column) {
            Some(Value::Date(date)) => Some(*date),
            _ => None,
        }
    }

    fn shop(&self, column: &str) -> Result<Client, RowError> {
        match self.get(column) {
            Some(Value::Shop(client)) => Ok(client.clone()),
            _ => Err(missing(column)),
        }
    }
}

fn missing(column: &str) -> RowError {
    RowError::MissingValue {
        column: column.to_string(),
    }
}

/// Checks one row against `spec` and builds its record. An identifier is
/// drawn from `ids` only when every field passes.
pub fn validate_row(
    spec: &ImportSpec,
    columns: &ColumnIndex,
    row: &RawRow,
    ctx: &RowContext<'_>,
    ids: &mut IdSequence,
) -> Result<ValidatedRecord, RowError> {
    let mut values = RowValues::default();

    for (position, column) in spec.columns.iter().enumerate() {
        let value = check_cell(column, columns.cell(row, position), ctx)?;
        values.push(column.name, value);
    }

    build_record(spec.kind, &values, ids)
}

pub fn check_cell(column: &ColumnSpec, raw: &str, ctx: &RowContext<'_>) -> Result<Value, RowError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return match column.rule {
            FieldRule::Date(_, DateFallback::Today) if column.required => Ok(Value::Date(ctx.today)),
            _ if column.required => Err(missing(column.name)),
            _ => Ok(Value::Empty),
        };
    }

    match column.rule {
        FieldRule::Text => Ok(Value::Text(raw.to_string())),
        FieldRule::Number(kind, bound) => parse_number(column.name, raw, kind, bound),
        FieldRule::Enum(table) => {
            table
                .normalize(raw)
                .map(Value::Label)
                .ok_or_else(|| RowError::UnknownLabel {
                    column: column.name.to_string(),
                    value: raw.to_string(),
                })
        }
        FieldRule::Date(formats, fallback) => match (parse_date(raw, formats), fallback) {
            (Some(date), _) => Ok(Value::Date(date)),
            (None, DateFallback::Today) => Ok(Value::Date(ctx.today)),
            (None, DateFallback::Reject) => Err(RowError::InvalidDate {
                column: column.name.to_string(),
                value: raw.to_string(),
            }),
        },
        FieldRule::ShopRef(tolerance) => match (ctx.clients.get(raw), tolerance) {
            (Some(client), _) => Ok(Value::Shop(client.clone())),
            (None, Tolerance::Placeholder) => Ok(Value::Shop(Client::placeholder(raw))),
            (None, Tolerance::Reject) => Err(RowError::UnknownShop(raw.to_string())),
        },
    }
}

pub fn parse_number(
    column: &str,
    raw: &str,
    kind: NumberKind,
    bound: Bound,
) -> Result<Value, RowError> {
    let invalid = || RowError::InvalidNumber {
        column: column.to_string(),
        value: raw.to_string(),
    };
    let out_of_bounds = || RowError::OutOfBounds {
        column: column.to_string(),
        value: raw.to_string(),
        bound: bound.describe(),
    };

    // Digit separators are not accepted in money or counts.
    if raw.contains('_') {
        return Err(invalid());
    }

    match kind {
        NumberKind::Decimal => {
            let value = Decimal::from_str(raw)
                .or_else(|_| Decimal::from_scientific(raw))
                .map_err(|_| invalid())?;
            if !within(value, bound) {
                return Err(out_of_bounds());
            }
            Ok(Value::Decimal(value))
        }
        NumberKind::Integer => {
            let value: i64 = raw.parse().map_err(|_| invalid())?;
            if !within(Decimal::from(value), bound) {
                return Err(out_of_bounds());
            }
            let value = u64::try_from(value).map_err(|_| out_of_bounds())?;
            Ok(Value::Integer(value))
        }
    }
}

fn within(value: Decimal, bound: Bound) -> bool {
    match bound {
        Bound::Positive => value > Decimal::ZERO,
        Bound::NonNegative => value >= Decimal::ZERO,
    }
}

pub fn parse_date(raw: &str, formats: DateFormats) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_formats = match formats {
        DateFormats::Iso => ISO_FORMATS,
        DateFormats::Flexible => FLEXIBLE_FORMATS,
    };

    let four_digit_year = |date: &NaiveDate| has_four_digit_year(raw, date.year());

    let date = date_formats
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .find(four_digit_year);
    if date.is_some() || formats == DateFormats::Iso {
        return date;
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.date_naive())
        .into_iter()
        .chain(
            FLEXIBLE_DATETIME_FORMATS
                .iter()
                .filter_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|timestamp| timestamp.date()),
        )
        .find(four_digit_year)
}

// `%Y` accepts years of any width.
fn has_four_digit_year(raw: &str, year: i32) -> bool {
    raw.split(|c: char| !c.is_ascii_digit())
        .any(|token| token.len() == 4 && token.parse::<i32>() == Ok(year))
}

fn build_record(
    kind: EntityKind,
    values: &RowValues,
    ids: &mut IdSequence,
) -> Result<ValidatedRecord, RowError> {
    match kind {
        EntityKind::Order => {
            let shop = values.shop("shop id")?;
            let date = values.date("date")?;
            let product = values.text("product")?;
            let quantity = values.integer("quantity")?;
            let quantity = u32::try_from(quantity).map_err(|_| RowError::OutOfBounds {
                column: "quantity".to_string(),
                value: quantity.to_string(),
                bound: "at most 4294967295",
            })?;
            let price = values.decimal("price")?;
            let status = order_status(values.label("status")?)?;
            let total = price
                .checked_mul(Decimal::from(quantity))
                .ok_or_else(|| RowError::OutOfBounds {
                    column: "price".to_string(),
                    value: price.to_string(),
                    bound: "small enough for the order total",
                })?;

            Ok(ValidatedRecord::Order(Order {
                id: ids.next_id(),
                shop_id: shop.shop_id,
                client_name: shop.name,
                agent: shop.agent,
                date,
                product,
                quantity,
                price,
                total,
                status,
            }))
        }
        EntityKind::Deposit => {
            let shop = values.shop("shop id")?;
            let date = values.date("date")?;
            let amount = values.decimal("amount")?;
            let payment_mode = payment_mode(values.label("payment mode")?)?;

            Ok(ValidatedRecord::Deposit(Deposit {
                id: ids.next_id(),
                shop_id: shop.shop_id,
                client_name: shop.name,
                agent: shop.agent,
                date,
                amount,
                payment_mode,
            }))
        }
        EntityKind::Withdrawal => {
            let shop = values.shop("shop id")?;
            let date = values.date("date")?;
            let amount = values.decimal("amount")?;
            let payment_mode = payment_mode(values.label("payment mode")?)?;

            Ok(ValidatedRecord::Withdrawal(Withdrawal {
                id: ids.next_id(),
                shop_id: shop.shop_id,
                client_name: shop.name,
                agent: shop.agent,
                date,
                amount,
                payment_mode,
                note: values.opt_text("note"),
            }))
        }
        EntityKind::Agent => {
            let name = values.text("name")?;
            let email = values.text("email")?;

            Ok(ValidatedRecord::Agent(Agent {
                id: ids.next_id(),
                name,
                email,
                phone: values.opt_text("phone"),
                region: values.opt_text("region"),
                joined: values.opt_date("joined"),
            }))
        }
    }
}

fn payment_mode(label: &str) -> Result<PaymentMode, RowError> {
    PaymentMode::from_label(label).ok_or_else(|| RowError::UnknownLabel {
        column: "payment mode".to_string(),
        value: label.to_string(),
    })
}

fn order_status(label: &str) -> Result<OrderStatus, RowError> {
    OrderStatus::from_label(label).ok_or_else(|| RowError::UnknownLabel {
        column: "status".to_string(),
        value: label.to_string(),
    })
}
