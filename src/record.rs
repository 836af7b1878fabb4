use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Order,
    Deposit,
    Withdrawal,
    Agent,
}

impl EntityKind {
    /// Two-letter prefix of generated identifiers.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Order => "OR",
            EntityKind::Deposit => "DP",
            EntityKind::Withdrawal => "WD",
            EntityKind::Agent => "AG",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Order => "order",
            EntityKind::Deposit => "deposit",
            EntityKind::Withdrawal => "withdrawal",
            EntityKind::Agent => "agent",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "order" | "orders" => Ok(EntityKind::Order),
            "deposit" | "deposits" => Ok(EntityKind::Deposit),
            "withdrawal" | "withdrawals" => Ok(EntityKind::Withdrawal),
            "agent" | "agents" => Ok(EntityKind::Agent),
            other => Err(format!("unknown entity type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Crypto,
    Card,
}

impl PaymentMode {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::BankTransfer => "Bank Transfer",
            PaymentMode::Crypto => "Crypto",
            PaymentMode::Card => "Card",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Cash" => Some(PaymentMode::Cash),
            "Bank Transfer" => Some(PaymentMode::BankTransfer),
            "Crypto" => Some(PaymentMode::Crypto),
            "Card" => Some(PaymentMode::Card),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Pending" => Some(OrderStatus::Pending),
            "Completed" => Some(OrderStatus::Completed),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub shop_id: String,
    pub client_name: String,
    pub agent: String,
    pub date: NaiveDate,
    pub product: String,
    pub quantity: u32,
    pub price: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: String,
    pub shop_id: String,
    pub client_name: String,
    pub agent: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: String,
    pub shop_id: String,
    pub client_name: String,
    pub agent: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub payment_mode: PaymentMode,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub joined: Option<NaiveDate>,
}

/// A row that passed every rule of its entity's import spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ValidatedRecord {
    Order(Order),
    Deposit(Deposit),
    Withdrawal(Withdrawal),
    Agent(Agent),
}

impl ValidatedRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            ValidatedRecord::Order(_) => EntityKind::Order,
            ValidatedRecord::Deposit(_) => EntityKind::Deposit,
            ValidatedRecord::Withdrawal(_) => EntityKind::Withdrawal,
            ValidatedRecord::Agent(_) => EntityKind::Agent,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ValidatedRecord::Order(o) => &o.id,
            ValidatedRecord::Deposit(d) => &d.id,
            ValidatedRecord::Withdrawal(w) => &w.id,
            ValidatedRecord::Agent(a) => &a.id,
        }
    }

    pub fn shop_id(&self) -> Option<&str> {
        match self {
            ValidatedRecord::Order(o) => Some(o.shop_id.as_str()),
            ValidatedRecord::Deposit(d) => Some(d.shop_id.as_str()),
            ValidatedRecord::Withdrawal(w) => Some(w.shop_id.as_str()),
            ValidatedRecord::Agent(_) => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            ValidatedRecord::Order(o) => Some(o.date),
            ValidatedRecord::Deposit(d) => Some(d.date),
            ValidatedRecord::Withdrawal(w) => Some(w.date),
            ValidatedRecord::Agent(a) => a.joined,
        }
    }

    /// Monetary value shown in the amount column: order total or cash amount.
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            ValidatedRecord::Order(o) => Some(o.total),
            ValidatedRecord::Deposit(d) => Some(d.amount),
            ValidatedRecord::Withdrawal(w) => Some(w.amount),
            ValidatedRecord::Agent(_) => None,
        }
    }

    /// Text fields matched by the table search box.
    pub fn search_fields(&self) -> Vec<&str> {
        match self {
            ValidatedRecord::Order(o) => vec![
                o.id.as_str(),
                o.shop_id.as_str(),
                o.client_name.as_str(),
                o.agent.as_str(),
                o.product.as_str(),
                o.status.label(),
            ],
            ValidatedRecord::Deposit(d) => vec![
                d.id.as_str(),
                d.shop_id.as_str(),
                d.client_name.as_str(),
                d.agent.as_str(),
                d.payment_mode.label(),
            ],
            ValidatedRecord::Withdrawal(w) => {
                let mut fields = vec![
                    w.id.as_str(),
                    w.shop_id.as_str(),
                    w.client_name.as_str(),
                    w.agent.as_str(),
                    w.payment_mode.label(),
                ];
                fields.extend(w.note.as_deref());
                fields
            }
            ValidatedRecord::Agent(a) => {
                let mut fields = vec![a.id.as_str(), a.name.as_str(), a.email.as_str()];
                fields.extend(a.phone.as_deref());
                fields.extend(a.region.as_deref());
                fields
            }
        }
    }
}
