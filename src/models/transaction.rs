use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Largest amount a single record may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" | "incomes" | "in" => Some(Self::Income),
            "expense" | "expenses" | "exp" | "out" => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn all() -> &'static [TransactionKind] {
        &[Self::Income, Self::Expense]
    }

    /// Backing table for this kind of record.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Self::Income => "incomes",
            Self::Expense => "expenses",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

/// A single income or expense record. Amounts are stored as absolute values;
/// the kind carries the direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub kind: TransactionKind,
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    #[serde(rename = "date")]
    pub occurred_on: NaiveDate,
    pub created_at: String,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        name: String,
        amount: Decimal,
        category: String,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            kind,
            name,
            amount,
            category,
            occurred_on,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Amount with the sign implied by the kind (expenses negative).
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_fields(
            Some(&self.name),
            Some(self.amount),
            Some(&self.category),
        )
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub occurred_on: Option<NaiveDate>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.occurred_on.is_none()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_fields(self.name.as_deref(), self.amount, self.category.as_deref())
    }

    pub fn apply(&self, txn: &mut Transaction) {
        if let Some(name) = &self.name {
            txn.name = name.clone();
        }
        if let Some(amount) = self.amount {
            txn.amount = amount;
        }
        if let Some(category) = &self.category {
            txn.category = category.clone();
        }
        if let Some(date) = self.occurred_on {
            txn.occurred_on = date;
        }
    }
}

fn validate_fields(
    name: Option<&str>,
    amount: Option<Decimal>,
    category: Option<&str>,
) -> anyhow::Result<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        anyhow::bail!("Name must not be empty");
    }
    if category.is_some_and(|c| c.trim().is_empty()) {
        anyhow::bail!("Category must not be empty");
    }
    if let Some(amount) = amount {
        if amount < Decimal::ZERO {
            anyhow::bail!("Amount must not be negative: {amount}");
        }
        if amount > MAX_AMOUNT {
            anyhow::bail!("Amount must not exceed {MAX_AMOUNT}: {amount}");
        }
    }
    Ok(())
}
