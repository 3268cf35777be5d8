//! Transaction-entry form rules, kept free of DOM types.

pub const CREDIT_CARD_ACCOUNT: &str = "Credit Card";
pub const CREDIT_CARD_PAYMENT_CATEGORY: &str = "Credit Card Payment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    /// Exact match on the select value. Anything else is "no type yet".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Account,
    FromAccount,
    ToAccount,
    Category,
}

impl FieldGroup {
    pub const ALL: [Self; 4] = [
        Self::Account,
        Self::FromAccount,
        Self::ToAccount,
        Self::Category,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Self::Account => "account_group",
            Self::FromAccount => "from_account_group",
            Self::ToAccount => "to_account_group",
            Self::Category => "category_group",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupVisibility {
    pub account: bool,
    pub from_account: bool,
    pub to_account: bool,
    pub category: bool,
}

impl GroupVisibility {
    pub const HIDDEN: Self = Self {
        account: false,
        from_account: false,
        to_account: false,
        category: false,
    };

    pub fn for_type(transaction_type: Option<TransactionType>) -> Self {
        match transaction_type {
            Some(TransactionType::Income | TransactionType::Expense) => Self {
                account: true,
                category: true,
                ..Self::HIDDEN
            },
            Some(TransactionType::Transfer) => Self {
                from_account: true,
                to_account: true,
                category: true,
                ..Self::HIDDEN
            },
            None => Self::HIDDEN,
        }
    }

    pub fn for_value(raw: &str) -> Self {
        Self::for_type(TransactionType::parse(raw))
    }

    pub fn is_shown(&self, group: FieldGroup) -> bool {
        match group {
            FieldGroup::Account => self.account,
            FieldGroup::FromAccount => self.from_account,
            FieldGroup::ToAccount => self.to_account,
            FieldGroup::Category => self.category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    /// Value forced and field disabled.
    Locked(&'static str),
    Editable,
}

/// Paying off the card from another account is always a card payment.
pub fn category_for_destination(to_account: Option<&str>) -> CategoryField {
    match to_account {
        Some(CREDIT_CARD_ACCOUNT) => CategoryField::Locked(CREDIT_CARD_PAYMENT_CATEGORY),
        _ => CategoryField::Editable,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid positive amount.")]
    InvalidAmount,
    #[error("Credit Card cannot receive income.")]
    CreditCardIncome,
    #[error("Please choose both a source and a destination account.")]
    IncompleteTransfer,
}

/// Values read from a form at submit time. `None` means the form has no
/// such field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmittedForm {
    pub amount: Option<String>,
    pub account: Option<String>,
    pub transaction_type: Option<String>,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
}

pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Returns the first rule the form breaks.
pub fn validate_submission(form: &SubmittedForm) -> Result<(), ValidationError> {
    if let Some(amount) = &form.amount {
        match parse_amount(amount) {
            Some(value) if value > 0.0 => {}
            _ => return Err(ValidationError::InvalidAmount),
        }
    }

    let transaction_type = form.transaction_type.as_deref().and_then(TransactionType::parse);

    if transaction_type == Some(TransactionType::Income)
        && form.account.as_deref() == Some(CREDIT_CARD_ACCOUNT)
    {
        return Err(ValidationError::CreditCardIncome);
    }

    if transaction_type == Some(TransactionType::Transfer) {
        let missing = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|value| value.trim().is_empty())
        };
        if missing(&form.from_account) || missing(&form.to_account) {
            return Err(ValidationError::IncompleteTransfer);
        }
    }

    Ok(())
}
