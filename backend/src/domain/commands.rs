//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer and the CLI are responsible
//! for mapping the public DTOs defined in the `shared` crate to these
//! internal types.

pub mod members {
    use crate::domain::models::member::Member;
    use chrono::NaiveDate;

    /// Input for registering a new person.
    #[derive(Debug, Clone, Default)]
    pub struct RegisterMemberCommand {
        pub name: String,
        pub password: String,
        /// Caller-chosen consumer code; generated when absent
        pub consumer_code: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub document: Option<String>,
        pub address: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub zip_code: Option<String>,
        pub birth_date: Option<NaiveDate>,
    }

    /// Profile fields a member may change about themselves.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateProfileCommand {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub address: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub zip_code: Option<String>,
    }

    /// Administrator change of the role flags.
    #[derive(Debug, Clone)]
    pub struct SetMembershipCommand {
        pub admin_id: String,
        pub member_id: String,
        pub is_member: Option<bool>,
        pub is_admin: Option<bool>,
    }

    /// Result of a successful login.
    #[derive(Debug, Clone)]
    pub struct AuthenticationResult {
        pub member: Member,
        pub is_admin: bool,
    }
}

pub mod credits {
    /// A member asking for credit.
    #[derive(Debug, Clone)]
    pub struct RequestCreditCommand {
        pub member_id: String,
        pub amount: f64,
        pub description: Option<String>,
    }

    /// An administrator granting credit directly, skipping the request step.
    #[derive(Debug, Clone)]
    pub struct AdminCreditCommand {
        pub admin_id: String,
        pub member_id: String,
        pub amount: f64,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct DecideCreditCommand {
        pub credit_id: String,
        pub admin_id: String,
        pub approve: bool,
    }
}

pub mod payments {
    use crate::domain::models::member::Member;
    use crate::domain::models::payment::Payment;
    use chrono::{DateTime, Utc};
    use shared::PaymentMethod;

    #[derive(Debug, Clone)]
    pub struct RecordPaymentCommand {
        pub member_id: String,
        pub credit_id: String,
        pub amount: f64,
        pub method: Option<PaymentMethod>,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct MonthlyPaymentCommand {
        pub member_id: String,
        pub amount: f64,
        pub description: Option<String>,
        /// Administrator registering the payment on the member's behalf
        pub admin_id: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct MonthlyPaymentResult {
        /// One confirmed payment per credit the amount was applied to, oldest first
        pub payments: Vec<Payment>,
        /// Outstanding debt across approved credits before the payment
        pub previous_debt: f64,
        pub new_balance: f64,
    }

    /// Outstanding balance of one approved credit.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CreditBalance {
        pub credit_id: String,
        pub amount: f64,
        pub interest: f64,
        pub total: f64,
        pub total_paid: f64,
        pub outstanding: f64,
        pub due_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Clone)]
    pub struct MemberStatement {
        pub member: Member,
        pub credits: Vec<CreditBalance>,
        pub total_outstanding: f64,
        pub total_paid: f64,
        pub next_due_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct MemberDebtSummary {
        pub member_id: String,
        pub consumer_code: String,
        pub name: String,
        pub approved_credits: usize,
        pub total_outstanding: f64,
        pub total_paid: f64,
        pub monthly_payments: usize,
        pub last_monthly_payment: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Clone)]
    pub struct MonthlyOverview {
        pub members: Vec<MemberDebtSummary>,
        pub members_in_debt: usize,
        pub total_outstanding: f64,
        pub total_paid: f64,
        pub total_monthly_payments: usize,
    }
}
