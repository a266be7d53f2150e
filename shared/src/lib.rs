use serde::{Deserialize, Serialize};
use std::fmt;

/// Public view of a member record. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    /// Human-facing identifier, e.g. "PPDLZ3K9Q0A7F2XC"
    pub consumer_code: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub document: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    /// ISO 8601 date (YYYY-MM-DD)
    pub birth_date: Option<String>,
    pub is_member: bool,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: String, // RFC 3339 timestamp
    pub updated_at: String, // RFC 3339 timestamp
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterMemberRequest {
    pub name: String,
    pub password: String,
    /// Optional caller-chosen consumer code; generated when absent
    #[serde(default)]
    pub consumer_code: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

/// Admin toggle of the membership and admin flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetMembershipRequest {
    pub admin_id: String,
    #[serde(default)]
    pub is_member: Option<bool>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminActionRequest {
    pub admin_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberListQuery {
    pub admin_id: String,
    #[serde(default)]
    pub include_inactive: Option<bool>,
}

/// Look a member up by consumer code (case-insensitive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLookupQuery {
    pub consumer_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberResponse {
    pub member: Member,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberListResponse {
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub consumer_code: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub member: Member,
    pub is_admin: bool,
    pub success_message: String,
}

/// Lifecycle status of a credit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    Requested,
    Approved,
    Rejected,
    Paid,
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CreditStatus::Requested => "requested",
            CreditStatus::Approved => "approved",
            CreditStatus::Rejected => "rejected",
            CreditStatus::Paid => "paid",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub id: String,
    pub member_id: String,
    /// Principal requested
    pub amount: f64,
    /// Rate applied at creation (0.15 = 15%)
    pub interest_rate: f64,
    pub interest: f64,
    /// amount + interest, fixed at creation
    pub total: f64,
    pub status: CreditStatus,
    pub description: Option<String>,
    pub requested_at: String,
    pub decided_at: Option<String>,
    pub due_date: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditApplicationRequest {
    pub member_id: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCreditRequest {
    pub admin_id: String,
    pub member_id: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecideCreditRequest {
    pub credit_id: String,
    pub admin_id: String,
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditListQuery {
    pub member_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditResponse {
    pub credit: Credit,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditListResponse {
    pub credits: Vec<Credit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Transfer,
    Cash,
    MonthlyFee,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub member_id: String,
    pub credit_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub description: Option<String>,
    pub paid_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub member_id: String,
    pub credit_id: String,
    pub amount: f64,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Admin confirmation or failure of a pending payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDecisionRequest {
    pub payment_id: String,
    pub admin_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPaymentRequest {
    pub member_id: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Set when an administrator registers the payment on the member's behalf
    #[serde(default)]
    pub admin_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentListQuery {
    pub member_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentListResponse {
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPaymentResponse {
    /// The payment split across credits, oldest credit first
    pub payments: Vec<Payment>,
    /// Outstanding debt across approved credits before this payment
    pub previous_debt: f64,
    pub new_balance: f64,
    pub success_message: String,
}

/// Either a member's own statement (`member_id`) or the admin overview (`admin_id`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MonthlyPaymentQuery {
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub admin_id: Option<String>,
}

/// Outstanding balance of a single approved credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditBalance {
    pub credit_id: String,
    pub amount: f64,
    pub interest: f64,
    pub total: f64,
    pub total_paid: f64,
    pub outstanding: f64,
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStatement {
    pub member: Member,
    pub total_outstanding: f64,
    pub total_paid: f64,
    pub credits: Vec<CreditBalance>,
    /// Earliest due date still in the future
    pub next_due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDebtSummary {
    pub member_id: String,
    pub consumer_code: String,
    pub name: String,
    pub approved_credits: usize,
    pub total_outstanding: f64,
    pub total_paid: f64,
    pub monthly_payments: usize,
    pub last_monthly_payment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyOverview {
    pub members: Vec<MemberDebtSummary>,
    pub total_members: usize,
    pub members_in_debt: usize,
    pub total_outstanding: f64,
    pub total_paid: f64,
    pub total_monthly_payments: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationOutcome {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub member_id: String,
    /// e.g. "credit_approved", "payment_confirmed"
    pub kind: String,
    pub description: String,
    pub outcome: NotificationOutcome,
    pub response: Option<String>,
    pub created_at: String,
    pub responded_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationListQuery {
    pub member_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
}

/// Key-value admin configuration row (interest rates, credit limits)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: String,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingListResponse {
    pub settings: Vec<Setting>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSettingRequest {
    pub admin_id: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingResponse {
    pub setting: Setting,
    pub success_message: String,
}

/// Record counts reported by the store's maintenance endpoint and CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_members: usize,
    pub active_members: usize,
    pub members_with_membership: usize,
    pub admins: usize,
    pub total_credits: usize,
    pub requested_credits: usize,
    pub approved_credits: usize,
    pub rejected_credits: usize,
    pub paid_credits: usize,
    pub total_credit_amount: f64,
    pub total_payments: usize,
    pub confirmed_payments: usize,
    pub total_notifications: usize,
    pub total_settings: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugAction {
    Reset,
    Stats,
    Backup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugRequest {
    pub action: DebugAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugResponse {
    pub message: String,
    pub stats: Option<StoreStats>,
    pub backup_path: Option<String>,
}

/// Body of every non-2xx JSON response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
