//! # Legacy Import
//!
//! Converts documents written by the three older store layouts into the
//! canonical [`Database`]. The layout is detected from its top-level keys:
//!
//! - `associados` (layout A): associates, store credits, ledger movements
//! - `users` (layout B): users, priced credits, payments, requests, settings
//! - `members` + `transactions` (layout C): members, store credits, transactions
//!
//! Anything else is parsed as a canonical document. Legacy record IDs are
//! kept so that references between records stay valid.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use shared::{CreditStatus, NotificationOutcome, PaymentMethod, PaymentStatus};

use super::document::Database;
use crate::domain::models::credit::Credit;
use crate::domain::models::member::Member;
use crate::domain::models::notification::Notification;
use crate::domain::models::payment::Payment;
use crate::domain::models::setting::{
    Setting, CREDIT_LIMIT_MEMBERS, CREDIT_LIMIT_NON_MEMBERS, INTEREST_RATE_MEMBERS,
    INTEREST_RATE_NON_MEMBERS,
};
use crate::domain::password;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Canonical,
    Associates,
    Users,
    Members,
}

pub fn detect_layout(value: &Value) -> Layout {
    let Some(object) = value.as_object() else {
        return Layout::Canonical;
    };
    if object.contains_key("associados") {
        return Layout::Associates;
    }
    if object.contains_key("users") {
        return Layout::Users;
    }
    if object.contains_key("transactions") {
        return Layout::Members;
    }
    let camel_case_members = object
        .get("members")
        .and_then(Value::as_array)
        .map(|members| members.iter().any(|m| m.get("consumerCode").is_some()))
        .unwrap_or(false);
    if camel_case_members {
        Layout::Members
    } else {
        Layout::Canonical
    }
}

/// Parse a store document in any supported layout.
pub fn parse_document(content: &str) -> Result<Database> {
    let value: Value = serde_json::from_str(content).context("Document is not valid JSON")?;
    let layout = detect_layout(&value);
    let database = match layout {
        Layout::Canonical => serde_json::from_value(value).context("Invalid store document")?,
        Layout::Associates => {
            let legacy: AssociatesDocument =
                serde_json::from_value(value).context("Invalid associates document")?;
            convert_associates(legacy)
        }
        Layout::Users => {
            let legacy: UsersDocument =
                serde_json::from_value(value).context("Invalid users document")?;
            convert_users(legacy)?
        }
        Layout::Members => {
            let legacy: MembersDocument =
                serde_json::from_value(value).context("Invalid members document")?;
            convert_members(legacy)
        }
    };
    if layout != Layout::Canonical {
        info!("Converted {:?} layout: {} members", layout, database.members.len());
    }
    Ok(database)
}

/// Accepts RFC 3339 timestamps and plain dates; anything else becomes now.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.with_timezone(&Utc);
    }
    if let Some(midnight) = parse_date(raw).and_then(|date| date.and_hms_opt(0, 0, 0)) {
        return midnight.and_utc();
    }
    warn!("Unreadable legacy timestamp {:?}, using current time", raw);
    Utc::now()
}

fn parse_optional_timestamp(raw: &Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(parse_timestamp)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Layout A

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssociatesDocument {
    #[serde(default)]
    associados: Vec<Associate>,
    #[serde(default)]
    creditos: Vec<StoreCredit>,
    #[serde(default)]
    transacoes: Vec<Movement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Associate {
    id: String,
    codigo_consumidor: String,
    nome: String,
    #[serde(default)]
    email: Option<String>,
    senha: String,
    #[serde(default)]
    telefone: Option<String>,
    #[serde(default)]
    cpf: Option<String>,
    #[serde(default)]
    data_nascimento: Option<String>,
    #[serde(default)]
    endereco: Option<String>,
    #[serde(default)]
    cep: Option<String>,
    #[serde(default)]
    cidade: Option<String>,
    #[serde(default)]
    estado: Option<String>,
    tipo_membro: String,
    data_cadastro: String,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default = "default_true")]
    ativo: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreCredit {
    id: String,
    associado_id: String,
    valor: f64,
    #[serde(default)]
    descricao: Option<String>,
    data_credito: String,
    #[serde(default)]
    validade: Option<String>,
    #[serde(default)]
    utilizado: bool,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Movement {
    id: String,
    associado_id: String,
    #[serde(default)]
    credito_id: Option<String>,
    tipo: String,
    valor: f64,
    #[serde(default)]
    descricao: Option<String>,
    data_transacao: String,
}

fn default_true() -> bool {
    true
}

fn convert_associates(legacy: AssociatesDocument) -> Database {
    let mut database = Database::default();

    for associate in legacy.associados {
        let created_at = parse_timestamp(&associate.data_cadastro);
        let is_admin = associate.codigo_consumidor == "ADMIN001";
        database.members.push(Member {
            id: associate.id,
            consumer_code: associate.codigo_consumidor.to_uppercase(),
            name: associate.nome,
            email: non_empty(associate.email),
            password_hash: associate.senha,
            phone: non_empty(associate.telefone),
            document: non_empty(associate.cpf),
            address: non_empty(associate.endereco),
            city: non_empty(associate.cidade),
            state: non_empty(associate.estado),
            zip_code: non_empty(associate.cep),
            birth_date: associate.data_nascimento.as_deref().and_then(parse_date),
            is_member: is_admin || associate.tipo_membro == "MEMBRO",
            is_admin,
            is_active: associate.ativo,
            created_at,
            updated_at: parse_optional_timestamp(&associate.updated_at).unwrap_or(created_at),
        });
    }

    for store_credit in legacy.creditos {
        let requested_at = parse_timestamp(&store_credit.data_credito);
        database.credits.push(Credit {
            id: store_credit.id,
            member_id: store_credit.associado_id,
            amount: store_credit.valor,
            interest_rate: 0.0,
            interest: 0.0,
            total: store_credit.valor,
            status: if store_credit.utilizado {
                CreditStatus::Paid
            } else {
                CreditStatus::Approved
            },
            description: store_credit.descricao,
            requested_at,
            decided_at: Some(requested_at),
            due_date: parse_optional_timestamp(&store_credit.validade),
            updated_at: parse_optional_timestamp(&store_credit.updated_at).unwrap_or(requested_at),
        });
    }

    for movement in legacy.transacoes {
        if movement.tipo != "DEBITO" {
            continue;
        }
        let Some(credit_id) = movement
            .credito_id
            .clone()
            .or_else(|| first_credit_of(&database, &movement.associado_id))
        else {
            warn!("Skipping debit {}: member has no credit to apply it to", movement.id);
            continue;
        };
        let paid_at = parse_timestamp(&movement.data_transacao);
        database.payments.push(Payment {
            id: movement.id,
            member_id: movement.associado_id,
            credit_id,
            amount: movement.valor.abs(),
            method: PaymentMethod::Other,
            status: PaymentStatus::Confirmed,
            description: movement.descricao,
            paid_at,
            updated_at: paid_at,
        });
    }

    database
}

fn first_credit_of(database: &Database, member_id: &str) -> Option<String> {
    database
        .credits
        .iter()
        .filter(|c| c.member_id == member_id)
        .min_by_key(|c| c.requested_at)
        .map(|c| c.id.clone())
}

// Layout B

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsersDocument {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    credits: Vec<PricedCredit>,
    #[serde(default)]
    payments: Vec<UserPayment>,
    #[serde(default)]
    solicitacoes: Vec<Request>,
    #[serde(default)]
    admin_settings: Vec<AdminSetting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    id: String,
    codigo_consumidor: String,
    nome: String,
    #[serde(default)]
    email: Option<String>,
    senha: String,
    #[serde(default)]
    is_membro: bool,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    telefone: Option<String>,
    #[serde(default)]
    endereco: Option<String>,
    created_at: String,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricedCredit {
    id: String,
    user_id: String,
    valor: f64,
    #[serde(default)]
    juros: f64,
    #[serde(default)]
    valor_total: Option<f64>,
    status: String,
    data_solicitacao: String,
    #[serde(default)]
    data_aprovacao: Option<String>,
    #[serde(default)]
    data_vencimento: Option<String>,
    #[serde(default)]
    descricao: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPayment {
    id: String,
    credit_id: String,
    user_id: String,
    valor: f64,
    data_pagamento: String,
    status: String,
    #[serde(default)]
    metodo: Option<String>,
    #[serde(default)]
    descricao: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    id: String,
    user_id: String,
    tipo: String,
    descricao: String,
    status: String,
    data_solicitacao: String,
    #[serde(default)]
    data_resposta: Option<String>,
    #[serde(default)]
    resposta: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminSetting {
    id: String,
    chave: String,
    valor: String,
    #[serde(default)]
    descricao: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

fn credit_status(raw: &str) -> CreditStatus {
    match raw {
        "aprovado" => CreditStatus::Approved,
        "rejeitado" => CreditStatus::Rejected,
        "pago" => CreditStatus::Paid,
        _ => CreditStatus::Requested,
    }
}

fn payment_status(raw: &str) -> PaymentStatus {
    match raw {
        "confirmado" | "COMPLETED" => PaymentStatus::Confirmed,
        "falhou" | "FAILED" | "CANCELLED" => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

fn payment_method(raw: Option<&str>) -> PaymentMethod {
    match raw {
        Some("transferencia") | None => PaymentMethod::Transfer,
        Some("dinheiro") => PaymentMethod::Cash,
        Some("mensalidade") => PaymentMethod::MonthlyFee,
        Some(_) => PaymentMethod::Other,
    }
}

fn notification_outcome(raw: &str) -> NotificationOutcome {
    match raw {
        "aprovado" => NotificationOutcome::Approved,
        "rejeitado" => NotificationOutcome::Rejected,
        _ => NotificationOutcome::Pending,
    }
}

fn setting_key(raw: &str) -> Option<&'static str> {
    match raw {
        "taxa_juros_membros" => Some(INTEREST_RATE_MEMBERS),
        "taxa_juros_nao_membros" => Some(INTEREST_RATE_NON_MEMBERS),
        "limite_credito_membros" => Some(CREDIT_LIMIT_MEMBERS),
        "limite_credito_nao_membros" => Some(CREDIT_LIMIT_NON_MEMBERS),
        _ => None,
    }
}

fn convert_users(legacy: UsersDocument) -> Result<Database> {
    let mut database = Database::default();

    for user in legacy.users {
        let password_hash = match password::deobfuscate_legacy(&user.senha) {
            Some(plain) => password::hash_password(&plain)?,
            None => {
                warn!(
                    "User {} has an unrecognized password format; a reset will be required",
                    user.codigo_consumidor
                );
                user.senha
            }
        };
        let created_at = parse_timestamp(&user.created_at);
        database.members.push(Member {
            id: user.id,
            consumer_code: user.codigo_consumidor.to_uppercase(),
            name: user.nome,
            email: non_empty(user.email),
            password_hash,
            phone: non_empty(user.telefone),
            document: None,
            address: non_empty(user.endereco),
            city: None,
            state: None,
            zip_code: None,
            birth_date: None,
            is_member: user.is_membro,
            is_admin: user.is_admin,
            is_active: true,
            created_at,
            updated_at: parse_optional_timestamp(&user.updated_at).unwrap_or(created_at),
        });
    }

    for credit in legacy.credits {
        let requested_at = parse_timestamp(&credit.data_solicitacao);
        let decided_at = parse_optional_timestamp(&credit.data_aprovacao);
        let interest_rate = if credit.valor > 0.0 {
            credit.juros / credit.valor
        } else {
            0.0
        };
        database.credits.push(Credit {
            id: credit.id,
            member_id: credit.user_id,
            amount: credit.valor,
            interest_rate,
            interest: credit.juros,
            total: credit.valor_total.unwrap_or(credit.valor + credit.juros),
            status: credit_status(&credit.status),
            description: credit.descricao,
            requested_at,
            decided_at,
            due_date: parse_optional_timestamp(&credit.data_vencimento),
            updated_at: decided_at.unwrap_or(requested_at),
        });
    }

    for payment in legacy.payments {
        let paid_at = parse_timestamp(&payment.data_pagamento);
        database.payments.push(Payment {
            id: payment.id,
            member_id: payment.user_id,
            credit_id: payment.credit_id,
            amount: payment.valor,
            method: payment_method(payment.metodo.as_deref()),
            status: payment_status(&payment.status),
            description: payment.descricao,
            paid_at,
            updated_at: paid_at,
        });
    }

    for request in legacy.solicitacoes {
        database.notifications.push(Notification {
            id: request.id,
            member_id: request.user_id,
            kind: request.tipo,
            description: request.descricao,
            outcome: notification_outcome(&request.status),
            response: request.resposta,
            created_at: parse_timestamp(&request.data_solicitacao),
            responded_at: parse_optional_timestamp(&request.data_resposta),
        });
    }

    for setting in legacy.admin_settings {
        let Some(key) = setting_key(&setting.chave) else {
            warn!("Dropping unknown legacy setting {}", setting.chave);
            continue;
        };
        database.settings.push(Setting {
            id: setting.id,
            key: key.to_string(),
            value: setting.valor,
            description: setting.descricao,
            updated_at: parse_optional_timestamp(&setting.updated_at).unwrap_or_else(Utc::now),
        });
    }

    Ok(database)
}

// Layout C

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembersDocument {
    #[serde(default)]
    members: Vec<LegacyMember>,
    #[serde(default)]
    credits: Vec<MemberCredit>,
    #[serde(default)]
    transactions: Vec<MemberTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMember {
    id: String,
    consumer_code: String,
    name: String,
    #[serde(default)]
    email: Option<String>,
    password: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    document: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    zip_code: Option<String>,
    #[serde(default)]
    birth_date: Option<String>,
    #[serde(default = "default_true")]
    is_active: bool,
    created_at: String,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberCredit {
    id: String,
    member_id: String,
    amount: f64,
    #[serde(default)]
    description: Option<String>,
    date: String,
    #[serde(default = "default_true")]
    is_active: bool,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberTransaction {
    id: String,
    member_id: String,
    #[serde(rename = "type")]
    kind: String,
    amount: f64,
    #[serde(default)]
    description: Option<String>,
    status: String,
    date: String,
    #[serde(default)]
    updated_at: Option<String>,
}

fn convert_members(legacy: MembersDocument) -> Database {
    let mut database = Database::default();

    for member in legacy.members {
        let created_at = parse_timestamp(&member.created_at);
        database.members.push(Member {
            id: member.id,
            consumer_code: member.consumer_code.to_uppercase(),
            name: member.name,
            email: non_empty(member.email),
            password_hash: member.password,
            phone: non_empty(member.phone),
            document: non_empty(member.document),
            address: non_empty(member.address),
            city: non_empty(member.city),
            state: non_empty(member.state),
            zip_code: non_empty(member.zip_code),
            birth_date: member.birth_date.as_deref().and_then(parse_date),
            is_member: false,
            is_admin: false,
            is_active: member.is_active,
            created_at,
            updated_at: parse_optional_timestamp(&member.updated_at).unwrap_or(created_at),
        });
    }

    for credit in legacy.credits {
        let requested_at = parse_timestamp(&credit.date);
        database.credits.push(Credit {
            id: credit.id,
            member_id: credit.member_id,
            amount: credit.amount,
            interest_rate: 0.0,
            interest: 0.0,
            total: credit.amount,
            status: if credit.is_active {
                CreditStatus::Approved
            } else {
                CreditStatus::Paid
            },
            description: credit.description,
            requested_at,
            decided_at: Some(requested_at),
            due_date: None,
            updated_at: parse_optional_timestamp(&credit.updated_at).unwrap_or(requested_at),
        });
    }

    for transaction in legacy.transactions {
        if transaction.kind != "PAYMENT" {
            continue;
        }
        let Some(credit_id) = first_credit_of(&database, &transaction.member_id) else {
            warn!("Skipping payment {}: member has no credit to apply it to", transaction.id);
            continue;
        };
        let paid_at = parse_timestamp(&transaction.date);
        database.payments.push(Payment {
            id: transaction.id,
            member_id: transaction.member_id,
            credit_id,
            amount: transaction.amount.abs(),
            method: PaymentMethod::Other,
            status: payment_status(&transaction.status),
            description: transaction.description,
            paid_at,
            updated_at: parse_optional_timestamp(&transaction.updated_at).unwrap_or(paid_at),
        });
    }

    database
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::password::PasswordCheck;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    const USERS_DOCUMENT: &str = r#"{
        "users": [{
            "id": "admin-001",
            "codigoConsumidor": "ADMIN001",
            "nome": "Administrador",
            "email": "admin@ppdplus.ao",
            "senha": "__SENHA__",
            "isMembro": true,
            "isAdmin": true,
            "createdAt": "2024-01-10T08:00:00.000Z",
            "updatedAt": "2024-01-10T08:00:00.000Z"
        }, {
            "id": "user-17",
            "codigoConsumidor": "PPD17ABC",
            "nome": "Maria Silva",
            "senha": "__SENHA__",
            "isMembro": false,
            "isAdmin": false,
            "createdAt": "2024-02-01T10:00:00.000Z",
            "updatedAt": "2024-02-01T10:00:00.000Z"
        }],
        "credits": [{
            "id": "credit-1",
            "userId": "user-17",
            "valor": 1000,
            "juros": 250,
            "valorTotal": 1250,
            "status": "aprovado",
            "dataSolicitacao": "2024-02-02T10:00:00.000Z",
            "dataAprovacao": "2024-02-03T10:00:00.000Z",
            "dataVencimento": "2024-03-04T10:00:00.000Z"
        }],
        "payments": [{
            "id": "pay-1",
            "creditId": "credit-1",
            "userId": "user-17",
            "valor": 250,
            "dataPagamento": "2024-02-20T10:00:00.000Z",
            "status": "confirmado",
            "metodo": "dinheiro"
        }],
        "solicitacoes": [{
            "id": "sol-1",
            "userId": "user-17",
            "tipo": "emprestimo",
            "descricao": "Pedido de crédito",
            "status": "aprovado",
            "dataSolicitacao": "2024-02-02T10:00:00.000Z"
        }],
        "adminSettings": [{
            "id": "settings-001",
            "chave": "taxa_juros_membros",
            "valor": "0.12",
            "updatedAt": "2024-01-10T08:00:00.000Z"
        }]
    }"#;

    fn users_document(plain_password: &str) -> String {
        let obfuscated = STANDARD.encode(format!("{}salt_ppd+", plain_password));
        USERS_DOCUMENT.replace("__SENHA__", &obfuscated)
    }

    #[test]
    fn test_detect_layout() {
        let detect = |raw: &str| detect_layout(&serde_json::from_str(raw).unwrap());
        assert_eq!(detect(r#"{"associados": []}"#), Layout::Associates);
        assert_eq!(detect(r#"{"users": [], "credits": []}"#), Layout::Users);
        assert_eq!(detect(r#"{"members": [], "transactions": []}"#), Layout::Members);
        assert_eq!(detect(r#"{"members": [{"consumerCode": "X"}]}"#), Layout::Members);
        assert_eq!(detect(r#"{"members": [], "credits": []}"#), Layout::Canonical);
    }

    #[test]
    fn test_users_layout_rehashes_passwords() {
        let database = parse_document(&users_document("segredo1")).unwrap();

        assert_eq!(database.members.len(), 2);
        let maria = database.members.iter().find(|m| m.id == "user-17").unwrap();
        assert!(maria.password_hash.starts_with("$argon2"));
        assert_eq!(
            password::verify_password("segredo1", &maria.password_hash),
            PasswordCheck::Valid
        );
        assert!(!maria.is_member);

        let admin = database.members.iter().find(|m| m.id == "admin-001").unwrap();
        assert!(admin.is_admin && admin.is_member);
    }

    #[test]
    fn test_users_layout_maps_workflow_records() {
        let database = parse_document(&users_document("segredo1")).unwrap();

        let credit = &database.credits[0];
        assert_eq!(credit.status, CreditStatus::Approved);
        assert_eq!(credit.interest, 250.0);
        assert_eq!(credit.total, 1250.0);
        assert_eq!(credit.interest_rate, 0.25);

        let payment = &database.payments[0];
        assert_eq!(payment.credit_id, "credit-1");
        assert_eq!(payment.status, PaymentStatus::Confirmed);
        assert_eq!(payment.method, PaymentMethod::Cash);

        let notification = &database.notifications[0];
        assert_eq!(notification.kind, "emprestimo");
        assert_eq!(notification.outcome, NotificationOutcome::Approved);

        assert_eq!(database.settings.len(), 1);
        assert_eq!(database.settings[0].key, "interest_rate_members");
        assert_eq!(database.settings[0].value, "0.12");
    }

    #[test]
    fn test_associates_layout() {
        let raw = r#"{
            "associados": [{
                "id": "a1",
                "codigoConsumidor": "PPD1234ABCD",
                "nome": "João",
                "email": "joao@example.com",
                "senha": "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy",
                "cpf": "12345678900",
                "dataNascimento": "1985-05-20",
                "tipoMembro": "MEMBRO",
                "dataCadastro": "2023-12-01T09:00:00.000Z",
                "updatedAt": "2023-12-01T09:00:00.000Z",
                "ativo": true
            }],
            "creditos": [{
                "id": "c1",
                "associadoId": "a1",
                "valor": 300,
                "dataCredito": "2023-12-02",
                "tipoCredito": "BONUS",
                "utilizado": false,
                "createdAt": "2023-12-02T00:00:00.000Z",
                "updatedAt": "2023-12-02T00:00:00.000Z"
            }],
            "transacoes": [
                {"id": "t1", "associadoId": "a1", "tipo": "DEBITO", "valor": -100, "dataTransacao": "2023-12-05T00:00:00.000Z"},
                {"id": "t2", "associadoId": "a1", "tipo": "CREDITO", "valor": 300, "dataTransacao": "2023-12-02T00:00:00.000Z"}
            ],
            "mapasCredito": []
        }"#;

        let database = parse_document(raw).unwrap();

        let member = &database.members[0];
        assert!(member.is_member);
        assert!(password::is_legacy_bcrypt(&member.password_hash));
        assert_eq!(member.document.as_deref(), Some("12345678900"));
        assert_eq!(member.birth_date, NaiveDate::from_ymd_opt(1985, 5, 20));

        assert_eq!(database.credits[0].status, CreditStatus::Approved);
        assert_eq!(database.credits[0].total, 300.0);

        assert_eq!(database.payments.len(), 1);
        assert_eq!(database.payments[0].credit_id, "c1");
        assert_eq!(database.payments[0].amount, 100.0);
    }

    #[test]
    fn test_members_layout() {
        let raw = r#"{
            "members": [{
                "id": "m1",
                "consumerCode": "ppdabc",
                "name": "Ana",
                "email": "ana@example.com",
                "password": "$2b$10$abcdefghijklmnopqrstuv",
                "document": "MEC998877",
                "isActive": true,
                "createdAt": "2024-03-01T00:00:00.000Z",
                "updatedAt": "2024-03-01T00:00:00.000Z"
            }],
            "credits": [{
                "id": "mc1", "memberId": "m1", "amount": 500, "type": "ACCUMULATED",
                "date": "2024-03-02T00:00:00.000Z", "isActive": true,
                "createdAt": "2024-03-02T00:00:00.000Z", "updatedAt": "2024-03-02T00:00:00.000Z"
            }],
            "transactions": [{
                "id": "mt1", "memberId": "m1", "type": "PAYMENT", "amount": 120,
                "status": "COMPLETED", "date": "2024-03-10T00:00:00.000Z",
                "createdAt": "2024-03-10T00:00:00.000Z", "updatedAt": "2024-03-10T00:00:00.000Z"
            }]
        }"#;

        let database = parse_document(raw).unwrap();

        assert_eq!(database.members[0].consumer_code, "PPDABC");
        assert_eq!(database.credits[0].status, CreditStatus::Approved);
        assert_eq!(database.payments[0].credit_id, "mc1");
        assert_eq!(database.payments[0].status, PaymentStatus::Confirmed);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_document("not json").is_err());
        assert!(parse_document(r#"{"users": [{"id": 5}]}"#).is_err());
    }
}
