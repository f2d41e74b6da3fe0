//! Demo data for a fresh installation.
//!
//! Everything goes through the public API, so seeded accounts and transactions obey the same validation and status
//! rules as real ones. Customers register themselves, so their username is their account number.
use anyhow::{Context, Result};
use ipay_common::Secret;
use ipay_engine::{
    auth_objects::{NewEmployeeRequest, RegistrationRequest},
    db_types::{Identity, Transaction, TransactionStatus},
    payment_objects::NewPaymentRequest,
    AuthApi,
    PaymentFlowApi,
    TransactionManagement,
    UserManagement,
};
use log::info;
use prettytable::{row, Table};

struct DemoEmployee {
    full_name: &'static str,
    username: &'static str,
    account_number: &'static str,
    password: &'static str,
}

struct DemoCustomer {
    full_name: &'static str,
    id_number: &'static str,
    account_number: &'static str,
    password: &'static str,
}

struct DemoPayment {
    amount: &'static str,
    currency: &'static str,
    provider: &'static str,
    payee_account: &'static str,
    swift_code: &'static str,
    status: TransactionStatus,
}

const EMPLOYEES: [DemoEmployee; 3] = [
    DemoEmployee {
        full_name: "System Administrator",
        username: "admin",
        account_number: "1234567890",
        password: "Admin@123",
    },
    DemoEmployee {
        full_name: "Payment Processor",
        username: "processor1",
        account_number: "1234567891",
        password: "Process@123",
    },
    DemoEmployee {
        full_name: "Payment Verifier",
        username: "verifier1",
        account_number: "1234567892",
        password: "Verify@123",
    },
];

const CUSTOMERS: [DemoCustomer; 3] = [
    DemoCustomer {
        full_name: "John Smith",
        id_number: "9001010001087",
        account_number: "2000000001",
        password: "Customer@123",
    },
    DemoCustomer {
        full_name: "Mary Johnson",
        id_number: "8506120002088",
        account_number: "2000000002",
        password: "Customer@456",
    },
    DemoCustomer {
        full_name: "David Wilson",
        id_number: "7712250003089",
        account_number: "2000000003",
        password: "Customer@789",
    },
];

// One payment per customer, in the same order as CUSTOMERS
const PAYMENTS: [DemoPayment; 3] = [
    DemoPayment {
        amount: "1500.00",
        currency: "USD",
        provider: "Standard Bank",
        payee_account: "123456789012",
        swift_code: "SBZAZAJJ",
        status: TransactionStatus::Pending,
    },
    DemoPayment {
        amount: "750.50",
        currency: "EUR",
        provider: "FNB",
        payee_account: "234567890123",
        swift_code: "FIRNZAJJ",
        status: TransactionStatus::Verified,
    },
    DemoPayment {
        amount: "2200.00",
        currency: "GBP",
        provider: "ABSA",
        payee_account: "345678901234",
        swift_code: "ABSAZAJJ",
        status: TransactionStatus::Completed,
    },
];

/// Login details for a seeded account.
#[derive(Debug, Clone)]
pub struct SeededLogin {
    pub role: String,
    pub username: String,
    pub account_number: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    pub logins: Vec<SeededLogin>,
    pub transactions: Vec<Transaction>,
}

pub const PARTIAL_SEED_HINT: &str =
    "Seeding stopped partway and the database now holds some demo records. Later seed runs will skip it, so delete \
     the database and run seed again.";

/// Seeds the database with demo data. Returns `None` without writing anything if any user already exists.
///
/// Seeding is not atomic. Each record is written through the public API in its own store transaction, so a failure
/// partway through leaves the records written so far.
pub async fn seed_database<B>(db: &B) -> Result<Option<SeedSummary>>
where B: UserManagement + TransactionManagement + Clone {
    let auth = AuthApi::new(db.clone());
    if !auth.is_empty().await? {
        info!("🗃️ Users exist already. Nothing to seed.");
        return Ok(None);
    }
    seed_empty_database(db, &auth).await.context(PARTIAL_SEED_HINT).map(Some)
}

async fn seed_empty_database<B>(db: &B, auth: &AuthApi<B>) -> Result<SeedSummary>
where B: UserManagement + TransactionManagement + Clone {
    let flow = PaymentFlowApi::new(db.clone());
    let mut summary = SeedSummary::default();

    let mut employees = Vec::with_capacity(EMPLOYEES.len());
    for e in &EMPLOYEES {
        let request = NewEmployeeRequest {
            full_name: e.full_name.into(),
            username: e.username.into(),
            account_number: e.account_number.into(),
            password: Secret::from(e.password),
        };
        let user = auth
            .create_employee(request)
            .await
            .with_context(|| format!("Creating employee {}", e.username))?;
        info!("🗃️ Seeded employee {}", user.username);
        summary.logins.push(login("employee", &user.username, e.account_number, e.password));
        employees.push(Identity::from(&user));
    }

    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for c in &CUSTOMERS {
        let request = RegistrationRequest {
            full_name: c.full_name.into(),
            id_number: c.id_number.into(),
            account_number: c.account_number.into(),
            password: Secret::from(c.password),
        };
        let user = auth
            .register(request)
            .await
            .with_context(|| format!("Registering customer {}", c.account_number))?;
        info!("🗃️ Seeded customer {}", user.username);
        summary.logins.push(login("customer", &user.username, c.account_number, c.password));
        customers.push(Identity::from(&user));
    }

    // The processor moves the seeded payments along the workflow
    let processor = &employees[1];
    for (customer, p) in customers.iter().zip(PAYMENTS.iter()) {
        let request = NewPaymentRequest {
            amount: p.amount.into(),
            currency: p.currency.into(),
            provider: p.provider.into(),
            payee_account: p.payee_account.into(),
            swift_code: p.swift_code.into(),
        };
        let mut tx = flow.submit_payment(customer, request).await.context("Submitting a demo payment")?;
        let id = tx.id;
        if p.status != TransactionStatus::Pending {
            tx = flow.verify(processor, id).await.with_context(|| format!("Verifying transaction #{id}"))?;
        }
        if p.status == TransactionStatus::Completed {
            tx = flow.complete(processor, id).await.with_context(|| format!("Completing transaction #{id}"))?;
        }
        info!("🗃️ Seeded transaction #{}: {} {} ({})", tx.id, tx.amount, tx.currency, tx.status);
        summary.transactions.push(tx);
    }
    Ok(summary)
}

fn login(role: &str, username: &str, account_number: &str, password: &str) -> SeededLogin {
    SeededLogin {
        role: role.into(),
        username: username.into(),
        account_number: account_number.into(),
        password: password.into(),
    }
}

pub fn print_seed_summary(summary: &SeedSummary) {
    let mut table = Table::new();
    table.set_titles(row!["Role", "Username", "Account number", "Password"]);
    for l in &summary.logins {
        table.add_row(row![l.role, l.username, l.account_number, l.password]);
    }
    println!("Demo logins");
    table.printstd();

    let mut table = Table::new();
    table.set_titles(row!["id", "Customer id", "Amount", "Cur", "SWIFT code", "Status"]);
    for tx in &summary.transactions {
        table.add_row(row![tx.id, tx.customer_id, tx.amount, tx.currency, tx.swift_code, tx.status]);
    }
    println!("Demo transactions");
    table.printstd();
}
