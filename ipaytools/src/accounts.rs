use anyhow::{anyhow, Result};
use clap::Args;
use dialoguer::Password;
use ipay_common::Secret;
use ipay_engine::{auth_objects::NewEmployeeRequest, db_types::User, helpers::hash_password, AuthApi, UserManagement};
use log::info;

#[derive(Debug, Args)]
pub struct CreateEmployeeParams {
    /// The employee's full name
    #[arg(short = 'n', long)]
    pub full_name: String,
    /// The name the employee logs in with
    #[arg(short = 'u', long)]
    pub username: String,
    /// 7 to 12 digits
    #[arg(short = 'a', long)]
    pub account_number: String,
    /// Prefer the interactive prompt. Passwords given here end up in your shell history.
    #[arg(short = 'p', long)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct HashPasswordParams {
    /// The password to hash. You are prompted for it if it is not provided.
    pub password: Option<String>,
}

pub async fn create_employee<B: UserManagement + Clone>(db: &B, params: CreateEmployeeParams) -> Result<User> {
    let CreateEmployeeParams { full_name, username, account_number, password } = params;
    let password = match password {
        Some(p) => Secret::from(p),
        None => prompt_password(true)?,
    };
    let api = AuthApi::new(db.clone());
    let request = NewEmployeeRequest { full_name, username, account_number, password };
    let user = api.create_employee(request).await?;
    info!("🔐️ Created employee account #{} ({})", user.id, user.username);
    Ok(user)
}

pub async fn print_password_hash(params: HashPasswordParams) -> Result<()> {
    let password = match params.password {
        Some(p) => Secret::from(p),
        None => prompt_password(false)?,
    };
    if password.is_blank() {
        return Err(anyhow!("The password cannot be empty"));
    }
    let hash = hash_password(&password).await?;
    println!("{}", hash.reveal());
    Ok(())
}

fn prompt_password(confirm: bool) -> Result<Secret<String>> {
    let prompt = Password::new().with_prompt("Password");
    let prompt = if confirm { prompt.with_confirmation("Confirm password", "Passwords do not match") } else { prompt };
    Ok(Secret::from(prompt.interact()?))
}
