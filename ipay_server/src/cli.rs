use std::{env, env::VarError};

struct EnvVar {
    name: &'static str,
    secret: bool,
}

const fn var(name: &'static str) -> EnvVar {
    EnvVar { name, secret: false }
}

const ENV_VARS: [EnvVar; 11] = [
    var("RUST_LOG"),
    var("IPAY_HOST"),
    var("IPAY_PORT"),
    var("IPAY_DATABASE_URL"),
    var("IPAY_USE_X_FORWARDED_FOR"),
    var("IPAY_USE_FORWARDED"),
    var("IPAY_LOGIN_RATE_LIMIT"),
    var("IPAY_LOGIN_RATE_WINDOW_MINS"),
    var("IPAY_REGISTER_RATE_LIMIT"),
    var("IPAY_REGISTER_RATE_WINDOW_MINS"),
    EnvVar { name: "IPAY_JWT_SECRET", secret: true },
];

/// The server takes no arguments. Any argument prints the help text and the current configuration, and the caller
/// should exit without starting the server.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        println!("\n{}\n", include_str!("./cli-help.txt"));
        print_environment();
    }
    has_cli_args
}

fn print_environment() {
    println!("Current environment:");
    for v in &ENV_VARS {
        println!("  {:<35} {:<15}", v.name, describe(v, env::var(v.name)));
    }
}

fn describe(v: &EnvVar, value: Result<String, VarError>) -> String {
    match value {
        Ok(_) if v.secret => "Set (hidden)".into(),
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(_)) if v.secret => "Invalid value (hidden)".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}
