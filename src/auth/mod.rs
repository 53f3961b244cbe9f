//! Authentication for the Dreamhouse API
//!
//! Login and registration both run over SMS one-time passwords: the server
//! texts a code which is exchanged for a JWT access/refresh pair.

pub mod otp;
pub mod tokens;

pub use tokens::TokenStore;

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use crate::api;
use crate::config::Config;

/// Interactive login: request an OTP, read it from stdin, exchange it for a
/// credential pair.
pub async fn login(phone: &str) -> Result<()> {
    let client = api::connect()?;

    let sent = otp::request_login_code(&client, phone).await?;
    println!("{}", sent.detail);

    let code = prompt_code()?;
    let resp = otp::verify_login_code(&client, phone, &code).await?;

    println!("Logged in as {} ({}).", resp.user.name, resp.user.phone_number);
    if resp.is_new {
        println!("Welcome to Dreamhouse!");
    }
    Ok(())
}

/// Interactive registration: submit name and phone, confirm with the OTP.
pub async fn register(phone: &str, name: &str, ref_code: Option<&str>) -> Result<()> {
    let client = api::connect()?;

    otp::request_register_code(&client, phone, name, ref_code).await?;
    println!("Confirmation code sent to {}.", phone);

    let code = prompt_code()?;
    otp::confirm_register(&client, phone, &code, name, ref_code).await?;

    println!("Account created. Logged in as {}.", name);
    Ok(())
}

/// Clear stored credentials
pub async fn logout() -> Result<()> {
    let mut config = Config::load()?;
    config.clear_tokens();
    println!("Logged out.");
    Ok(())
}

/// Display current auth status
pub async fn status() -> Result<()> {
    let config = Config::load()?;

    match config.access_token {
        Some(_) => println!("Access token:  present"),
        None => println!("Access token:  none"),
    }
    match config.refresh_token {
        Some(_) => println!("Refresh token: present"),
        None => println!("Refresh token: none"),
    }

    if config.access_token.is_none() {
        println!("\nRun 'dreamhouse-cli login' to authenticate.");
    }

    Ok(())
}

fn prompt_code() -> Result<String> {
    print!("Enter code: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read code")?;
    let code = line.trim().to_string();
    if code.is_empty() {
        bail!("No code entered");
    }
    Ok(code)
}
