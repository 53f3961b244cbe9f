//! User profile and referral endpoints

use anyhow::{Context, Result};
use futures::future::try_join;
use serde::Deserialize;

use crate::models::{Page, Referral, User};

use super::connect;

#[derive(Debug, Deserialize)]
struct ReferralLinkResponse {
    referral_link: String,
}

/// Fetch and display the current user's profile.
pub async fn whoami() -> Result<()> {
    let client = connect()?;
    let me: User = client
        .get("/users/me/")
        .await
        .context("Failed to fetch profile")?;

    println!();
    println!("Name:   {}", me.name);
    println!("Phone:  {}", me.phone_number);
    println!("ID:     {}", me.id);
    if let Some(ref photo) = me.profile_photo {
        println!("Photo:  {}", photo);
    }
    Ok(())
}

/// Show the referral link and everyone who signed up with it.
pub async fn referrals() -> Result<()> {
    let client = connect()?;
    let (link, list) = try_join(
        client.get::<ReferralLinkResponse>("/users/referral-link/"),
        client.get_value("/users/referrals/"),
    )
    .await
    .context("Failed to fetch referral data")?;

    let referrals: Page<Referral> = Page::from_value(list).context("Failed to parse referrals")?;

    println!();
    println!("Referral link: {}", link.referral_link);
    if referrals.results.is_empty() {
        println!("No referrals yet.");
        return Ok(());
    }
    println!();
    for referral in &referrals.results {
        println!(
            "  {}  {}  joined {}",
            referral.name.as_deref().unwrap_or("(no name)"),
            referral.phone_number.as_deref().unwrap_or("-"),
            referral.created_at
        );
    }
    println!();
    println!("{} referral(s).", referrals.count);
    Ok(())
}
