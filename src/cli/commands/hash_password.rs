use anyhow::Result;

use crate::auth;

/// Prints the hash to paste into the `password_hash` field of the credential file.
pub fn hash_password(password: &str) -> Result<()> {
    let hash = auth::hash_password(password)?;
    println!("{}", hash);
    Ok(())
}
