use anyhow::Result;
use bugdesk_core::{Identity, LoginInput, RegisterInput, Role};

use super::{App, print_json};

fn greet(identity: &Identity) {
    println!("Logged in as {} <{}> ({})", identity.display_name, identity.email_address, identity.role);
}

pub(crate) async fn run_login(app: &App, email: String, password: String) -> Result<()> {
    let identity = app.client.login(&LoginInput { email, password }).await?;
    greet(&identity);
    Ok(())
}

pub(crate) async fn run_register(
    app: &App,
    name: String,
    email: String,
    password: String,
    confirm_password: Option<String>,
    role: Role,
) -> Result<()> {
    let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
    let input = RegisterInput { name, email, password, confirm_password, role };
    let identity = app.client.register(&input).await?;
    greet(&identity);
    Ok(())
}

pub(crate) fn run_logout(app: &App) {
    app.client.logout();
    println!("Logged out");
}

pub(crate) fn run_whoami(app: &App) -> Result<()> {
    let identity = app.require_login()?;
    print_json(&identity)
}
