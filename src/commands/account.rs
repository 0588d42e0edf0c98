//! Account commands - registration, sign in and profile.

use super::signed_in;
use crate::cli::args::{LoginArgs, ProfileAction, ProfileArgs, RegisterArgs};
use crate::domain::{ProfileUpdate, RegisterUser, User};
use crate::errors::AppResult;
use crate::services::ServiceContainer;

pub async fn register(args: RegisterArgs, services: &dyn ServiceContainer) -> AppResult<()> {
    let user = services
        .auth()
        .register(RegisterUser {
            username: args.username,
            password: args.password,
            email: args.email,
            full_name: args.full_name,
            phone: args.phone,
            address: args.address,
            role: args.role,
        })
        .await?;

    println!("Registered {} ({}) as user #{}", user.username, user.role, user.id);
    Ok(())
}

pub async fn login(args: LoginArgs, services: &dyn ServiceContainer) -> AppResult<()> {
    let session = services.auth().login(&args.username, &args.password).await?;
    println!("Signed in as {} ({})", session.username, session.role);
    Ok(())
}

pub async fn logout(services: &dyn ServiceContainer) -> AppResult<()> {
    services.auth().logout().await?;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(services: &dyn ServiceContainer) -> AppResult<()> {
    match services.auth().current().await {
        Some(session) => println!("{} ({})", session.username, session.role),
        None => println!("Not signed in"),
    }
    Ok(())
}

pub async fn profile(args: ProfileArgs, services: &dyn ServiceContainer) -> AppResult<()> {
    let session = signed_in(services).await?;
    let users = services.users();

    match args.action {
        ProfileAction::Show => print_profile(&users.profile(&session).await?),
        ProfileAction::Update {
            email,
            full_name,
            phone,
            address,
        } => {
            let update = ProfileUpdate {
                email,
                full_name,
                phone,
                address,
            };
            print_profile(&users.update_profile(&session, update).await?);
        }
        ProfileAction::Password { current, new } => {
            users.change_password(&session, &current, &new).await?;
            println!("Password changed");
        }
    }

    Ok(())
}

fn print_profile(user: &User) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("Username: {}", user.username);
    println!("Name:     {}", user.display_name());
    println!("Email:    {}", user.email);
    println!("Phone:    {}", field(&user.phone));
    println!("Address:  {}", field(&user.address));
    println!("Role:     {}", user.role);
}
