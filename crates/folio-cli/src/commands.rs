//! Command execution. Every backend result is printed as a JSON envelope on
//! stdout; the returned flag tells `main` whether the call succeeded.

use std::io::{self, Write};

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use folio_core::api::{Envelope, ErrorInfo, ServiceResult};
use folio_core::models::{Credentials, MessagePayload, PasswordChange, Registration};
use folio_core::{Config, Folio};

use crate::args::{Command, ProjectsCommand, TestimonialsCommand};

const ENV_EMAIL: &str = "FOLIO_EMAIL";
const ENV_PASSWORD: &str = "FOLIO_PASSWORD";

pub async fn run(folio: &Folio, config: &mut Config, command: Command) -> Result<bool> {
    match command {
        Command::Login { email } => login(folio, config, email).await,
        Command::Register { name, email } => {
            let password = prompt_new_password()?;
            let registration = Registration {
                name,
                email,
                password,
            };
            emit(folio.auth.register(&registration).await)
        }
        Command::Logout => {
            folio.auth.logout();
            emit(Ok(MessagePayload {
                message: Some("Signed out".to_string()),
            }))
        }
        Command::WhoAmI { refresh } => {
            if refresh {
                return emit(folio.auth.fetch_profile().await);
            }
            match folio.auth.current_user() {
                Some(user) => emit(Ok(user)),
                None => emit::<()>(Err(ErrorInfo::local("Not signed in"))),
            }
        }
        Command::Passwd => {
            let current_password = rpassword::prompt_password("Current password: ")?;
            let new_password = prompt_new_password()?;
            let change = PasswordChange {
                current_password,
                new_password,
            };
            emit(folio.auth.change_password(&change).await)
        }
        Command::Projects(command) => projects(folio, command).await,
        Command::Testimonials(command) => testimonials(folio, command).await,
        Command::Stats => {
            let (projects, testimonials) = futures::join!(
                folio.projects.statistics(),
                folio.testimonials.statistics()
            );
            // Both halves must succeed; the first failure wins
            emit(projects.and_then(|p| {
                testimonials.map(|t| json!({"projects": p, "testimonials": t}))
            }))
        }
        Command::Help => {
            println!("{}", crate::args::USAGE);
            Ok(true)
        }
    }
}

async fn login(folio: &Folio, config: &mut Config, email: Option<String>) -> Result<bool> {
    let email = match email
        .or_else(|| std::env::var(ENV_EMAIL).ok())
        .or_else(|| config.last_email.clone())
    {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    if email.is_empty() {
        bail!("Email required");
    }

    let password = match std::env::var(ENV_PASSWORD) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };

    let result = folio.auth.login(&Credentials::new(&email, &password)).await;
    if result.is_ok() {
        config.last_email = Some(email);
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }
    emit(result)
}

async fn projects(folio: &Folio, command: ProjectsCommand) -> Result<bool> {
    let projects = &folio.projects;
    match command {
        ProjectsCommand::List(query) => emit(projects.list(&query).await),
        ProjectsCommand::Get(id) => emit(projects.get(&id).await),
        ProjectsCommand::Create(input) => emit(projects.create(&input).await),
        ProjectsCommand::Update(id, input) => emit(projects.update(&id, &input).await),
        ProjectsCommand::Feature(id) => emit(projects.toggle_featured(&id).await),
        ProjectsCommand::Delete(id) => emit(projects.delete(&id).await),
        ProjectsCommand::Technology(tech, page) => emit(projects.by_technology(&tech, &page).await),
        ProjectsCommand::Year(year, page) => emit(projects.by_year(year, &page).await),
        ProjectsCommand::Stats => emit(projects.statistics().await),
    }
}

async fn testimonials(folio: &Folio, command: TestimonialsCommand) -> Result<bool> {
    let testimonials = &folio.testimonials;
    match command {
        TestimonialsCommand::List(query) => emit(testimonials.list(&query).await),
        TestimonialsCommand::Get(id) => emit(testimonials.get(&id).await),
        TestimonialsCommand::Create(input) => emit(testimonials.create(&input).await),
        TestimonialsCommand::Update(id, input) => emit(testimonials.update(&id, &input).await),
        TestimonialsCommand::Approve(id) => emit(testimonials.approve(&id).await),
        TestimonialsCommand::Delete(id) => emit(testimonials.delete(&id).await),
        TestimonialsCommand::Featured(page) => emit(testimonials.featured(&page).await),
        TestimonialsCommand::Rating(rating, page) => emit(testimonials.by_rating(rating, &page).await),
        TestimonialsCommand::Companies => emit(testimonials.companies().await),
        TestimonialsCommand::Stats => emit(testimonials.statistics().await),
    }
}

/// Print the envelope and report success.
fn emit<T: Serialize>(result: ServiceResult<T>) -> Result<bool> {
    let envelope = Envelope::from(result);
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(envelope.is_success())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_new_password() -> Result<String> {
    let password = rpassword::prompt_password("New password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        bail!("Passwords do not match");
    }
    Ok(password)
}
