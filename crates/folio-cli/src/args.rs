//! Command-line parsing.
//!
//! Commands are positional words followed by `key=value` pairs. Values that
//! look like booleans, plain integers or JSON arrays are sent as such; everything
//! else is a string. Keys use the backend's field names (`sortBy`,
//! `githubUrl`, ...). Unknown keys are dropped by the typed parameter structs.

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use folio_core::models::{ProjectInput, TestimonialInput};
use folio_core::services::{PageQuery, ProjectQuery, TestimonialQuery};

pub const USAGE: &str = "\
Usage: folio <command> [args]

Session:
  login [email]                 Sign in (password is prompted)
  register <name> <email>       Create an account
  logout                        End the session
  whoami [--refresh]            Show the signed-in user
  passwd                        Change password

Projects:
  projects list [key=value...]  page, limit, status, featured, search,
                                sortBy, sortOrder, year, tech
  projects get <id>
  projects create key=value...  title, subtitle, description, technologies,
                                year, status, featured, githubUrl, liveUrl,
                                imageUrl, thumbnailUrl
  projects update <id> key=value...
  projects feature <id>         Toggle the featured flag
  projects delete <id>
  projects tech <name> [page=N limit=N]
  projects year <year> [page=N limit=N]
  projects stats

Testimonials:
  testimonials list [key=value...]  page, limit, status, featured, search,
                                    sortBy, sortOrder, rating, company
  testimonials get <id>
  testimonials create key=value...  name, position, company, message,
                                    avatarUrl, rating, status, featured
  testimonials update <id> key=value...
  testimonials approve <id>
  testimonials delete <id>
  testimonials featured [page=N limit=N]
  testimonials rating <1-5> [page=N limit=N]
  testimonials companies
  testimonials stats

  stats                         Project and testimonial statistics together

Environment:
  FOLIO_ENV, FOLIO_API_BASE_URL, FOLIO_TIMEOUT_SECS, FOLIO_SESSION_BACKEND,
  FOLIO_LOGIN_FALLBACK_URL, FOLIO_EMAIL, FOLIO_PASSWORD, FOLIO_LOG_FILE,
  RUST_LOG";

#[derive(Debug, PartialEq)]
pub enum Command {
    Login { email: Option<String> },
    Register { name: String, email: String },
    Logout,
    WhoAmI { refresh: bool },
    Passwd,
    Projects(ProjectsCommand),
    Testimonials(TestimonialsCommand),
    Stats,
    Help,
}

#[derive(Debug, PartialEq)]
pub enum ProjectsCommand {
    List(ProjectQuery),
    Get(String),
    Create(ProjectInput),
    Update(String, ProjectInput),
    Feature(String),
    Delete(String),
    Technology(String, PageQuery),
    Year(i32, PageQuery),
    Stats,
}

#[derive(Debug, PartialEq)]
pub enum TestimonialsCommand {
    List(TestimonialQuery),
    Get(String),
    Create(TestimonialInput),
    Update(String, TestimonialInput),
    Approve(String),
    Delete(String),
    Featured(PageQuery),
    Rating(u8, PageQuery),
    Companies,
    Stats,
}

/// Parse the arguments after the program name.
pub fn parse(args: &[String]) -> Result<Command> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "login" => Ok(Command::Login {
            email: rest.first().cloned(),
        }),
        "register" => match rest {
            [name, email] => Ok(Command::Register {
                name: name.clone(),
                email: email.clone(),
            }),
            _ => bail!("Usage: folio register <name> <email>"),
        },
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::WhoAmI {
            refresh: rest.iter().any(|a| a == "--refresh"),
        }),
        "passwd" => Ok(Command::Passwd),
        "projects" => parse_projects(rest).map(Command::Projects),
        "testimonials" => parse_testimonials(rest).map(Command::Testimonials),
        "stats" => Ok(Command::Stats),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => bail!("Unknown command '{}'. Run 'folio help' for usage.", other),
    }
}

fn parse_projects(args: &[String]) -> Result<ProjectsCommand> {
    let (action, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("Missing projects action. Run 'folio help' for usage."))?;

    Ok(match action.as_str() {
        "list" => ProjectsCommand::List(typed(rest)?),
        "get" => ProjectsCommand::Get(positional(rest, "id")?),
        "create" => ProjectsCommand::Create(typed(rest)?),
        "update" => ProjectsCommand::Update(positional(rest, "id")?, typed(&rest[1..])?),
        "feature" => ProjectsCommand::Feature(positional(rest, "id")?),
        "delete" => ProjectsCommand::Delete(positional(rest, "id")?),
        "tech" => ProjectsCommand::Technology(positional(rest, "technology")?, typed(&rest[1..])?),
        "year" => {
            let year = positional(rest, "year")?;
            let year = year
                .parse()
                .with_context(|| format!("Invalid year '{}'", year))?;
            ProjectsCommand::Year(year, typed(&rest[1..])?)
        }
        "stats" => ProjectsCommand::Stats,
        other => bail!("Unknown projects action '{}'", other),
    })
}

fn parse_testimonials(args: &[String]) -> Result<TestimonialsCommand> {
    let (action, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("Missing testimonials action. Run 'folio help' for usage."))?;

    Ok(match action.as_str() {
        "list" => TestimonialsCommand::List(typed(rest)?),
        "get" => TestimonialsCommand::Get(positional(rest, "id")?),
        "create" => TestimonialsCommand::Create(typed(rest)?),
        "update" => TestimonialsCommand::Update(positional(rest, "id")?, typed(&rest[1..])?),
        "approve" => TestimonialsCommand::Approve(positional(rest, "id")?),
        "delete" => TestimonialsCommand::Delete(positional(rest, "id")?),
        "featured" => TestimonialsCommand::Featured(typed(rest)?),
        "rating" => {
            let rating = positional(rest, "rating")?;
            let rating: u8 = rating
                .parse()
                .ok()
                .filter(|r| (1..=5).contains(r))
                .ok_or_else(|| anyhow!("Rating must be 1-5, got '{}'", rating))?;
            TestimonialsCommand::Rating(rating, typed(&rest[1..])?)
        }
        "companies" => TestimonialsCommand::Companies,
        "stats" => TestimonialsCommand::Stats,
        other => bail!("Unknown testimonials action '{}'", other),
    })
}

/// First argument, which must not be a `key=value` pair.
fn positional(args: &[String], name: &str) -> Result<String> {
    match args.first() {
        Some(arg) if !arg.contains('=') => Ok(arg.clone()),
        _ => bail!("Missing <{}>", name),
    }
}

/// Collect `key=value` pairs into a JSON object and decode it.
fn typed<T: DeserializeOwned>(args: &[String]) -> Result<T> {
    let mut fields = Map::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected key=value, got '{}'", arg))?;
        fields.insert(key.trim().to_string(), parse_value(value));
    }
    serde_json::from_value(Value::Object(fields)).context("Invalid arguments")
}

fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ if raw.starts_with('[') => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        // Only canonical integers: "007" and "+1" stay text
        _ => match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Value::from(n),
            _ => Value::String(raw.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use folio_core::services::SortOrder;

    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_empty_args_show_help() {
        assert_eq!(parse(&[]).expect("parsed"), Command::Help);
    }

    #[test]
    fn test_project_list_filters() {
        let command = parse(&args("projects list featured=false page=2 sortOrder=desc color=blue"))
            .expect("parsed");

        let expected = ProjectQuery {
            featured: Some(false),
            page: Some(2),
            sort_order: Some(SortOrder::Desc),
            ..ProjectQuery::default()
        };
        assert_eq!(command, Command::Projects(ProjectsCommand::List(expected)));
    }

    #[test]
    fn test_project_create_splits_technologies() {
        let command = parse(&args("projects create title=Folio technologies=Rust,Tokio year=2024"))
            .expect("parsed");

        let Command::Projects(ProjectsCommand::Create(input)) = command else {
            panic!("expected create, got {:?}", command);
        };
        assert_eq!(input.title.as_deref(), Some("Folio"));
        assert_eq!(
            input.technologies,
            Some(vec!["Rust".to_string(), "Tokio".to_string()])
        );
        assert_eq!(input.year, Some(2024));
    }

    #[test]
    fn test_numeric_text_fields_stay_text() {
        let command = parse(&args("projects create title=1984 description=42 year=1984"))
            .expect("parsed");

        let Command::Projects(ProjectsCommand::Create(input)) = command else {
            panic!("expected create, got {:?}", command);
        };
        assert_eq!(input.title.as_deref(), Some("1984"));
        assert_eq!(input.description.as_deref(), Some("42"));
        assert_eq!(input.year, Some(1984));

        let command = parse(&args("testimonials create name=Bond company=007")).expect("parsed");
        let Command::Testimonials(TestimonialsCommand::Create(input)) = command else {
            panic!("expected create, got {:?}", command);
        };
        assert_eq!(input.company.as_deref(), Some("007"));
    }

    #[test]
    fn test_testimonial_create_carries_message() {
        let command = parse(&args("testimonials create name=Grace message=Great avatarUrl=https://x/g.png"))
            .expect("parsed");

        let Command::Testimonials(TestimonialsCommand::Create(input)) = command else {
            panic!("expected create, got {:?}", command);
        };
        assert_eq!(input.name.as_deref(), Some("Grace"));
        assert_eq!(input.message.as_deref(), Some("Great"));
        assert_eq!(input.avatar_url.as_deref(), Some("https://x/g.png"));
    }

    #[test]
    fn test_update_takes_id_then_fields() {
        let command = parse(&args("testimonials update 65a1 rating=4")).expect("parsed");

        let Command::Testimonials(TestimonialsCommand::Update(id, input)) = command else {
            panic!("expected update, got {:?}", command);
        };
        assert_eq!(id, "65a1");
        assert_eq!(input.rating, Some(4));
    }

    #[test]
    fn test_missing_id_is_an_error() {
        assert!(parse(&args("projects get")).is_err());
        assert!(parse(&args("projects delete page=1")).is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(
            parse(&args("testimonials rating 5 limit=3")).expect("parsed"),
            Command::Testimonials(TestimonialsCommand::Rating(
                5,
                PageQuery {
                    page: None,
                    limit: Some(3)
                }
            ))
        );
        assert!(parse(&args("testimonials rating 6")).is_err());
        assert!(parse(&args("testimonials rating five")).is_err());
    }

    #[test]
    fn test_whoami_refresh_flag() {
        assert_eq!(
            parse(&args("whoami --refresh")).expect("parsed"),
            Command::WhoAmI { refresh: true }
        );
        assert_eq!(
            parse(&args("whoami")).expect("parsed"),
            Command::WhoAmI { refresh: false }
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse(&args("deploy")).is_err());
        assert!(parse(&args("projects archive 1")).is_err());
    }
}
