//! One function per [`Command`].

use std::{
  io::{self, BufRead, Read, Write},
  path::Path,
};

use anyhow::{Context as _, Result, bail};
use chrono::{Datelike, Local};
use ministry_core::{
  activity::{BibleClass, BibleStudy, SmallGroup, StaffVisit},
  change_request::ChangeRequest,
  record::{Collection, Record},
  user::User,
};
use serde::Serialize;

use crate::{App, Command, ConfigCommand};

pub async fn run(app: &App, command: Command) -> Result<()> {
  match command {
    Command::Login { email, password } => login(app, &email, password).await,
    Command::Logout => {
      app.logout().await?;
      println!("Logged out.");
      Ok(())
    }
    Command::Whoami => {
      match app.current_user().await {
        Some(u) => println!("{} <{}> ({:?})", u.name, u.email, u.role),
        None => println!("Not logged in."),
      }
      Ok(())
    }
    Command::Pull => {
      if !app.pull().await {
        bail!("pull failed; local data left unchanged");
      }
      println!("Up to date.");
      Ok(())
    }
    Command::List { collection } => list(app, collection).await,
    Command::Save { collection, input } => {
      let raw = read_input(&input)?;
      save(app, collection, &raw).await
    }
    Command::Delete { collection, id } => delete(app, collection, &id).await,
    Command::Config(ConfigCommand::Show) => print_json(&app.config().await),
    Command::Config(ConfigCommand::SetEndpoint { url }) => {
      let mut config = app.config().await;
      config.database_url = url;
      app.save_config(&config).await?;
      println!("Endpoint set to {}.", config.database_url);
      Ok(())
    }
    Command::Summary { year, month } => summary(app, year, month).await,
  }
}

// ─── Session ──────────────────────────────────────────────────────────────────

async fn login(app: &App, email: &str, password: Option<String>) -> Result<()> {
  let password = match password {
    Some(p) => p,
    None => prompt_password()?,
  };
  match app.login(email, &password).await? {
    Some(user) => {
      println!("Welcome, {}.", user.name);
      Ok(())
    }
    None => bail!("invalid email or password"),
  }
}

/// Read a password line from stdin.
fn prompt_password() -> Result<String> {
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

// ─── Records ──────────────────────────────────────────────────────────────────

async fn list(app: &App, collection: Collection) -> Result<()> {
  if app.current_user().await.is_none() {
    eprintln!("Not logged in; nothing is visible.");
  }
  match collection {
    Collection::Studies => print_json(&app.visible::<BibleStudy>().await),
    Collection::Classes => print_json(&app.visible::<BibleClass>().await),
    Collection::Groups => print_json(&app.visible::<SmallGroup>().await),
    Collection::Visits => print_json(&app.visible::<StaffVisit>().await),
    Collection::Users => print_json(&app.visible::<User>().await),
    Collection::ChangeRequests => print_json(&app.visible::<ChangeRequest>().await),
  }
}

async fn save(app: &App, collection: Collection, raw: &str) -> Result<()> {
  match collection {
    Collection::Studies => save_one::<BibleStudy>(app, raw).await,
    Collection::Classes => save_one::<BibleClass>(app, raw).await,
    Collection::Groups => save_one::<SmallGroup>(app, raw).await,
    Collection::Visits => save_one::<StaffVisit>(app, raw).await,
    Collection::ChangeRequests => save_one::<ChangeRequest>(app, raw).await,
    Collection::Users => {
      let user: User = serde_json::from_str(raw).context("parsing user")?;
      let is_me = app.current_user().await.is_some_and(|me| me.id == user.id);
      let saved = if is_me {
        app.update_current_user(user).await?
      } else {
        app.save(user).await?
      };
      print_json(&saved)
    }
  }
}

async fn save_one<T: Record>(app: &App, raw: &str) -> Result<()> {
  let record: T = serde_json::from_str(raw)
    .with_context(|| format!("parsing a record for {}", T::COLLECTION))?;
  let saved = app.save(record).await?;
  print_json(&saved)
}

async fn delete(app: &App, collection: Collection, id: &str) -> Result<()> {
  let removed = match collection {
    Collection::Studies => app.delete_owned::<BibleStudy>(id).await?,
    Collection::Classes => app.delete_owned::<BibleClass>(id).await?,
    Collection::Groups => app.delete_owned::<SmallGroup>(id).await?,
    Collection::Visits => app.delete_owned::<StaffVisit>(id).await?,
    Collection::Users => app.delete_owned::<User>(id).await?,
    Collection::ChangeRequests => app.delete_owned::<ChangeRequest>(id).await?,
  };
  if removed {
    println!("Deleted {collection}/{id}.");
  } else {
    println!("No {collection} record with id {id}.");
  }
  Ok(())
}

// ─── Summary ──────────────────────────────────────────────────────────────────

async fn summary(app: &App, year: Option<i32>, month: Option<u32>) -> Result<()> {
  let today = Local::now().date_naive();
  let year = year.unwrap_or(today.year());
  let month = month.unwrap_or(today.month());
  if !(1..=12).contains(&month) {
    bail!("month must be between 1 and 12");
  }

  println!("{}", app.summary(year, month).await);

  let config = app.config().await;
  if let Some(message) = config.broadcast() {
    println!("\n{message}");
  } else if let Some(cached) = app.store().cached_insight().await {
    println!("\n{} (as of {})", cached.text, cached.generated_at.format("%Y-%m-%d"));
  }
  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn read_input(path: &Path) -> Result<String> {
  if path == Path::new("-") {
    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw).context("reading stdin")?;
    Ok(raw)
  } else {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
  }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
