//! Interactive shell
//!
//! Reads one command per line and prints the affected view after each one.
//! Core events are drained into a [`LogState`] between commands.

use std::path::PathBuf;

use crossbeam_channel::Receiver;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::application::Application;
use crate::domain::dataset::DatasetId;
use crate::error::Result;
use crate::eventing::app_event::AppEvent;
use crate::services::{Credentials, CsvFile};
use crate::state::log_state::LogState;

use super::render;

const HELP: &str = "\
Commands:
  login <username> <password>     log in
  register <username> <password>  create an account and log in
  logout                          log out and clear everything
  select <path>                   choose a CSV file to upload
  submit                          upload the selected file
  history                         refresh and list recent uploads
  load <id>                       load a dataset from history
  summary                         show summary cards
  table                           show the equipment table
  charts                          show type distribution charts
  report [dir]                    download the PDF report (default: .)
  logs [n]                        show the last n activity lines
  status                          show login and upload state
  help                            show this help
  quit                            exit";

const DEFAULT_LOG_LINES: usize = 20;

/// A parsed shell line
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Login(Credentials),
    Register(Credentials),
    Logout,
    Select(PathBuf),
    Submit,
    History,
    Load(DatasetId),
    Summary,
    Table,
    Charts,
    Report(PathBuf),
    Logs(usize),
    Status,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse a line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("login", [user, pass]) => ShellCommand::Login(Credentials::new(*user, *pass)),
            ("register", [user, pass]) => ShellCommand::Register(Credentials::new(*user, *pass)),
            ("login" | "register", _) => {
                return Err(format!("usage: {command} <username> <password>"));
            }
            ("logout", []) => ShellCommand::Logout,
            ("select", [_, ..]) => ShellCommand::Select(PathBuf::from(args.join(" "))),
            ("select", []) => return Err("usage: select <path>".to_string()),
            ("submit" | "upload", []) => ShellCommand::Submit,
            ("history", []) => ShellCommand::History,
            ("load", [id]) => ShellCommand::Load(DatasetId::from(*id)),
            ("load", _) => return Err("usage: load <id>".to_string()),
            ("summary", []) => ShellCommand::Summary,
            ("table", []) => ShellCommand::Table,
            ("charts", []) => ShellCommand::Charts,
            ("report", []) => ShellCommand::Report(PathBuf::from(".")),
            ("report", [_, ..]) => ShellCommand::Report(PathBuf::from(args.join(" "))),
            ("logs", []) => ShellCommand::Logs(DEFAULT_LOG_LINES),
            ("logs", [n]) => ShellCommand::Logs(
                n.parse()
                    .map_err(|_| format!("not a number: {n}"))?,
            ),
            ("status", []) => ShellCommand::Status,
            ("help" | "?", _) => ShellCommand::Help,
            ("quit" | "exit", []) => ShellCommand::Quit,
            _ => return Err(format!("unknown command: {line}. Type 'help' for commands.")),
        };
        Ok(Some(command))
    }
}

pub struct Shell {
    app: Application,
    events: Receiver<AppEvent>,
    log: LogState,
}

impl Shell {
    pub fn new(app: Application, events: Receiver<AppEvent>) -> Self {
        Self {
            app,
            events,
            log: LogState::default(),
        }
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    /// Read commands from stdin until `quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        println!("Chemviz shell - connected to {}", self.app.config().api.base_url);
        println!("Type 'help' for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match ShellCommand::parse(&line) {
                Ok(None) => continue,
                Ok(Some(ShellCommand::Quit)) => break,
                Ok(Some(command)) => {
                    let output = self.execute(command).await;
                    println!("{}", output.trim_end());
                }
                Err(usage) => println!("{usage}"),
            }
        }

        if self.app.auth().is_logged_in() {
            self.app.logout().await;
        }
        Ok(())
    }

    /// Run one command and return what to print
    pub async fn execute(&mut self, command: ShellCommand) -> String {
        let output = match command {
            ShellCommand::Login(credentials) => match self.app.login(&credentials).await {
                Ok(()) => format!(
                    "{}\n{}",
                    render::render_auth(&self.app.auth().state()),
                    render::render_history(&self.app.history().state())
                ),
                Err(e) => format!("Login failed: {}", e.user_message()),
            },
            ShellCommand::Register(credentials) => match self.app.register(&credentials).await {
                Ok(()) => render::render_auth(&self.app.auth().state()),
                Err(e) => format!("Registration failed: {}", e.user_message()),
            },
            ShellCommand::Logout => {
                self.app.logout().await;
                render::render_auth(&self.app.auth().state())
            }
            ShellCommand::Select(path) => match CsvFile::read(&path).await {
                Ok(file) => match self.app.select_file(file) {
                    Ok(()) => render::render_upload(&self.app.upload().state()),
                    Err(e) => e.user_message(),
                },
                Err(e) => format!("Cannot read {}: {}", path.display(), e.user_message()),
            },
            ShellCommand::Submit => match self.app.submit_upload().await {
                Ok(outcome) if outcome.published => self.dataset_view(),
                Ok(outcome) => format!(
                    "Uploaded dataset {}; a newer load is being shown",
                    outcome.dataset_id
                ),
                Err(e) if e.is_cancelled() => e.to_string(),
                Err(e) => format!("Upload failed: {}", e.user_message()),
            },
            ShellCommand::History => match self.app.refresh_history().await {
                Ok(_) => render::render_history(&self.app.history().state()),
                Err(e) => format!("History failed: {}", e.user_message()),
            },
            ShellCommand::Load(id) => match self.app.load_from_history(&id).await {
                Ok(_) => self.dataset_view(),
                Err(e) if e.is_cancelled() => String::new(),
                Err(e) => format!("Failed to load dataset {id}: {}", e.user_message()),
            },
            ShellCommand::Summary => render::render_summary(self.app.session().summary.as_ref()),
            ShellCommand::Table => render::render_table(&self.app.session().rows),
            ShellCommand::Charts => render::render_charts(&self.app.chart_data()),
            ShellCommand::Report(dir) => match self.app.download_report(&dir).await {
                Ok(path) => format!("Report saved to {}", path.display()),
                Err(e) => self.app.report().error().unwrap_or_else(|| e.user_message()),
            },
            ShellCommand::Logs(n) => {
                self.drain_events();
                render::render_logs(&self.log, n)
            }
            ShellCommand::Status => format!(
                "{}\n{}",
                render::render_auth(&self.app.auth().state()),
                render::render_upload(&self.app.upload().state())
            ),
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Quit => String::new(),
        };
        self.drain_events();
        output
    }

    fn dataset_view(&self) -> String {
        let session = self.app.session();
        format!(
            "{}\n{}",
            render::render_summary(session.summary.as_ref()),
            render::render_charts(&session.chart_data())
        )
    }

    /// Move pending log events into the activity log
    fn drain_events(&mut self) {
        for event in self.events.try_iter() {
            if let AppEvent::Log {
                level,
                message,
                timestamp,
            } = event
            {
                self.log.push(level, message, timestamp);
            }
        }
    }
}
