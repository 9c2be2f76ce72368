use anyhow::Result;
use tracing::{debug, info, warn};

use crate::command::{CommandRunner, Invocation, StreamOutcome};
use crate::config::Config;
use crate::docker::ContainerRuntime;
use crate::error::CommandError;
use crate::menu::{self, MenuChoice};
use crate::mongosh::{self, DatabaseName, NewUser};
use crate::prompt::LineSource;
use crate::ui::Reporter;

const NOT_RUNNING: &str = "MongoDB container is not running. Please start it first.";

/// Consecutive read failures tolerated at the menu before giving up.
const MAX_READ_ATTEMPTS: usize = 3;

/// Whether the menu loop should keep going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The interactive menu and its actions for one managed container.
///
/// Every action recovers from its own failures: problems are reported through
/// the [`Reporter`] and control returns to the menu.
///
/// Example
/// ```
/// use mongo_manager::{Config, Flow, Manager, Reporter, ScriptedLines, SystemRunner};
/// let mut manager = Manager::new(
///     Config::default(),
///     SystemRunner::new(),
///     ScriptedLines::new(Vec::<String>::new()),
///     Reporter::new(Box::new(std::io::sink()), Box::new(std::io::sink())),
/// );
/// assert_eq!(manager.handle("not a choice"), Flow::Continue);
/// ```
pub struct Manager<R, L> {
    config: Config,
    runner: R,
    input: L,
    reporter: Reporter,
}

impl<R: CommandRunner, L: LineSource> Manager<R, L> {
    pub fn new(config: Config, runner: R, input: L, reporter: Reporter) -> Self {
        Self {
            config,
            runner,
            input,
            reporter,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Show the menu, run the chosen action, wait for Enter, repeat.
    ///
    /// Returns when the operator picks Exit or input ends.
    pub fn repl(&mut self) -> Result<()> {
        let mut first = true;
        loop {
            // Keep startup warnings visible on the first screen.
            if !first {
                self.reporter.clear_screen();
            }
            first = false;
            menu::render(self.reporter.out())?;

            let Some(line) = self.read_menu_line("\n▶ Enter your choice: ") else {
                self.reporter.success("Exiting. Goodbye!");
                break;
            };
            if self.handle(&line) == Flow::Exit {
                break;
            }

            self.reporter.note("\nPress Enter to return to the menu...");
            if self.read_menu_line("").is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Dispatch one line of menu input.
    pub fn handle(&mut self, line: &str) -> Flow {
        let choice = match line.parse::<MenuChoice>() {
            Ok(choice) => choice,
            Err(unknown) => {
                debug!(input = %unknown.0, "unrecognized menu choice");
                self.reporter.error("Invalid choice. Please try again.");
                return Flow::Continue;
            }
        };
        info!(?choice, "menu action");

        match choice {
            MenuChoice::Start => self.start(),
            MenuChoice::Stop => self.stop(),
            MenuChoice::Logs => self.view_logs(),
            MenuChoice::AddDatabase => self.add_database(),
            MenuChoice::AddUser => self.add_user(),
            MenuChoice::Info => self.database_info(),
            MenuChoice::Exit => {
                self.reporter.success("Exiting. Goodbye!");
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    fn start(&mut self) {
        let container = self.config.container.clone();
        if self.is_container_running() {
            self.reporter
                .info(&format!("Container '{}' is already running.", container));
            return;
        }

        self.reporter
            .info(&format!("Starting MongoDB container named '{}'...", container));
        let inv = self.docker().run_detached();
        match self.execute(&inv) {
            Ok(()) => self.reporter.success("MongoDB container started successfully."),
            Err(e) => self
                .reporter
                .error(&format!("Failed to start MongoDB container: {}", e)),
        }
    }

    fn stop(&mut self) {
        let container = self.config.container.clone();
        let inv = self.docker().list_all();
        let exists = match self.runner.capture(&inv) {
            Ok(ids) => !ids.trim().is_empty(),
            Err(e) => {
                debug!(error = %e, "container lookup failed");
                false
            }
        };
        if !exists {
            self.reporter
                .info(&format!("Container '{}' not found.", container));
            return;
        }

        self.reporter
            .info(&format!("Stopping and removing container '{}'...", container));
        let inv = self.docker().stop();
        if let Err(e) = self.execute(&inv) {
            self.reporter.warning(&format!(
                "Failed to stop container, it might already be stopped. {}",
                e
            ));
        }
        let inv = self.docker().remove();
        match self.execute(&inv) {
            Ok(()) => self
                .reporter
                .success("MongoDB container stopped and removed successfully."),
            Err(e) => self
                .reporter
                .error(&format!("Failed to remove container: {}", e)),
        }
    }

    fn view_logs(&mut self) {
        if !self.require_running() {
            return;
        }
        self.reporter.clear_screen();
        self.reporter
            .info("Showing live logs... Press Ctrl+C to stop and return to the menu.");

        let inv = self.docker().follow_logs();
        match self.runner.stream_until_interrupted(&inv) {
            Ok(StreamOutcome::Completed) => self
                .reporter
                .info("Log stream ended because the container stopped."),
            Ok(StreamOutcome::Interrupted { kill_error }) => {
                if let Some(e) = kill_error {
                    self.reporter
                        .error(&format!("Failed to stop log process: {}", e));
                }
                self.reporter.info("Log streaming stopped.");
            }
            Err(e) => self.reporter.error(&format!("Failed to stream logs: {}", e)),
        }
    }

    fn add_database(&mut self) {
        if !self.require_running() {
            return;
        }
        let Some(raw) = self.ask("Enter new database name: ") else {
            return;
        };
        let name = match DatabaseName::parse(&raw) {
            Ok(name) => name,
            Err(e) => {
                self.reporter.error(&e.to_string());
                return;
            }
        };

        self.reporter
            .info(&format!("Creating database '{}'...", name));
        let inv = mongosh::create_database(&self.docker(), &name);
        match self.execute(&inv) {
            Ok(()) => self
                .reporter
                .success(&format!("Database '{}' created successfully.", name)),
            Err(e) => self
                .reporter
                .error(&format!("Failed to create database: {}", e)),
        }
    }

    fn add_user(&mut self) {
        if !self.require_running() {
            return;
        }
        self.list_databases_for_user();
        self.reporter.plain("");

        let Some(username) = self.ask("Enter username: ") else {
            return;
        };
        let Some(password) = self.ask("Enter password: ") else {
            return;
        };
        let Some(database) = self.ask("Enter database from the list above to assign the user to: ")
        else {
            return;
        };
        let user = match NewUser::parse(&username, &password, &database) {
            Ok(user) => user,
            Err(e) => {
                self.reporter.error(&e.to_string());
                return;
            }
        };

        self.reporter.info("Adding new user...");
        let inv = mongosh::create_user(&self.docker(), &user);
        if let Err(e) = self.execute(&inv) {
            self.reporter.error(&format!("Failed to add user: {}", e));
            return;
        }
        self.reporter.success(&format!(
            "User '{}' added to database '{}' successfully.",
            user.username, user.database
        ));
        match user.connection_string(self.config.host_port) {
            Some(url) => self.reporter.info(&format!("Connection string: {}", url)),
            None => warn!("could not build connection string"),
        }
    }

    fn list_databases_for_user(&mut self) {
        self.reporter.info("Fetching available databases...");
        let inv = mongosh::list_databases(&self.docker());
        match self.execute_capture(&inv) {
            Ok(list) if list.trim().is_empty() => self
                .reporter
                .note("No user-created databases found yet. 'admin' is always available."),
            Ok(list) => {
                self.reporter.note("Available databases to add a user to:");
                self.reporter.plain(list.trim_end());
            }
            Err(e) => self
                .reporter
                .error(&format!("Could not fetch database list: {}", e)),
        }
    }

    fn database_info(&mut self) {
        if !self.require_running() {
            return;
        }
        self.reporter.info("Fetching information for all databases...");
        self.reporter
            .note("Note: Passwords are encrypted and cannot be displayed.");

        self.reporter.plain("\n--- ADMINISTRATIVE USERS ---");
        let inv = mongosh::admin_users(&self.docker());
        if let Err(e) = self.execute(&inv) {
            self.reporter
                .error(&format!("Failed to list administrative users: {}", e));
            return;
        }

        let inv = mongosh::database_info(&self.docker());
        if let Err(e) = self.execute(&inv) {
            self.reporter
                .error(&format!("Failed to retrieve database info: {}", e));
            return;
        }
        self.reporter
            .success("Finished retrieving database information.");
        if let Ok(url) = mongosh::server_connection_string(self.config.host_port) {
            self.reporter
                .info(&format!("Server connection string: {}", url));
        }
    }

    fn docker(&self) -> ContainerRuntime<'_> {
        ContainerRuntime::new(&self.config)
    }

    /// A failed status check counts as not running.
    fn is_container_running(&mut self) -> bool {
        let inv = self.docker().list_running();
        match self.runner.capture(&inv) {
            Ok(ids) => !ids.trim().is_empty(),
            Err(e) => {
                self.reporter
                    .error(&format!("Failed to check container status: {}", e));
                false
            }
        }
    }

    fn require_running(&mut self) -> bool {
        let running = self.is_container_running();
        if !running {
            self.reporter.error(NOT_RUNNING);
        }
        running
    }

    /// Read at the menu level. A failed read is reported and retried, so only
    /// end of input or a terminal that keeps failing ends the loop.
    fn read_menu_line(&mut self, prompt: &str) -> Option<String> {
        for attempt in 1..=MAX_READ_ATTEMPTS {
            match self.input.read_line(prompt) {
                Ok(line) => return line,
                Err(e) => {
                    warn!(error = %e, attempt, "failed to read menu input");
                    self.reporter.error(&format!("Failed to read input: {}", e));
                }
            }
        }
        None
    }

    /// Prompt for one value. `None` aborts the current action.
    fn ask(&mut self, prompt: &str) -> Option<String> {
        match self.input.read_line(prompt) {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                self.reporter.info("Input cancelled.");
                None
            }
            Err(e) => {
                self.reporter.error(&format!("Failed to read input: {}", e));
                None
            }
        }
    }

    fn execute(&mut self, inv: &Invocation) -> Result<(), CommandError> {
        self.reporter.executing(inv);
        self.runner.run(inv)
    }

    fn execute_capture(&mut self, inv: &Invocation) -> Result<String, CommandError> {
        self.reporter.executing(inv);
        self.runner.capture(inv)
    }
}
