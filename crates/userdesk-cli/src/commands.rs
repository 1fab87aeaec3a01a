//! Command handlers, one per screen: dashboard, details, create, edit and delete.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error};

use userdesk_core::{
    to_form_state, ApiClient, Config, ErrorInfo, FormState, MutationError, QueryCache, QueryKey,
    UserApi, UserMutations,
};

use crate::render;
use crate::{Cli, Command, ConfigAction, FormArgs};

/// Exit code for a form rejected by validation
const EXIT_INVALID_FORM: u8 = 2;

/// One session's view of the remote collection.
struct Desk {
    cache: QueryCache,
    mutations: UserMutations,
}

impl Desk {
    fn connect(config: &Config, api_url: Option<&str>) -> Result<Self> {
        let url = config.resolve_api_url(api_url);
        debug!(url = %url, "Connecting to users API");
        let client = ApiClient::with_timeout(&url, config.request_timeout())
            .with_context(|| format!("Could not set up API client for {}", url))?;
        let api: Arc<dyn UserApi> = Arc::new(client);
        let cache = QueryCache::new(Arc::clone(&api));
        let mutations = UserMutations::new(api, cache.clone());
        Ok(Self { cache, mutations })
    }

    /// Dashboard: the full list, fetched through the cache.
    async fn dashboard(&self) -> Result<ExitCode> {
        match self.cache.read_users().await {
            Ok(users) => {
                let age = self
                    .cache
                    .peek(&QueryKey::users())
                    .map(|entry| entry.age_display())
                    .unwrap_or_else(|| "never".to_string());
                println!("{}", render::user_table(&users));
                println!("{} user(s), fetched {}", users.len(), age);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(read_failed("list", &e)),
        }
    }

    async fn show(&self, id: &str) -> Result<ExitCode> {
        match self.cache.read_user(id).await {
            Ok(user) => {
                println!("{}", render::user_detail(&user));
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(read_failed("show", &e)),
        }
    }

    async fn create(&self, args: &FormArgs) -> Result<ExitCode> {
        let mut form = to_form_state(None);
        args.apply(&mut form);

        match self.mutations.create_user(&form).await {
            Ok(user) => {
                println!("User created successfully ({})", user.id);
                self.dashboard().await
            }
            Err(e) => Ok(mutation_failed("Failed to create user", &e)),
        }
    }

    /// Edit form: pre-filled from the detail query, then overlaid with `args`.
    async fn edit(&self, id: &str, args: &FormArgs) -> Result<ExitCode> {
        let current = match self.cache.read_user(id).await {
            Ok(user) => user,
            Err(e) => return Ok(read_failed("edit", &e)),
        };
        let mut form: FormState = to_form_state(Some(&current));
        args.apply(&mut form);

        if form == to_form_state(Some(&current)) {
            println!("Nothing to update");
            return Ok(ExitCode::SUCCESS);
        }

        match self.mutations.update_user(id, &form).await {
            Ok(_) => {
                println!("User profile has been updated.");
                self.dashboard().await
            }
            Err(e) => Ok(mutation_failed("Update failed", &e)),
        }
    }

    async fn delete(&self, id: &str) -> Result<ExitCode> {
        match self.mutations.delete_user(id).await {
            Ok(()) => {
                println!("User deleted successfully.");
                self.dashboard().await
            }
            Err(e) => Ok(mutation_failed("Failed to delete user", &e)),
        }
    }
}

fn read_failed(view: &str, err: &ErrorInfo) -> ExitCode {
    error!(view = view, kind = %err.kind, error = %err.detail, "Read failed");
    eprintln!("Error: {}", err.message);
    ExitCode::FAILURE
}

fn mutation_failed(title: &str, err: &MutationError) -> ExitCode {
    match err.field_errors() {
        Some(errors) => {
            eprintln!("Validation Error: {}", err.user_message());
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
            ExitCode::from(EXIT_INVALID_FORM)
        }
        None => {
            // Kind and detail were logged by the mutation layer
            eprintln!("{}: {}", title, err.user_message());
            ExitCode::FAILURE
        }
    }
}

fn configure(action: &ConfigAction, api_url: Option<&str>) -> Result<ExitCode> {
    let mut config = Config::load()?;
    match action {
        ConfigAction::Show => {
            println!("Config file: {}", Config::config_path()?.display());
            println!("API URL:     {}", config.resolve_api_url(api_url));
            println!("Timeout:     {}s", config.request_timeout().as_secs());
        }
        ConfigAction::SetUrl { url } => {
            // Reject anything the client could not use
            ApiClient::new(url).with_context(|| format!("Invalid API URL: {}", url))?;
            config.api_url = Some(url.trim().to_string());
            config.save()?;
            println!("API URL saved");
        }
        ConfigAction::SetTimeout { secs } => {
            config.request_timeout_secs = Some(*secs);
            config.save()?;
            println!("Timeout saved");
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let api_url = cli.api_url.as_deref();

    if let Command::Config { action } = &cli.command {
        return configure(action, api_url);
    }

    let config = Config::load()?;
    let desk = Desk::connect(&config, api_url)?;

    match &cli.command {
        Command::List => desk.dashboard().await,
        Command::Show { id } => desk.show(id).await,
        Command::Create(args) => desk.create(args).await,
        Command::Edit { id, fields } => desk.edit(id, fields).await,
        Command::Delete { id } => desk.delete(id).await,
        Command::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}
