mod config_file;
mod display;

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use pingdirectory_core::differ::create_plan;
use pingdirectory_core::interpreter::{
    AppliedEffect, EffectOutcome, Interpreter, InterpreterConfig, OnFailure,
};
use pingdirectory_core::plan::Plan;
use pingdirectory_core::provider::Provider;
use pingdirectory_core::resource::{Resource, ResourceId, State};
use pingdirectory_core::schema::ResourceSchema;
use pingdirectory_provider::{PingDirectoryProvider, ProviderConfig};
use pingdirectory_state::{BackendConfig, LockInfo, StateBackend, StateFile, create_backend};

use config_file::ConfigFile;
use display::{format_effect, print_plan, print_state};

#[derive(Parser)]
#[command(name = "pingdirectory")]
#[command(about = "Manage PingDirectory server configuration", long_about = None)]
struct Cli {
    /// Path to the state file
    #[arg(long, global = true, default_value = "pingdirectory.state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file
    Validate {
        /// Path to the .tf.json configuration
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,
    },
    /// Show the changes an apply would make
    Plan {
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,
    },
    /// Apply changes to reach the desired configuration
    Apply {
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(long)]
        auto_approve: bool,
    },
    /// Delete every managed configuration object
    Destroy {
        #[arg(default_value = "main.tf.json")]
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(long)]
        auto_approve: bool,
    },
    /// Bring an existing configuration object under management
    Import {
        /// Resource address, e.g. pingdirectory_identity_mapper.email
        address: String,

        /// Name of the configuration object on the server
        identifier: String,

        #[arg(long, default_value = "main.tf.json")]
        file: PathBuf,
    },
    /// Inspect the state file
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
}

#[derive(Subcommand)]
enum StateCommands {
    /// List managed resources
    List,
    /// Show the recorded attributes of one resource
    Show {
        /// Resource address, e.g. pingdirectory_identity_mapper.email
        address: String,
    },
    /// Remove a lock left behind by an interrupted run
    Unlock {
        /// Lock ID reported in the "State is locked" error
        lock_id: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { file } => run_validate(&file),
        Commands::Plan { file } => run_plan(&file, &cli.state).await,
        Commands::Apply { file, auto_approve } => run_apply(&file, &cli.state, auto_approve).await,
        Commands::Destroy { file, auto_approve } => {
            run_destroy(&file, &cli.state, auto_approve).await
        }
        Commands::Import {
            address,
            identifier,
            file,
        } => run_import(&file, &cli.state, &address, &identifier).await,
        Commands::State { command } => match command {
            StateCommands::List => run_state_list(&cli.state).await,
            StateCommands::Show { address } => run_state_show(&cli.state, &address).await,
            StateCommands::Unlock { lock_id } => run_state_unlock(&cli.state, &lock_id).await,
        },
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

// =============================================================================
// Shared Steps
// =============================================================================

fn load_config(file: &Path) -> Result<(ConfigFile, PingDirectoryProvider), String> {
    let config = ConfigFile::load(file).map_err(|e| e.to_string())?;
    let provider_config =
        ProviderConfig::from_attributes(&config.provider).map_err(|e| e.to_string())?;
    log::debug!("provider configuration: {:?}", provider_config);
    let provider = PingDirectoryProvider::new(provider_config).map_err(|e| e.to_string())?;
    Ok((config, provider))
}

fn get_schemas(provider: &dyn Provider) -> HashMap<String, ResourceSchema> {
    provider
        .resource_types()
        .into_iter()
        .map(|t| (t.name().to_string(), t.schema()))
        .collect()
}

/// Validate every block, printing warnings and failing on any error
fn validate_blocks(provider: &dyn Provider, config: &ConfigFile) -> Result<(), String> {
    let mut errors = Vec::new();

    for resource in config.all_blocks() {
        let diagnostics = provider.validate(resource);
        for diagnostic in diagnostics.iter().filter(|d| !d.is_error()) {
            eprintln!("{} {}: {}", "Warning:".yellow().bold(), resource.id, diagnostic);
        }
        errors.extend(
            diagnostics
                .errors()
                .map(|d| format!("{}: {}", resource.id, d)),
        );
    }

    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        eprintln!("  {} {}", "✗".red(), error);
    }
    Err(format!("{} validation error(s)", errors.len()))
}

async fn open_backend(state_path: &Path) -> Result<Box<dyn StateBackend>, String> {
    create_backend(&BackendConfig::local(state_path.to_string_lossy()))
        .await
        .map_err(|e| e.to_string())
}

/// Re-read every recorded resource. Objects deleted outside of this tool are
/// dropped from the state with a warning.
async fn refresh(
    provider: &dyn Provider,
    state_file: &mut StateFile,
) -> Result<HashMap<ResourceId, State>, String> {
    let recorded = state_file.states().map_err(|e| e.to_string())?;
    let mut ids: Vec<&ResourceId> = recorded.keys().collect();
    ids.sort();

    let mut current = HashMap::new();
    for id in ids {
        let prior = &recorded[id];
        let state = provider
            .read(prior)
            .await
            .map_err(|e| format!("Failed to refresh {}: {}", id, e))?;

        if !state.exists {
            log::warn!("{} no longer exists on the server", id);
            eprintln!(
                "{} {} was not found on the server and will be removed from state",
                "Warning:".yellow().bold(),
                id
            );
        }
        state_file.record(&state);
        if state.exists {
            current.insert(id.clone(), state);
        }
    }
    Ok(current)
}

/// Plan every configured resource against its refreshed state
fn build_plan(
    provider: &dyn Provider,
    config: &ConfigFile,
    current: &HashMap<ResourceId, State>,
) -> Result<Plan, String> {
    let mut desired: Vec<Resource> = Vec::new();

    for resource in &config.resources {
        let prior = current
            .get(&resource.id)
            .cloned()
            .unwrap_or_else(|| State::not_found(resource.id.clone()));
        let planned = provider.plan(resource, &prior).map_err(|e| e.to_string())?;
        desired.push(planned);
    }
    desired.extend(config.data_sources.iter().cloned());

    Ok(create_plan(&desired, current, &get_schemas(provider)))
}

fn confirm(question: &str) -> Result<bool, String> {
    println!("{}", question.yellow().bold());
    println!("  {}", "Only 'yes' will be accepted to approve.".yellow());
    print!("\n  Enter a value: ");
    std::io::stdout().flush().map_err(|e| e.to_string())?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(|e| e.to_string())?;
    println!();
    Ok(input.trim() == "yes")
}

fn parse_address(address: &str) -> Result<ResourceId, String> {
    match address.split_once('.') {
        Some((resource_type, name)) if !resource_type.is_empty() && !name.is_empty() => {
            Ok(ResourceId::new(resource_type, name))
        }
        _ => Err(format!(
            "Invalid resource address '{}': expected <type>.<name>",
            address
        )),
    }
}

async fn acquire_lock(backend: &dyn StateBackend, operation: &str) -> Result<LockInfo, String> {
    backend
        .acquire_lock(operation)
        .await
        .map_err(|e| e.to_string())
}

/// Release the lock whatever the outcome of the locked work
async fn release_lock<T>(
    backend: &dyn StateBackend,
    lock: &LockInfo,
    result: Result<T, String>,
) -> Result<T, String> {
    if let Err(e) = backend.release_lock(lock).await {
        log::error!("failed to release state lock {}: {}", lock.id, e);
        if result.is_ok() {
            return Err(e.to_string());
        }
    }
    result
}

async fn read_state_file(backend: &dyn StateBackend) -> Result<StateFile, String> {
    Ok(backend
        .read_state()
        .await
        .map_err(|e| e.to_string())?
        .unwrap_or_default())
}

async fn save_state(backend: &dyn StateBackend, state_file: &mut StateFile) -> Result<(), String> {
    state_file.increment_serial();
    backend
        .write_state(state_file)
        .await
        .map_err(|e| e.to_string())
}

/// Print the outcome of every effect and record the resulting states
fn record_outcomes(plan: &Plan, applied: &[AppliedEffect], state_file: &mut StateFile) {
    for (effect, applied) in plan.effects().iter().zip(applied) {
        match &applied.result {
            Ok(EffectOutcome::Skipped { reason }) => {
                println!("  {} {} ({})", "-".dimmed(), format_effect(effect), reason);
                continue;
            }
            Ok(EffectOutcome::Deleted { id }) => {
                state_file.remove_resource(&id.resource_type, &id.name);
            }
            Ok(EffectOutcome::Read { state }) => {
                if let Some(ids) = state.attribute("ids").as_set() {
                    log::info!("{} returned {} object(s)", state.id, ids.len());
                }
            }
            Ok(outcome) => {
                if let Some(state) = outcome.state() {
                    state_file.record(state);
                }
            }
            Err(e) => {
                println!("  {} {} - {}", "✗".red(), format_effect(effect), e);
                continue;
            }
        }
        println!("  {} {}", "✓".green(), format_effect(effect));
    }
}

// =============================================================================
// Commands
// =============================================================================

fn run_validate(file: &Path) -> Result<(), String> {
    let (config, provider) = load_config(file)?;

    println!("{}", "Validating...".cyan());
    validate_blocks(&provider, &config)?;

    println!(
        "{}",
        format!(
            "✓ {} resources and {} data sources validated successfully.",
            config.resources.len(),
            config.data_sources.len()
        )
        .green()
        .bold()
    );
    for resource in config.all_blocks() {
        println!("  • {}", resource.id);
    }
    Ok(())
}

async fn run_plan(file: &Path, state_path: &Path) -> Result<(), String> {
    let (config, provider) = load_config(file)?;
    validate_blocks(&provider, &config)?;

    let backend = open_backend(state_path).await?;
    let mut state_file = read_state_file(backend.as_ref()).await?;

    let current = refresh(&provider, &mut state_file).await?;
    let plan = build_plan(&provider, &config, &current)?;
    print_plan(&plan);
    Ok(())
}

async fn run_apply(file: &Path, state_path: &Path, auto_approve: bool) -> Result<(), String> {
    let (config, provider) = load_config(file)?;
    validate_blocks(&provider, &config)?;

    let backend = open_backend(state_path).await?;
    let interpreter = Interpreter::new(provider).with_config(InterpreterConfig {
        dry_run: false,
        on_failure: OnFailure::Continue,
    });

    let lock = acquire_lock(backend.as_ref(), "apply").await?;
    let result = apply_locked(backend.as_ref(), &interpreter, &config, auto_approve).await;
    release_lock(backend.as_ref(), &lock, result).await
}

async fn apply_locked(
    backend: &dyn StateBackend,
    interpreter: &Interpreter<PingDirectoryProvider>,
    config: &ConfigFile,
    auto_approve: bool,
) -> Result<(), String> {
    let mut state_file = read_state_file(backend).await?;

    let current = refresh(interpreter.provider(), &mut state_file).await?;
    let plan = build_plan(interpreter.provider(), config, &current)?;

    if plan.has_no_changes() {
        save_state(backend, &mut state_file).await?;
        println!("{}", "No changes needed.".green());
        return Ok(());
    }

    print_plan(&plan);
    println!();

    if !auto_approve && !confirm("Do you want to perform these actions?")? {
        println!("{}", "Apply cancelled.".yellow());
        return Ok(());
    }

    println!("{}", "Applying changes...".cyan().bold());
    println!();

    let result = interpreter.apply(&plan).await;
    record_outcomes(&plan, &result.applied, &mut state_file);
    save_state(backend, &mut state_file).await?;

    println!();
    if result.is_success() {
        println!(
            "{}",
            format!("Apply complete! {} changes applied.", plan.mutation_count())
                .green()
                .bold()
        );
        Ok(())
    } else {
        Err(format!(
            "Apply failed. {} succeeded, {} failed.",
            result.succeeded(),
            result.failed()
        ))
    }
}

async fn run_destroy(file: &Path, state_path: &Path, auto_approve: bool) -> Result<(), String> {
    let (_, provider) = load_config(file)?;

    let backend = open_backend(state_path).await?;
    let interpreter = Interpreter::new(provider).with_config(InterpreterConfig {
        dry_run: false,
        on_failure: OnFailure::Continue,
    });

    let lock = acquire_lock(backend.as_ref(), "destroy").await?;
    let result = destroy_locked(backend.as_ref(), &interpreter, auto_approve).await;
    release_lock(backend.as_ref(), &lock, result).await
}

async fn destroy_locked(
    backend: &dyn StateBackend,
    interpreter: &Interpreter<PingDirectoryProvider>,
    auto_approve: bool,
) -> Result<(), String> {
    let mut state_file = read_state_file(backend).await?;

    let current = refresh(interpreter.provider(), &mut state_file).await?;
    let plan = create_plan(&[], &current, &get_schemas(interpreter.provider()));

    if plan.is_empty() {
        save_state(backend, &mut state_file).await?;
        println!("{}", "No resources to destroy.".green());
        return Ok(());
    }

    println!("{}", "Destroy Plan:".red().bold());
    println!();
    print_plan(&plan);
    println!();

    if !auto_approve && !confirm("Do you really want to destroy all managed configuration objects?")? {
        println!("{}", "Destroy cancelled.".yellow());
        return Ok(());
    }

    println!("{}", "Destroying resources...".red().bold());
    println!();

    let result = interpreter.apply(&plan).await;
    record_outcomes(&plan, &result.applied, &mut state_file);
    save_state(backend, &mut state_file).await?;

    println!();
    if result.is_success() {
        println!(
            "{}",
            format!("Destroy complete! {} resources destroyed.", result.succeeded())
                .green()
                .bold()
        );
        Ok(())
    } else {
        Err(format!(
            "Destroy failed. {} succeeded, {} failed.",
            result.succeeded(),
            result.failed()
        ))
    }
}

async fn run_import(
    file: &Path,
    state_path: &Path,
    address: &str,
    identifier: &str,
) -> Result<(), String> {
    let id = parse_address(address)?;
    let (_, provider) = load_config(file)?;

    if !get_schemas(&provider).contains_key(&id.resource_type) {
        return Err(format!("Unknown resource type: {}", id.resource_type));
    }

    let backend = open_backend(state_path).await?;
    let lock = acquire_lock(backend.as_ref(), "import").await?;
    let result = import_locked(backend.as_ref(), &provider, &id, identifier).await;
    release_lock(backend.as_ref(), &lock, result).await
}

async fn import_locked(
    backend: &dyn StateBackend,
    provider: &dyn Provider,
    id: &ResourceId,
    identifier: &str,
) -> Result<(), String> {
    let mut state_file = read_state_file(backend).await?;

    if state_file
        .find_resource(&id.resource_type, &id.name)
        .is_some()
    {
        return Err(format!("{} is already managed", id));
    }

    let state = provider
        .import(id, identifier)
        .await
        .map_err(|e| e.to_string())?;
    state_file.record(&state);
    save_state(backend, &mut state_file).await?;

    println!(
        "{}",
        format!("✓ Imported {} as {}.", identifier, id).green().bold()
    );
    Ok(())
}

async fn run_state_list(state_path: &Path) -> Result<(), String> {
    let backend = open_backend(state_path).await?;
    let Some(state_file) = backend.read_state().await.map_err(|e| e.to_string())? else {
        println!("{}", "No state file found.".yellow());
        return Ok(());
    };

    for resource in &state_file.resources {
        println!("{}.{}", resource.resource_type, resource.name);
    }
    Ok(())
}

async fn run_state_show(state_path: &Path, address: &str) -> Result<(), String> {
    let id = parse_address(address)?;
    let backend = open_backend(state_path).await?;
    let state_file = backend
        .read_state()
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "No state file found".to_string())?;

    let resource = state_file
        .find_resource(&id.resource_type, &id.name)
        .ok_or_else(|| format!("{} is not in the state", id))?;
    let state = resource.to_state().map_err(|e| e.to_string())?;
    print_state(&state);
    Ok(())
}

async fn run_state_unlock(state_path: &Path, lock_id: &str) -> Result<(), String> {
    let backend = open_backend(state_path).await?;
    backend
        .force_unlock(lock_id)
        .await
        .map_err(|e| e.to_string())?;
    println!("{}", format!("✓ Released lock {}.", lock_id).green().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pingdirectory_core::diagnostics::Diagnostics;
    use pingdirectory_core::provider::{BoxFuture, ProviderResult, ResourceType};
    use pingdirectory_core::resource::Value;

    /// Provider whose server only knows the objects named in `live`
    struct FakeProvider {
        live: Vec<String>,
    }

    impl Provider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn data_source_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn validate(&self, resource: &Resource) -> Diagnostics {
            let mut diagnostics = Diagnostics::new();
            if resource.attribute("id").is_null() {
                diagnostics.add_attribute_error("id", "Missing Attribute", "id is required");
            }
            diagnostics
        }

        fn plan(&self, desired: &Resource, _prior: &State) -> ProviderResult<Resource> {
            Ok(desired
                .clone()
                .with_attribute("last_updated", Value::Unknown))
        }

        fn read(&self, prior: &State) -> BoxFuture<'_, ProviderResult<State>> {
            let prior = prior.clone();
            Box::pin(async move {
                let identifier = prior.identifier.clone().unwrap_or_default();
                if self.live.contains(&identifier) {
                    Ok(prior)
                } else {
                    Ok(State::not_found(prior.id))
                }
            })
        }

        fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let id = resource.id.clone();
            Box::pin(async move { Ok(State::existing(id, HashMap::new())) })
        }

        fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let resource = resource.clone();
            Box::pin(async move { Ok(State::existing(resource.id, resource.attributes)) })
        }

        fn update(
            &self,
            _id: &ResourceId,
            _identifier: &str,
            _from: &State,
            to: &Resource,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let to = to.clone();
            Box::pin(async move { Ok(State::existing(to.id, to.attributes)) })
        }

        fn delete(&self, _id: &ResourceId, _identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
            Box::pin(async move { Ok(()) })
        }

        fn import(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>> {
            let state = State::existing(id.clone(), HashMap::new()).with_identifier(identifier);
            Box::pin(async move { Ok(state) })
        }
    }

    fn recorded(name: &str, identifier: &str) -> State {
        let mut attributes = HashMap::new();
        attributes.insert("id".to_string(), Value::string(identifier));
        State::existing(ResourceId::new("pingdirectory_identity_mapper", name), attributes)
            .with_identifier(identifier)
    }

    #[test]
    fn addresses_need_type_and_name() {
        let id = parse_address("pingdirectory_identity_mapper.email").unwrap();
        assert_eq!(id.resource_type, "pingdirectory_identity_mapper");
        assert_eq!(id.name, "email");
        assert!(parse_address("pingdirectory_identity_mapper").is_err());
        assert!(parse_address(".email").is_err());
    }

    #[tokio::test]
    async fn refresh_drops_objects_missing_on_the_server() {
        let provider = FakeProvider {
            live: vec!["Email".to_string()],
        };
        let mut state_file = StateFile::new();
        state_file.record(&recorded("email", "Email"));
        state_file.record(&recorded("uid", "UID"));

        let current = refresh(&provider, &mut state_file).await.unwrap();

        assert_eq!(current.len(), 1);
        assert!(
            current.contains_key(&ResourceId::new("pingdirectory_identity_mapper", "email"))
        );
        assert!(
            state_file
                .find_resource("pingdirectory_identity_mapper", "uid")
                .is_none()
        );
    }

    #[test]
    fn plan_creates_new_and_deletes_orphans() {
        let provider = FakeProvider { live: vec![] };
        let config = ConfigFile::parse(
            r#"{
                "resource": {"pingdirectory_identity_mapper": {"email": {"id": "Email"}}},
                "data": {"pingdirectory_identity_mappers": {"all": {}}}
            }"#,
        )
        .unwrap();

        let mut current = HashMap::new();
        let orphan = recorded("old", "Old");
        current.insert(orphan.id.clone(), orphan);

        let plan = build_plan(&provider, &config, &current).unwrap();
        let summary = plan.summary();
        assert_eq!(summary.create, 1);
        assert_eq!(summary.read, 1);
        assert_eq!(summary.delete, 1);
    }

    #[test]
    fn validation_errors_fail_the_run() {
        let provider = FakeProvider { live: vec![] };
        let config = ConfigFile::parse(
            r#"{"resource": {"pingdirectory_identity_mapper": {"email": {"enabled": true}}}}"#,
        )
        .unwrap();

        let err = validate_blocks(&provider, &config).unwrap_err();
        assert_eq!(err, "1 validation error(s)");
    }

    #[tokio::test]
    async fn outcomes_update_the_state_file() {
        let provider = FakeProvider { live: vec![] };
        let config = ConfigFile::parse(
            r#"{"resource": {"pingdirectory_identity_mapper": {"email": {"id": "Email"}}}}"#,
        )
        .unwrap();

        let mut current = HashMap::new();
        let orphan = recorded("old", "Old");
        current.insert(orphan.id.clone(), orphan.clone());

        let mut state_file = StateFile::new();
        state_file.record(&orphan);

        let plan = build_plan(&provider, &config, &current).unwrap();
        let interpreter = Interpreter::new(provider);
        let result = interpreter.apply(&plan).await;
        assert!(result.is_success());

        record_outcomes(&plan, &result.applied, &mut state_file);
        assert!(
            state_file
                .find_resource("pingdirectory_identity_mapper", "email")
                .is_some()
        );
        assert!(
            state_file
                .find_resource("pingdirectory_identity_mapper", "old")
                .is_none()
        );
    }

    #[tokio::test]
    async fn lock_is_released_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let backend = open_backend(&dir.path().join("pd.state.json")).await.unwrap();

        let lock = acquire_lock(backend.as_ref(), "apply").await.unwrap();
        let result: Result<(), String> =
            release_lock(backend.as_ref(), &lock, Err("boom".to_string())).await;
        assert_eq!(result.unwrap_err(), "boom");

        let lock = acquire_lock(backend.as_ref(), "apply").await.unwrap();
        release_lock(backend.as_ref(), &lock, Ok(())).await.unwrap();
    }

    #[tokio::test]
    async fn unlock_clears_a_stale_lock() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("pd.state.json");
        let backend = open_backend(&state_path).await.unwrap();
        let stale = acquire_lock(backend.as_ref(), "apply").await.unwrap();

        let err = run_state_unlock(&state_path, "not-the-lock").await.unwrap_err();
        assert!(err.contains("mismatch"));
        assert!(acquire_lock(backend.as_ref(), "apply").await.is_err());

        run_state_unlock(&state_path, &stale.id).await.unwrap();
        let lock = acquire_lock(backend.as_ref(), "apply").await.unwrap();
        release_lock(backend.as_ref(), &lock, Ok(())).await.unwrap();
    }

    #[tokio::test]
    async fn import_records_state_and_refuses_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let backend = open_backend(&dir.path().join("pd.state.json")).await.unwrap();
        let provider = FakeProvider { live: vec![] };
        let id = ResourceId::new("pingdirectory_identity_mapper", "email");

        import_locked(backend.as_ref(), &provider, &id, "Email")
            .await
            .unwrap();
        let state_file = read_state_file(backend.as_ref()).await.unwrap();
        assert_eq!(state_file.serial, 1);
        assert_eq!(
            state_file
                .find_resource("pingdirectory_identity_mapper", "email")
                .and_then(|r| r.identifier.as_deref()),
            Some("Email")
        );

        let err = import_locked(backend.as_ref(), &provider, &id, "Email")
            .await
            .unwrap_err();
        assert!(err.contains("already managed"));
    }
}
