mod declaration;
mod display;

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use userpool_core::differ::create_plan;
use userpool_core::interpreter::{EffectOutcome, Interpreter, InterpreterConfig};
use userpool_core::plan::Plan;
use userpool_core::provider::Provider;
use userpool_core::resource::{Resource, ResourceId, State};
use userpool_core::schema::ResourceSchema;
use userpool_provider_cognito::{CognitoProvider, schemas};
use userpool_state::{BackendError, LocalBackend, LockInfo, StateBackend, StateFile};

use declaration::{Declaration, validate_resources};
use display::{format_effect, print_plan};

#[derive(Parser)]
#[command(name = "userpool")]
#[command(about = "Declarative management of Cognito user pool clients", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Files {
    /// Path to the declaration file
    #[arg(default_value = "main.json")]
    file: PathBuf,

    /// Path to the state file
    #[arg(long, default_value = LocalBackend::DEFAULT_STATE_FILE)]
    state: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the declaration file
    Validate {
        /// Path to the declaration file
        #[arg(default_value = "main.json")]
        file: PathBuf,
    },
    /// Show execution plan without applying changes
    Plan {
        #[command(flatten)]
        files: Files,
    },
    /// Apply changes to reach the declared state
    Apply {
        #[command(flatten)]
        files: Files,
    },
    /// Re-read every recorded client and update the state file
    Refresh {
        #[command(flatten)]
        files: Files,
    },
    /// Delete every client recorded in the state file
    Destroy {
        #[command(flatten)]
        files: Files,

        /// Skip confirmation prompt (auto-approve)
        #[arg(long)]
        auto_approve: bool,
    },
    /// Remove a state lock left behind by an interrupted run
    ForceUnlock {
        /// Id of the lock to remove
        lock_id: String,

        /// Path to the state file
        #[arg(long, default_value = LocalBackend::DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { file } => run_validate(&file),
        Commands::Plan { files } => run_plan(&files).await,
        Commands::Apply { files } => run_apply(&files).await,
        Commands::Refresh { files } => run_refresh(&files).await,
        Commands::Destroy {
            files,
            auto_approve,
        } => run_destroy(&files, auto_approve).await,
        Commands::ForceUnlock { lock_id, state } => run_force_unlock(&lock_id, &state).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn get_schemas() -> HashMap<String, ResourceSchema> {
    schemas::all_schemas()
        .into_iter()
        .map(|schema| (schema.resource_type.clone(), schema))
        .collect()
}

fn run_validate(file: &Path) -> Result<(), String> {
    let decl = Declaration::load(file)?;
    let resources = decl.resources()?;

    println!("{}", "Validating...".cyan());
    validate_resources(&resources, &get_schemas())?;

    println!(
        "{}",
        format!("✓ {} resources validated successfully.", resources.len())
            .green()
            .bold()
    );
    for resource in &resources {
        println!("  • {}", resource.id);
    }

    Ok(())
}

async fn get_provider(decl: &Declaration) -> CognitoProvider {
    match &decl.provider.region {
        Some(region) => println!(
            "{}",
            format!("Using Cognito provider (region: {})", region).cyan()
        ),
        None => println!("{}", "Using Cognito provider (default region)".cyan()),
    }
    CognitoProvider::new(decl.provider.region.as_deref()).await
}

async fn load_state(backend: &LocalBackend) -> Result<StateFile, String> {
    backend
        .read_state()
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| format!("Failed to read state: {}", e))
}

async fn save_state(backend: &LocalBackend, state: &mut StateFile) -> Result<(), String> {
    state.increment_serial();
    backend
        .write_state(state)
        .await
        .map_err(|e| format!("Failed to write state: {}", e))
}

/// Read every recorded resource through the provider.
///
/// The state file is updated in place; clients that are gone are dropped
/// from it.
async fn refresh_states(
    provider: &impl Provider,
    state: &mut StateFile,
) -> Result<HashMap<ResourceId, State>, String> {
    let mut current = HashMap::new();

    for (id, recorded) in state.states() {
        let observed = provider
            .read(&id, recorded.identifier.as_deref())
            .await
            .map_err(|e| format!("Failed to read state: {}", e))?;
        state.record(&observed);
        current.insert(id, observed);
    }

    Ok(current)
}

async fn acquire_lock(backend: &LocalBackend, operation: &str) -> Result<LockInfo, String> {
    backend.acquire_lock(operation).await.map_err(|e| match e {
        BackendError::Locked { ref lock_id, .. } => format!(
            "{}\nIf no other run is active, remove it with `userpool force-unlock {}`",
            e, lock_id
        ),
        e => e.to_string(),
    })
}

async fn release_lock(backend: &LocalBackend, lock: &LockInfo) {
    if let Err(e) = backend.release_lock(lock).await {
        log::warn!("Failed to release state lock {}: {}", lock.id, e);
    }
}

async fn run_force_unlock(lock_id: &str, state: &Path) -> Result<(), String> {
    LocalBackend::with_path(state)
        .force_unlock(lock_id)
        .await
        .map_err(|e| e.to_string())?;
    println!("{}", format!("Lock {} released.", lock_id).green().bold());
    Ok(())
}

async fn run_plan(files: &Files) -> Result<(), String> {
    let decl = Declaration::load(&files.file)?;
    let resources = decl.resources()?;
    let schemas = get_schemas();
    validate_resources(&resources, &schemas)?;

    let backend = LocalBackend::with_path(&files.state);
    let mut state = load_state(&backend).await?;
    let provider = get_provider(&decl).await;

    let current = refresh_states(&provider, &mut state).await?;
    let plan = create_plan(&resources, &current, &schemas);
    print_plan(&plan, &schemas);
    Ok(())
}

async fn run_apply(files: &Files) -> Result<(), String> {
    let decl = Declaration::load(&files.file)?;
    let resources = decl.resources()?;
    let schemas = get_schemas();
    validate_resources(&resources, &schemas)?;

    let backend = LocalBackend::with_path(&files.state);
    let provider = get_provider(&decl).await;

    let lock = acquire_lock(&backend, "apply").await?;
    let result = apply_locked(&backend, &provider, &resources, &schemas).await;
    release_lock(&backend, &lock).await;
    result
}

async fn apply_locked(
    backend: &LocalBackend,
    provider: &impl Provider,
    resources: &[Resource],
    schemas: &HashMap<String, ResourceSchema>,
) -> Result<(), String> {
    let mut state = load_state(backend).await?;
    let current = refresh_states(provider, &mut state).await?;
    let plan = create_plan(resources, &current, schemas);

    if plan.is_empty() {
        save_state(backend, &mut state).await?;
        println!("{}", "No changes needed.".green());
        return Ok(());
    }

    print_plan(&plan, schemas);
    println!();
    println!("{}", "Applying changes...".cyan().bold());
    println!();

    let counts = execute(provider, &plan, &mut state).await;
    save_state(backend, &mut state).await?;
    report("Apply", counts)
}

async fn run_refresh(files: &Files) -> Result<(), String> {
    let decl = Declaration::load(&files.file)?;
    let backend = LocalBackend::with_path(&files.state);
    let provider = get_provider(&decl).await;

    let lock = acquire_lock(&backend, "refresh").await?;
    let result = refresh_locked(&backend, &provider).await;
    release_lock(&backend, &lock).await;
    result
}

async fn refresh_locked(backend: &LocalBackend, provider: &impl Provider) -> Result<(), String> {
    let mut state = load_state(backend).await?;
    let current = refresh_states(provider, &mut state).await?;

    let mut ids: Vec<&ResourceId> = current.keys().collect();
    ids.sort_by_key(|id| id.to_string());
    for id in ids {
        if current[id].exists {
            println!("  {} {}", "✓".green(), id);
        } else {
            println!("  {} {} (gone, removed from state)", "-".yellow(), id);
        }
    }

    save_state(backend, &mut state).await?;
    println!("{}", "Refresh complete.".green().bold());
    Ok(())
}

async fn run_destroy(files: &Files, auto_approve: bool) -> Result<(), String> {
    let decl = Declaration::load(&files.file)?;
    let backend = LocalBackend::with_path(&files.state);
    let provider = get_provider(&decl).await;

    let lock = acquire_lock(&backend, "destroy").await?;
    let result = destroy_locked(&backend, &provider, auto_approve).await;
    release_lock(&backend, &lock).await;
    result
}

async fn destroy_locked(
    backend: &LocalBackend,
    provider: &impl Provider,
    auto_approve: bool,
) -> Result<(), String> {
    let mut state = load_state(backend).await?;
    let current = refresh_states(provider, &mut state).await?;

    // With nothing declared every recorded client is an orphan
    let schemas = get_schemas();
    let plan = create_plan(&[], &current, &schemas);

    if plan.is_empty() {
        save_state(backend, &mut state).await?;
        println!("{}", "No resources to destroy.".green());
        return Ok(());
    }

    println!("{}", "Destroy Plan:".red().bold());
    println!();
    for effect in plan.effects() {
        println!("  {} {}", "-".red().bold(), effect.resource_id());
    }
    println!();
    println!(
        "Plan: {} to destroy.",
        plan.effects().len().to_string().red()
    );
    println!();

    if !auto_approve && !confirm_destroy()? {
        save_state(backend, &mut state).await?;
        println!("{}", "Destroy cancelled.".yellow());
        return Ok(());
    }

    println!("{}", "Destroying resources...".red().bold());
    println!();

    let counts = execute(provider, &plan, &mut state).await;
    save_state(backend, &mut state).await?;
    report("Destroy", counts)
}

fn confirm_destroy() -> Result<bool, String> {
    println!(
        "{}",
        "Do you really want to destroy all resources?".yellow().bold()
    );
    println!(
        "  {}",
        "This action cannot be undone. Type 'yes' to confirm.".yellow()
    );
    print!("\n  Enter a value: ");
    std::io::stdout().flush().map_err(|e| e.to_string())?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(|e| e.to_string())?;
    println!();

    Ok(input.trim() == "yes")
}

/// Run the plan and fold each outcome into the state file.
///
/// Returns (succeeded, failed).
async fn execute(provider: &impl Provider, plan: &Plan, state: &mut StateFile) -> (usize, usize) {
    let interpreter = Interpreter::new(provider).with_config(InterpreterConfig {
        continue_on_error: true,
    });
    let result = interpreter.apply(plan).await;

    for (effect, outcome) in plan.effects().iter().zip(&result.outcomes) {
        match outcome {
            Ok(EffectOutcome::Created { state: observed })
            | Ok(EffectOutcome::Updated { state: observed })
            | Ok(EffectOutcome::Replaced { state: observed }) => {
                state.record(observed);
                println!("  {} {}", "✓".green(), format_effect(effect));
            }
            Ok(EffectOutcome::Deleted { id }) => {
                state.remove(id);
                println!("  {} {}", "✓".green(), format_effect(effect));
            }
            Err(e) => {
                println!("  {} {} - {}", "✗".red(), format_effect(effect), e);
            }
        }
    }

    (result.success_count, result.failure_count)
}

fn report(action: &str, (succeeded, failed): (usize, usize)) -> Result<(), String> {
    println!();
    if failed == 0 {
        println!(
            "{}",
            format!("{} complete! {} changes applied.", action, succeeded)
                .green()
                .bold()
        );
        Ok(())
    } else {
        Err(format!(
            "{} failed. {} succeeded, {} failed.",
            action, succeeded, failed
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use clap::CommandFactory;
    use serde_json::json;
    use userpool_core::provider::{BoxFuture, ProviderError, ProviderResult, ResourceType};
    use userpool_core::resource::Value;
    use userpool_state::ResourceState;

    const CLIENT: &str = "cognito.user_pool_client";

    #[derive(Default)]
    struct Remote {
        clients: HashMap<String, HashMap<String, Value>>,
        next_id: u32,
        fail_create: bool,
    }

    /// Keeps clients in memory, keyed by their `<pool>/<client>` identifier
    #[derive(Default)]
    struct MemoryProvider {
        remote: Mutex<Remote>,
    }

    impl MemoryProvider {
        fn refuse_creates(&self) {
            self.remote.lock().unwrap().fail_create = true;
        }

        fn client_count(&self) -> usize {
            self.remote.lock().unwrap().clients.len()
        }
    }

    impl Provider for MemoryProvider {
        fn name(&self) -> &'static str {
            "memory"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn read(
            &self,
            id: &ResourceId,
            identifier: Option<&str>,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let remote = self.remote.lock().unwrap();
            let state = match identifier.and_then(|i| remote.clients.get(i).map(|a| (i, a))) {
                Some((identifier, attributes)) => {
                    State::existing(id.clone(), attributes.clone()).with_identifier(identifier)
                }
                None => State::not_found(id.clone()),
            };
            Box::pin(async move { Ok(state) })
        }

        fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let mut remote = self.remote.lock().unwrap();
            let result = if remote.fail_create {
                Err(ProviderError::new("create refused").for_resource(resource.id.clone()))
            } else {
                remote.next_id += 1;
                let client_id = format!("client{}", remote.next_id);
                let identifier = format!("us-east-1_AbCdEf/{}", client_id);
                let mut attributes = resource.attributes.clone();
                attributes.insert("id".to_string(), Value::String(client_id));
                remote.clients.insert(identifier.clone(), attributes.clone());
                Ok(State::existing(resource.id.clone(), attributes).with_identifier(identifier))
            };
            Box::pin(async move { result })
        }

        fn update(
            &self,
            id: &ResourceId,
            identifier: &str,
            from: &State,
            to: &Resource,
            _changed: &[String],
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let mut attributes = from.attributes.clone();
            attributes.extend(to.attributes.clone());
            self.remote
                .lock()
                .unwrap()
                .clients
                .insert(identifier.to_string(), attributes.clone());
            let state = State::existing(id.clone(), attributes).with_identifier(identifier);
            Box::pin(async move { Ok(state) })
        }

        fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
            let removed = self.remote.lock().unwrap().clients.remove(identifier);
            let result = match removed {
                Some(_) => Ok(()),
                None => Err(ProviderError::new("no such client").for_resource(id.clone())),
            };
            Box::pin(async move { result })
        }
    }

    fn declared(client_name: &str, validity: i64) -> Vec<Resource> {
        vec![
            Resource::new(CLIENT, "web")
                .with_attribute("name", Value::String(client_name.to_string()))
                .with_attribute("user_pool_id", Value::String("us-east-1_AbCdEf".to_string()))
                .with_attribute("refresh_token_validity", Value::Int(validity)),
        ]
    }

    async fn recorded(backend: &LocalBackend) -> StateFile {
        backend.read_state().await.unwrap().unwrap()
    }

    fn find_entry<'a>(state: &'a StateFile, id: &ResourceId) -> Option<&'a ResourceState> {
        state.resources.iter().find(|r| &r.resource_id() == id)
    }

    #[tokio::test]
    async fn apply_records_identifier_and_updates_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("s.json"));
        let provider = MemoryProvider::default();
        let schemas = get_schemas();
        let id = ResourceId::new(CLIENT, "web");

        apply_locked(&backend, &provider, &declared("web", 30), &schemas)
            .await
            .unwrap();

        let state = recorded(&backend).await;
        let entry = find_entry(&state, &id).unwrap();
        assert_eq!(entry.identifier.as_deref(), Some("us-east-1_AbCdEf/client1"));
        assert_eq!(entry.attributes.get("id"), Some(&json!("client1")));

        apply_locked(&backend, &provider, &declared("web", 300), &schemas)
            .await
            .unwrap();

        let state = recorded(&backend).await;
        let entry = find_entry(&state, &id).unwrap();
        assert_eq!(entry.identifier.as_deref(), Some("us-east-1_AbCdEf/client1"));
        assert_eq!(entry.attributes.get("refresh_token_validity"), Some(&json!(300)));
        assert_eq!(state.serial, 2);
        assert_eq!(provider.client_count(), 1);
    }

    #[tokio::test]
    async fn destroy_removes_every_recorded_client() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("s.json"));
        let provider = MemoryProvider::default();
        apply_locked(&backend, &provider, &declared("web", 30), &get_schemas())
            .await
            .unwrap();

        destroy_locked(&backend, &provider, true).await.unwrap();

        assert!(recorded(&backend).await.resources.is_empty());
        assert_eq!(provider.client_count(), 0);
    }

    #[tokio::test]
    async fn failed_replace_keeps_old_identifier_until_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("s.json"));
        let provider = MemoryProvider::default();
        let schemas = get_schemas();
        let id = ResourceId::new(CLIENT, "web");
        apply_locked(&backend, &provider, &declared("web", 30), &schemas)
            .await
            .unwrap();

        provider.refuse_creates();
        let err = apply_locked(&backend, &provider, &declared("mobile", 30), &schemas)
            .await
            .unwrap_err();

        assert_eq!(err, "Apply failed. 0 succeeded, 1 failed.");
        let state = recorded(&backend).await;
        assert_eq!(
            find_entry(&state, &id).unwrap().identifier.as_deref(),
            Some("us-east-1_AbCdEf/client1")
        );
        assert_eq!(provider.client_count(), 0);

        refresh_locked(&backend, &provider).await.unwrap();
        assert!(find_entry(&recorded(&backend).await, &id).is_none());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn files_default_to_main_json_and_local_state() {
        let cli = Cli::try_parse_from(["userpool", "plan"]).unwrap();
        match cli.command {
            Commands::Plan { files } => {
                assert_eq!(files.file, PathBuf::from("main.json"));
                assert_eq!(files.state, PathBuf::from("userpool.state.json"));
            }
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn destroy_accepts_auto_approve_and_state() {
        let cli = Cli::try_parse_from([
            "userpool",
            "destroy",
            "clients.json",
            "--state",
            "prod.state.json",
            "--auto-approve",
        ])
        .unwrap();
        match cli.command {
            Commands::Destroy {
                files,
                auto_approve,
            } => {
                assert!(auto_approve);
                assert_eq!(files.file, PathBuf::from("clients.json"));
                assert_eq!(files.state, PathBuf::from("prod.state.json"));
            }
            _ => panic!("expected destroy"),
        }
    }

    #[test]
    fn force_unlock_takes_lock_id() {
        let cli = Cli::try_parse_from(["userpool", "force-unlock", "3f2a"]).unwrap();
        match cli.command {
            Commands::ForceUnlock { lock_id, state } => {
                assert_eq!(lock_id, "3f2a");
                assert_eq!(state, PathBuf::from("userpool.state.json"));
            }
            _ => panic!("expected force-unlock"),
        }
    }

    #[tokio::test]
    async fn force_unlock_removes_held_lock() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("s.json");
        let backend = LocalBackend::with_path(&state);
        let lock = backend.acquire_lock("apply").await.unwrap();

        assert!(run_force_unlock("nope", &state).await.is_err());
        run_force_unlock(&lock.id, &state).await.unwrap();
        assert!(!backend.lock_path().exists());
    }

    #[test]
    fn report_fails_when_anything_failed() {
        assert!(report("Apply", (2, 0)).is_ok());
        assert_eq!(
            report("Apply", (1, 1)).unwrap_err(),
            "Apply failed. 1 succeeded, 1 failed."
        );
    }

    #[test]
    fn schemas_cover_user_pool_client() {
        assert!(get_schemas().contains_key("cognito.user_pool_client"));
    }
}
