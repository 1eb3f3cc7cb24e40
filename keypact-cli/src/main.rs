use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use keypact_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use keypact_core::{
    ActivationSigner, Address, Config, ContextId, EventLog, MemoryStore, RecoverableSignature,
    RecoveryRegistry,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "keypact")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// Data directory for registry state and keys
    #[arg(long)]
    data_dir: Option<String>,

    /// Execution context id: 64 hex chars, or a label to derive one from
    #[arg(long)]
    context: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a local signing keypair and print its address
    Keygen {
        /// Name the key is stored under
        #[arg(long)]
        name: String,
    },
    /// Register an identity with a main and backup key
    Register {
        /// Acting identity address
        #[arg(long = "as")]
        caller: Address,
        /// Primary credential address
        #[arg(long)]
        main: Address,
        /// Standby credential address
        #[arg(long)]
        backup: Address,
    },
    /// Bind two registered identities as mutual recovery partners
    Bind {
        /// Acting identity address
        #[arg(long = "as")]
        caller: Address,
        /// Partner identity address
        #[arg(long)]
        partner: Address,
    },
    /// Replace the acting identity's backup key
    UpdateBackup {
        /// Acting identity address
        #[arg(long = "as")]
        caller: Address,
        /// New standby credential address
        #[arg(long)]
        backup: Address,
    },
    /// Produce an activation signature with a stored key
    Sign {
        /// Stored key name (see keygen)
        #[arg(long)]
        key: String,
        /// Target identity whose backup key is being activated
        #[arg(long)]
        target: Address,
    },
    /// Activate the target's backup key with a partner signature
    Activate {
        /// Acting identity address (the target's bound partner)
        #[arg(long = "as")]
        caller: Address,
        /// Target identity address
        #[arg(long)]
        target: Address,
        /// 65-byte activation signature, hex encoded
        #[arg(long)]
        signature: String,
    },
    /// Show the record stored for an address
    Details {
        /// Identity address
        #[arg(long)]
        address: Address,
    },
    /// Dump the recovery event log
    Events,
}

/// Registry state as persisted between invocations
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryState {
    store: MemoryStore,
    events: EventLog,
}

/// A locally stored signing key
#[derive(Debug, Serialize, Deserialize)]
struct StoredKey {
    name: String,
    address: Address,
    secret: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = LogLevel::from_str(&args.log_level).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', using 'info'", args.log_level);
        LogLevel::Info
    });
    let log_config = LogConfig::new(log_level).json_format(args.json_logs);
    init_logging_with_config(log_config)?;

    let config = Config::from_env()?;
    let context = resolve_context(args.context.as_deref(), &config);
    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &config);
    let state_path = data_dir.join("state.json");
    let keys_dir = data_dir.join("keys");

    match args.command {
        Command::Keygen { name } => {
            let signer = ActivationSigner::generate();
            let key = StoredKey {
                name: name.clone(),
                address: signer.address(),
                secret: hex::encode(signer.secret_bytes()),
            };
            save_key(&keys_dir, &key)?;
            info!(name = %name, address = %key.address, "generated signing key");
            println!("{}", key.address);
        }
        Command::Register {
            caller,
            main,
            backup,
        } => {
            with_registry(&state_path, context, |registry| {
                registry.register(caller, main, backup)
            })?;
            println!("registered {}", caller);
        }
        Command::Bind { caller, partner } => {
            with_registry(&state_path, context, |registry| {
                registry.bind_partner(caller, partner)
            })?;
            println!("bound {} <-> {}", caller, partner);
        }
        Command::UpdateBackup { caller, backup } => {
            with_registry(&state_path, context, |registry| {
                registry.update_backup_key(caller, backup)
            })?;
            println!("updated backup key for {}", caller);
        }
        Command::Sign { key, target } => {
            let stored = load_key(&keys_dir, &key)?;
            let secret = hex::decode(&stored.secret)
                .with_context(|| format!("decoding secret for key '{}'", key))?;
            let signer = ActivationSigner::from_secret_bytes(&secret)?;
            let signature = signer.sign_activation(&target, &context)?;
            println!("{}", signature);
        }
        Command::Activate {
            caller,
            target,
            signature,
        } => {
            let signature = RecoverableSignature::from_hex(&signature)?;
            with_registry(&state_path, context, |registry| {
                registry.activate(caller, target, &signature)
            })?;
            println!("activated backup key for {}", target);
        }
        Command::Details { address } => {
            let state = load_state(&state_path)?;
            let registry = RecoveryRegistry::from_parts(state.store, state.events, context);
            let details = registry.get_details(&address);
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        Command::Events => {
            let state = load_state(&state_path)?;
            for event in state.events.events() {
                println!("{}", serde_json::to_string(event)?);
            }
        }
    }

    Ok(())
}

/// Run one mutating registry operation against the persisted state,
/// writing the state back only when the operation succeeds
fn with_registry<F>(state_path: &Path, context: ContextId, op: F) -> Result<()>
where
    F: FnOnce(&mut RecoveryRegistry) -> keypact_core::RecoveryResult<()>,
{
    let state = load_state(state_path)?;
    let mut registry = RecoveryRegistry::from_parts(state.store, state.events, context);
    op(&mut registry)?;
    let (store, events) = registry.into_parts();
    save_state(state_path, &RegistryState { store, events })
}

fn resolve_context(flag: Option<&str>, config: &Config) -> ContextId {
    match flag {
        // hex is taken literally; anything else is treated as a label
        Some(raw) => {
            ContextId::from_hex(raw).unwrap_or_else(|_| ContextId::derive(raw.as_bytes()))
        }
        None => config.context.context_id,
    }
}

fn resolve_data_dir(flag: Option<&str>, config: &Config) -> PathBuf {
    match flag {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
        None => config.state.data_dir.clone(),
    }
}

fn load_state(path: &Path) -> Result<RegistryState> {
    if !path.exists() {
        return Ok(RegistryState::default());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn save_state(path: &Path, state: &RegistryState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, serde_json::to_string_pretty(state)?)
        .with_context(|| format!("writing {}", path.display()))
}

fn save_key(keys_dir: &Path, key: &StoredKey) -> Result<()> {
    fs::create_dir_all(keys_dir)
        .with_context(|| format!("creating {}", keys_dir.display()))?;
    let path = keys_dir.join(format!("{}.json", key.name));
    fs::write(&path, serde_json::to_string_pretty(key)?)
        .with_context(|| format!("writing {}", path.display()))
}

fn load_key(keys_dir: &Path, name: &str) -> Result<StoredKey> {
    let path = keys_dir.join(format!("{}.json", name));
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("no stored key '{}' at {}", name, path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
