use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vgate::{
    Destination, Error, KeyspaceIdResolver, KeyspaceIdType, KeyspaceInfo, Result,
    ShardingColumnResolver, TableDefinition, TargetedSchema, UpdateStatement, VSchemaConfig,
    Value, VindexResolver, build_update_plan,
};

fn main() {
    // Initialize tracing subscriber to respect RUST_LOG environment variable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        tracing::debug!("vgate command failed: {err:?}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

#[derive(Parser)]
#[command(
    name = "vgate",
    about = "Explain sharded UPDATE plans and resolve keyspace ids"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan an UPDATE statement and print the resulting route.
    PlanUpdate(PlanUpdateArgs),
    /// Compute the keyspace id of a single row.
    KeyspaceId(KeyspaceIdArgs),
}

#[derive(Args)]
struct PlanUpdateArgs {
    /// JSON vschema document.
    #[arg(long, value_name = "FILE")]
    vschema: PathBuf,
    /// Session keyspace used for unqualified table names.
    #[arg(long, value_name = "KS")]
    keyspace: Option<String>,
    /// Pin the session to one shard of the keyspace.
    #[arg(long, value_name = "SHARD", requires = "keyspace")]
    shard: Option<String>,
    /// The UPDATE statement.
    sql: String,
}

#[derive(Args)]
struct KeyspaceIdArgs {
    /// JSON vschema document; selects the vindex resolver.
    #[arg(long, value_name = "FILE", required_unless_present = "sharding_column")]
    vschema: Option<PathBuf>,
    #[arg(long, value_name = "KS")]
    keyspace: String,
    #[arg(long, value_name = "TABLE")]
    table: String,
    /// Column names in row order.
    #[arg(long, value_delimiter = ',', required = true)]
    columns: Vec<String>,
    /// Row values in column order. Integers are typed as integers, anything
    /// else as a string.
    #[arg(long, value_delimiter = ',', required = true)]
    row: Vec<String>,
    /// Keyspace-wide sharding column; selects the sharding column resolver.
    #[arg(long, value_name = "COLUMN", conflicts_with = "vschema", requires = "sharding_column_type")]
    sharding_column: Option<String>,
    #[arg(long, value_enum)]
    sharding_column_type: Option<ShardingColumnType>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShardingColumnType {
    Uint64,
    Bytes,
}

impl From<ShardingColumnType> for KeyspaceIdType {
    fn from(value: ShardingColumnType) -> Self {
        match value {
            ShardingColumnType::Uint64 => KeyspaceIdType::Uint64,
            ShardingColumnType::Bytes => KeyspaceIdType::Bytes,
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::PlanUpdate(args) => run_plan_update(args),
        Command::KeyspaceId(args) => run_keyspace_id(args),
    }
}

fn run_plan_update(args: PlanUpdateArgs) -> Result<()> {
    let vschema = VSchemaConfig::load(&args.vschema)?.build()?;
    let update = UpdateStatement::parse(&args.sql)?;
    let plan = match args.keyspace {
        Some(keyspace) => {
            let mut targeted = TargetedSchema::new(&vschema, keyspace);
            if let Some(shard) = args.shard {
                targeted = targeted.with_destination(Destination::Shard(shard));
            }
            build_update_plan(&update, &targeted)?
        }
        None => build_update_plan(&update, &vschema)?,
    };
    println!("{plan}");
    Ok(())
}

fn run_keyspace_id(args: KeyspaceIdArgs) -> Result<()> {
    if args.columns.len() != args.row.len() {
        return Err(Error::InvalidArgumentError(format!(
            "{} columns but {} row values",
            args.columns.len(),
            args.row.len()
        )));
    }
    let row: Vec<Value> = args.row.iter().map(|v| parse_row_value(v)).collect();

    let resolver: Arc<dyn KeyspaceIdResolver> = match (&args.vschema, &args.sharding_column) {
        (_, Some(column)) => {
            let column_type = args
                .sharding_column_type
                .map(KeyspaceIdType::from)
                .unwrap_or_default();
            let keyspace = KeyspaceInfo::new(&args.keyspace, column, column_type);
            let definition = TableDefinition::new(&args.table, args.columns.clone());
            Arc::new(ShardingColumnResolver::new(&keyspace, &definition)?)
        }
        (Some(path), None) => {
            let vschema = VSchemaConfig::load(path)?.build()?;
            let keyspace = vschema.keyspace(&args.keyspace).ok_or_else(|| {
                Error::CatalogError(format!("keyspace {} not found in vschema", args.keyspace))
            })?;
            Arc::new(VindexResolver::from_column_list(
                keyspace,
                &args.table,
                &args.columns,
            )?)
        }
        (None, None) => {
            return Err(Error::InvalidArgumentError(
                "either --vschema or --sharding-column is required".into(),
            ));
        }
    };

    let ksid = resolver.keyspace_id(&row)?;
    println!("{ksid}");
    Ok(())
}

fn parse_row_value(text: &str) -> Value {
    Value::integral(text).unwrap_or_else(|_| Value::varchar(text))
}
