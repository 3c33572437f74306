use airline_db::{
    cli::{Cli, Commands},
    config::resolve_db_path,
    parser::{parse_assignment, parse_filter, parse_rows},
    query::Statistic,
    ui::Console,
    AirlineDb,
};
use anyhow::{Context, Result};
use std::io::Stdout;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level())).init();

    let mut console = Console::stdout(cli.json);
    match run(cli, &mut console) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            console.error(format!("{:#}", err)).ok();
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, console: &mut Console<Stdout>) -> Result<()> {
    let db_path = resolve_db_path(cli.db)?;
    let mut db = AirlineDb::open(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;

    match cli.command {
        Commands::Insert { table, rows } => {
            let rows: Vec<_> = rows.iter().flat_map(|r| parse_rows(r)).collect();
            let inserted = db
                .insert_entity(&table, &rows)
                .with_context(|| format!("Insert into {} failed", table))?;
            console.status(format!("Inserted {} row(s) into {}", inserted, table))?;
        }

        Commands::Update {
            table,
            pk,
            assignments,
        } => {
            let assignments = assignments
                .iter()
                .map(|a| parse_assignment(a))
                .collect::<Result<Vec<_>, _>>()?;
            db.update_entity(&table, &pk, &assignments)
                .with_context(|| format!("Update of {} {} failed", table, pk))?;
            console.status(format!("Updated {} {}", table, pk))?;
        }

        Commands::Delete { table, pk } => {
            db.delete_entity(&table, &pk)
                .with_context(|| format!("Delete of {} {} failed", table, pk))?;
            console.status(format!("Deleted {} {}. Remaining rows:", table, pk))?;
            console.table(&db.query_entity(&table, &[])?)?;
        }

        Commands::Query { source, filters } => {
            let filters = filters
                .iter()
                .map(|f| parse_filter(f))
                .collect::<Result<Vec<_>, _>>()?;
            let result = db
                .query_entity(&source, &filters)
                .with_context(|| format!("Query on {} failed", source))?;
            console.table(&result)?;
        }

        Commands::Stat { number } => {
            let statistic = Statistic::from_number(number)
                .with_context(|| format!("No statistic numbered {}", number))?;
            console.status(statistic.to_string())?;
            console.table(&db.statistic(statistic)?)?;
        }

        Commands::Tables => {
            console.schema(db.catalog().tables())?;
        }
    }

    Ok(())
}
