mod display;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use senado_store::{TrackedItem, WatchlistStore};
use senado_sync::{ClientConfig, DEFAULT_BASE_URL, Notifier, SearchFilters, SenadoClient};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "senado", version, about = "Query Senate bills and keep a local watchlist")]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the open data service.
    #[arg(long, env = "SENADO_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "SENADO_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout: u64,

    /// Watchlist file.
    #[arg(long, env = "SENADO_WATCHLIST", default_value = "watchlist.json", global = true)]
    watchlist: PathBuf,

    /// Log to stderr (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search bills by filters.
    Search {
        /// Bill-type code, e.g. PL, PEC, PLS.
        #[arg(long)]
        sigla: Option<String>,
        #[arg(long)]
        ano: Option<i32>,
        /// Free text matched against summary and subjects.
        #[arg(long)]
        palavra_chave: Option<String>,
        #[arg(long)]
        codigo_situacao: Option<String>,
        /// Only bills still in progress (S/N).
        #[arg(long, value_parser = parse_flag)]
        tramitando: Option<bool>,
        /// Current-status indicator (S/N).
        #[arg(long, value_parser = parse_flag)]
        situacao_atual: Option<bool>,
        /// Add every result to the watchlist.
        #[arg(long)]
        track: bool,
    },

    /// Show the current status of one bill.
    Status { codigo: String },

    /// List recently updated bills.
    Updated,

    /// Manage the local watchlist.
    Watch {
        #[command(subcommand)]
        action: WatchCommand,
    },
}

#[derive(Subcommand, Debug)]
enum WatchCommand {
    /// List tracked bills.
    List,
    /// Start tracking a bill.
    Add {
        codigo: String,
        #[arg(long)]
        nota: Option<String>,
    },
    /// Stop tracking a bill.
    Remove { codigo: String },
    /// Look up every tracked bill and record status changes.
    Refresh,
    /// Show the change log, optionally for one bill.
    History { codigo: Option<String> },
}

fn parse_flag(s: &str) -> Result<bool, String> {
    match s.trim().to_uppercase().as_str() {
        "S" | "SIM" | "Y" | "YES" | "TRUE" => Ok(true),
        "N" | "NAO" | "NÃO" | "NO" | "FALSE" => Ok(false),
        other => Err(format!("expected S or N, got {other:?}")),
    }
}

/// Prints fetch failures for the user.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("senado v{}", env!("CARGO_PKG_VERSION"));

    let client = SenadoClient::new(ClientConfig {
        base_url: cli.base_url,
        timeout: Duration::from_secs(cli.timeout),
    })?
    .with_notifier(Arc::new(StderrNotifier));
    let store = WatchlistStore::new(cli.watchlist);

    match cli.command {
        Command::Search {
            sigla,
            ano,
            palavra_chave,
            codigo_situacao,
            tramitando,
            situacao_atual,
            track,
        } => {
            let filters = SearchFilters {
                sigla,
                ano,
                palavra_chave,
                codigo_situacao,
                tramitando,
                indicador_situacao_atual: situacao_atual,
            };
            if track {
                let rows = senado_sync::buscar_materias(&client, &filters).await;
                display::print_table(&senado_core::senado::materias_batch(&rows)?)?;
                let added = store.update(|wl| {
                    rows.iter()
                        .filter(|m| !m.codigo.is_empty())
                        .filter(|m| wl.track(&m.codigo, TrackedItem::from_materia(m)))
                        .count()
                })?;
                println!("tracking {added} new bill(s)");
            } else {
                let batch = senado_sync::pesquisar_materias(&client, &filters).await;
                display::print_table(&batch)?;
            }
        }
        Command::Status { codigo } => match senado_sync::situacao_atual(&client, &codigo).await {
            Some(status) => display::print_status_card(&status),
            None => println!("no status available for {codigo}"),
        },
        Command::Updated => {
            let batch = senado_sync::materias_atualizadas(&client).await;
            display::print_table(&batch)?;
        }
        Command::Watch { action } => run_watch(action, &client, &store).await?,
    }

    Ok(())
}

async fn run_watch(
    action: WatchCommand,
    client: &SenadoClient,
    store: &WatchlistStore,
) -> anyhow::Result<()> {
    match action {
        WatchCommand::List => display::print_watchlist(&store.load()),
        WatchCommand::Add { codigo, nota } => {
            let codigo = codigo.trim().to_string();
            let mut watchlist = store.load();
            if watchlist.is_tracked(&codigo) {
                println!("{codigo} is already tracked");
                return Ok(());
            }
            let mut item = TrackedItem::default().with_nota(nota);
            if let Some(status) = senado_sync::situacao_atual(client, &codigo).await
                && !status.descricao.is_empty()
            {
                item.ultima_situacao = Some(status.descricao);
            }
            watchlist.track(&codigo, item);
            store.save(&watchlist)?;
            println!("tracking {codigo}");
        }
        WatchCommand::Remove { codigo } => {
            match store.update(|wl| wl.untrack(codigo.trim()))? {
                Some(_) => println!("stopped tracking {codigo}"),
                None => println!("{codigo} was not tracked"),
            }
        }
        WatchCommand::Refresh => {
            let mut watchlist = store.load();
            let changed = senado_sync::refresh_watchlist(client, &mut watchlist).await;
            store.save(&watchlist)?;
            println!(
                "checked {} bill(s), {changed} status change(s)",
                watchlist.itens.len()
            );
        }
        WatchCommand::History { codigo } => {
            let watchlist = store.load();
            match codigo {
                Some(codigo) => display::print_history(watchlist.history_of(&codigo)),
                None => display::print_history(watchlist.historico.iter()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_flag_accepts_s_and_n() {
        assert_eq!(parse_flag("S"), Ok(true));
        assert_eq!(parse_flag("n"), Ok(false));
        assert!(parse_flag("talvez").is_err());
    }

    #[test]
    fn search_args_map_to_filters() {
        let cli = Cli::try_parse_from([
            "senado",
            "search",
            "--sigla",
            "PL",
            "--ano",
            "2025",
            "--tramitando",
            "S",
        ])
        .unwrap();
        match cli.command {
            Command::Search {
                sigla,
                ano,
                tramitando,
                situacao_atual,
                track,
                ..
            } => {
                assert_eq!(sigla.as_deref(), Some("PL"));
                assert_eq!(ano, Some(2025));
                assert_eq!(tramitando, Some(true));
                assert_eq!(situacao_atual, None);
                assert!(!track);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_watchlist_path_after_subcommand() {
        let cli =
            Cli::try_parse_from(["senado", "watch", "list", "--watchlist", "/tmp/w.json"]).unwrap();
        assert_eq!(cli.watchlist, PathBuf::from("/tmp/w.json"));
        assert!(matches!(
            cli.command,
            Command::Watch {
                action: WatchCommand::List
            }
        ));
    }
}
