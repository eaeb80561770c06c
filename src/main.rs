use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use resto_admin::dialog::{DeleteDialog, FormField, RestaurantDialog};
use resto_admin::mutation::{Notice, NoticeLevel, Notifier};
use resto_admin::web::{AppState, ServerConfig, build_router};
use resto_admin::{
    AdminClient, ClientConfig, HttpRestaurantsApi, MutationCoordinator, RestaurantCreate,
    RestaurantStore, RestaurantsApi,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "resto-admin")]
#[command(about = "Restaurant admin panel: REST backend and command-line client")]
struct Cli {
    /// Backend URL, e.g. http://localhost:8000/api/v1 (overrides RESTO_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides RESTO_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the REST backend
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Insert this many demo restaurants on startup
        #[arg(long, default_value_t = 0)]
        seed: usize,
    },
    /// Print one page of the restaurants table
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        revo: RevoArgs,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        revo: RevoArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(clap::Args)]
struct RevoArgs {
    #[arg(long)]
    revo_tenant: Option<String>,
    #[arg(long)]
    revo_client_key: Option<String>,
    #[arg(long)]
    revo_api_key: Option<String>,
}

impl RevoArgs {
    fn apply(self, dialog: &mut RestaurantDialog) {
        let fields = [
            (FormField::RevoTenant, self.revo_tenant),
            (FormField::RevoClientKey, self.revo_client_key),
            (FormField::RevoApiKey, self.revo_api_key),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                dialog.set_field(field, value);
            }
        }
    }
}

/// Prints notices the way a toast would show them.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("{} {}", notice.title, notice.message),
            NoticeLevel::Error => eprintln!("{} {}", notice.title, notice.message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port, seed } => serve(host, port, seed).await,
        command => {
            let config = client_config(cli.api_url.as_deref(), cli.token)?;
            run_client(config, command).await
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("resto_admin=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn client_config(api_url: Option<&str>, token: Option<String>) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env_with_url(api_url).map_err(|e| anyhow!(e))?;

    if let Some(token) = token {
        config.token = Some(token);
    }

    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}

async fn serve(host: Option<String>, port: Option<u16>, seed: usize) -> Result<()> {
    let mut config = ServerConfig::from_env().context("failed to load server configuration")?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let store = RestaurantStore::new();
    for n in 1..=seed {
        store
            .create(RestaurantCreate::new(format!("Restaurant {n}")))
            .await
            .context("failed to seed demo restaurants")?;
    }

    let app = build_router(AppState::new(store));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, seeded = seed, "restaurant backend started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn run_client(config: ClientConfig, command: Command) -> Result<()> {
    let page_size = config.page_size;
    let capacity = config.cache_capacity;
    let api: Arc<dyn RestaurantsApi> =
        Arc::new(HttpRestaurantsApi::new(config).context("invalid client configuration")?);
    let client = AdminClient::with_api(api.clone(), page_size, capacity);
    let coordinator = MutationCoordinator::new(client.cache().clone(), Arc::new(ConsoleNotifier));

    match command {
        Command::List {
            page,
            page_size: size,
        } => {
            let client = match size {
                Some(size) => AdminClient::with_api(api, size, capacity),
                None => client,
            };
            let mut table = client.table();
            table.load().await.context("failed to load restaurants")?;
            if page > 1 {
                table
                    .set_page(page)
                    .await
                    .with_context(|| format!("failed to load page {page}"))?;
            }
            print!("{}", table.render());
        }
        Command::Show { id } => {
            let restaurant = api
                .get(&id)
                .await
                .with_context(|| format!("failed to load restaurant {id}"))?;
            println!("{}", serde_json::to_string_pretty(&restaurant)?);
        }
        Command::Create { name, revo } => {
            let mut dialog = RestaurantDialog::create();
            dialog.open();
            dialog.set_field(FormField::Name, name);
            revo.apply(&mut dialog);

            let restaurant = dialog.submit(&coordinator).await?;
            println!("{}", restaurant.id);
        }
        Command::Update { id, name, revo } => {
            let current = api
                .get(&id)
                .await
                .with_context(|| format!("failed to load restaurant {id}"))?;
            let mut dialog = RestaurantDialog::edit(&current);
            dialog.open();
            if let Some(name) = name {
                dialog.set_field(FormField::Name, name);
            }
            revo.apply(&mut dialog);

            dialog.submit(&coordinator).await?;
        }
        Command::Delete { id } => {
            let mut dialog = DeleteDialog::new(id);
            dialog.open();
            dialog.confirm(&coordinator).await?;
        }
        Command::Serve { .. } => return Err(anyhow!("serve does not talk to a backend")),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
