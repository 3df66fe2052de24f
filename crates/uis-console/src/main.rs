//! CLI console for the UIS client core.
//!
//! Stands in for the dashboard's view layer: every data subcommand is one
//! protected view backed by a query binding, gated by the route guard the
//! same way the dashboard gates navigation.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing_subscriber::{fmt, EnvFilter};

use uis_chat::{ChatClient, ChatConfig, ChatMessage, DataContext};
use uis_core::ApiConfig;
use uis_gateway::operations::{
    self, AppointmentsData, CommandCenterData, DashboardData, DashboardStatsData, PatientData,
    PatientsData, ProvidersData, TodaysAppointmentsData,
};
use uis_gateway::{GatewayClient, GatewayConfig, Operation, QueryBinding, QueryCache};
use uis_session::{evaluate, DemoExchange, FileVault, RouteDecision, SessionStore};

type Store = SessionStore<FileVault, DemoExchange>;

#[derive(Parser)]
#[command(name = "uis")]
#[command(about = "Console for the UIS practice dashboard")]
struct Cli {
    /// Config file prefix (default: uis, i.e. uis.toml).
    #[arg(short, long, default_value = "uis")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the persisted session.
    Logout,
    /// Show the current signed-in identity.
    Whoami,
    /// List patients.
    Patients {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// One patient's full record.
    Patient {
        id: String,
    },
    /// Full schedule with providers.
    Appointments,
    /// Today's appointments.
    Today,
    /// Provider roster.
    Providers,
    /// Practice analytics stats.
    Stats,
    /// Dashboard overview: stats, revenue trend, today's schedule.
    Dashboard,
    /// AI predictions command center.
    Predictions,
    /// Ask the Dentamind assistant.
    Chat {
        question: String,
        /// Attach current practice stats as data context.
        #[arg(long)]
        with_stats: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let config = ApiConfig::load(&cli.config)?;

    let vault = FileVault::new(&config.state_dir)?;
    let store = Arc::new(Store::new(vault, DemoExchange));
    // Restore must finish before any guard evaluation.
    store.restore();

    match cli.command {
        Command::Login { email, password } => {
            let session = store.login(&email, &password).await?;
            println!(
                "Signed in as {} ({})",
                session.profile.email, session.profile.practice_name
            );
        }
        Command::Logout => {
            store.logout();
            println!("Signed out.");
        }
        Command::Whoami => match store.current() {
            Some(session) => println!(
                "{} — {} [{}]",
                session.profile.email,
                session.profile.practice_name,
                session.profile.roles.join(", ")
            ),
            None => println!("Not signed in."),
        },
        Command::Patients {
            search,
            status,
            limit,
            offset,
        } => {
            let ctx = GatewayContext::new(&config, &store)?;
            let vars =
                operations::patients_variables(search.as_deref(), status.as_deref(), limit, offset);
            ctx.run::<PatientsData>(&operations::GET_PATIENTS, vars, |data| {
                for p in &data.patients {
                    println!(
                        "{:<24} {:<12} balance {:>10}",
                        format!("{} {}", p.first_name, p.last_name),
                        p.status.as_deref().unwrap_or("-"),
                        p.balance.map_or_else(|| "-".to_string(), |b| format!("{b:.2}")),
                    );
                }
                println!("{} patients", data.patients.len());
            })
            .await?;
        }
        Command::Patient { id } => {
            let ctx = GatewayContext::new(&config, &store)?;
            let vars = operations::patient_variables(&id);
            ctx.run::<PatientData>(&operations::GET_PATIENT, vars, |data| match &data.patient {
                Some(p) => {
                    println!("{} {} ({})", p.first_name, p.last_name, p.patient_id);
                    if let Some(email) = &p.email {
                        println!("email: {email}");
                    }
                    if let Some(balance) = p.balance {
                        println!("balance: {balance:.2}");
                    }
                    println!(
                        "{} appointments, {} procedures, {} insurance plans",
                        p.appointments.len(),
                        p.procedures.len(),
                        p.insurance_plans.len()
                    );
                }
                None => println!("No patient with that id."),
            })
            .await?;
        }
        Command::Appointments => {
            let ctx = GatewayContext::new(&config, &store)?;
            ctx.run::<AppointmentsData>(&operations::GET_APPOINTMENTS, json!({}), |data| {
                for a in &data.appointments.data {
                    let patient = a
                        .patient
                        .as_ref()
                        .map_or("-".to_string(), |p| format!("{} {}", p.first_name, p.last_name));
                    println!(
                        "{:<20} {:<24} {}",
                        a.date_time,
                        patient,
                        a.status.as_deref().unwrap_or("-")
                    );
                }
                println!(
                    "{} appointments, {} providers",
                    data.appointments.data.len(),
                    data.providers.len()
                );
            })
            .await?;
        }
        Command::Today => {
            let ctx = GatewayContext::new(&config, &store)?;
            ctx.run::<TodaysAppointmentsData>(
                &operations::GET_TODAYS_APPOINTMENTS,
                json!({}),
                |data| {
                    for a in &data.todays_appointments {
                        println!(
                            "{:<8} {:<24} {:<12} {}",
                            a.time.as_deref().unwrap_or("-"),
                            a.patient_name,
                            a.kind.as_deref().unwrap_or("-"),
                            a.status.as_deref().unwrap_or("-")
                        );
                    }
                },
            )
            .await?;
        }
        Command::Providers => {
            let ctx = GatewayContext::new(&config, &store)?;
            ctx.run::<ProvidersData>(&operations::GET_PROVIDERS, json!({}), |data| {
                for p in &data.providers {
                    println!(
                        "{:<24} {:<16} {}",
                        format!("{} {}", p.first_name, p.last_name),
                        p.provider_type.as_deref().unwrap_or("-"),
                        if p.is_active.unwrap_or(true) { "active" } else { "inactive" }
                    );
                }
            })
            .await?;
        }
        Command::Stats => {
            let ctx = GatewayContext::new(&config, &store)?;
            ctx.run::<DashboardStatsData>(&operations::DASHBOARD_STATS, json!({}), |data| {
                let stats = &data.analytics_stats;
                println!(
                    "active patients: {}",
                    stats.active_patients.map_or("-".to_string(), |v| v.to_string())
                );
                println!(
                    "total appointments: {}",
                    stats.total_appointments.map_or("-".to_string(), |v| v.to_string())
                );
                println!(
                    "total revenue: {}",
                    stats.total_revenue.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
                );
            })
            .await?;
        }
        Command::Dashboard => {
            let ctx = GatewayContext::new(&config, &store)?;
            ctx.run::<DashboardData>(&operations::GET_DASHBOARD_DATA, json!({}), |data| {
                let stats = &data.analytics_stats;
                println!(
                    "revenue {} | active patients {} | no-show rate {}",
                    stats.total_revenue.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")),
                    stats.active_patients.map_or("-".to_string(), |v| v.to_string()),
                    stats.no_show_rate.map_or_else(|| "-".to_string(), |v| format!("{v:.1}%"))
                );
                for m in &data.revenue_metrics {
                    println!(
                        "{}: production {} collections {}",
                        m.date,
                        m.production.map_or_else(|| "-".to_string(), |v| format!("{v:.0}")),
                        m.collections.map_or_else(|| "-".to_string(), |v| format!("{v:.0}"))
                    );
                }
                println!("{} appointments today", data.todays_appointments.len());
            })
            .await?;
        }
        Command::Predictions => {
            let ctx = GatewayContext::new(&config, &store)?;
            ctx.run::<CommandCenterData>(&operations::GET_COMMAND_CENTER, json!({}), |data| {
                let summary = &data.ai_predictions_summary;
                println!(
                    "high-risk appointments: {}",
                    summary.high_risk_appointments.map_or("-".to_string(), |v| v.to_string())
                );
                println!("no-show risks: {}", data.noshow_risks.len());
                println!("churn risks: {}", data.churn_risks.len());
                for f in &data.revenue_forecast {
                    println!(
                        "forecast {}: {}",
                        f.forecast_month,
                        f.forecast_production
                            .map_or_else(|| "-".to_string(), |v| format!("{v:.0}"))
                    );
                }
            })
            .await?;
        }
        Command::Chat {
            question,
            with_stats,
        } => {
            ensure_authenticated(&store)?;

            let context = if with_stats {
                fetch_stats_context(&config, &store).await
            } else {
                None
            };

            let chat = ChatClient::new(ChatConfig {
                url: config.chat_url.clone(),
                model: config.chat_model.clone(),
                max_tokens: config.chat_max_tokens,
                request_timeout: Duration::from_secs(config.request_timeout_secs),
            })?;

            let transcript = vec![ChatMessage::user(question)];
            let reply = chat.ask(&transcript, context.as_ref()).await;
            println!("{reply}");
        }
    }

    Ok(())
}

/// Gateway client + cache for one protected command.
struct GatewayContext {
    client: GatewayClient,
    cache: QueryCache,
}

impl GatewayContext {
    fn new(config: &ApiConfig, store: &Arc<Store>) -> anyhow::Result<Self> {
        ensure_authenticated(store)?;
        let client = GatewayClient::new(
            GatewayConfig {
                url: config.graphql_url.clone(),
                request_timeout: Duration::from_secs(config.request_timeout_secs),
            },
            store.clone(),
        )?;
        Ok(Self {
            client,
            cache: QueryCache::new(),
        })
    }

    /// One view's round: bind, fetch, render whatever data is available,
    /// and surface any error without discarding that data.
    async fn run<T: DeserializeOwned>(
        &self,
        operation: &'static Operation,
        variables: Value,
        render: impl Fn(&T),
    ) -> anyhow::Result<()> {
        let binding = QueryBinding::new(operation, variables);
        let view = binding.fetch(&self.client, &self.cache).await;

        if let Some(data) = view.data {
            let typed: T = operations::decode(operation, data)?;
            render(&typed);
        }
        if let Some(error) = view.error {
            anyhow::bail!("{operation_name} failed: {error}", operation_name = operation.name);
        }
        Ok(())
    }
}

/// The route guard, applied to a protected command instead of a view tree.
fn ensure_authenticated(store: &Arc<Store>) -> anyhow::Result<()> {
    match evaluate(store.is_loading(), store.is_authenticated()) {
        RouteDecision::RenderProtected => Ok(()),
        RouteDecision::RedirectToLogin => {
            anyhow::bail!("Not signed in — run `uis login` first")
        }
        RouteDecision::Waiting => anyhow::bail!("Session restore still in progress"),
    }
}

/// Best-effort stats context for the assistant; a failed fetch just means
/// the question goes out without data.
async fn fetch_stats_context(config: &ApiConfig, store: &Arc<Store>) -> Option<DataContext> {
    let client = GatewayClient::new(
        GatewayConfig {
            url: config.graphql_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        },
        store.clone(),
    )
    .ok()?;

    let op = &operations::DASHBOARD_STATS;
    match client.execute(op.name, op.document, &json!({})).await {
        Ok(data) => Some(DataContext {
            title: "Current practice stats".to_string(),
            payload: data,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Stats context unavailable, sending question without it");
            None
        }
    }
}
