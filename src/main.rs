use std::sync::Arc;

use anyhow::Context;

use district_records::audit::FileAuditSink;
use district_records::auth::AuthService;
use district_records::classrooms::ClassroomService;
use district_records::config::AppConfig;
use district_records::db::Database;
use district_records::districts::DistrictDirectory;
use district_records::files::LocalFileStore;
use district_records::gateway::{self, state::AppState};
use district_records::logging::init_logging;
use district_records::records::RecordsService;
use district_records::students::StudentDirectory;
use district_records::transfer::{TransferDb, TransferWorkflow};

/// `--env <name>` / `-e <name>` selects `config/<name>.yaml`, default "dev".
fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env).with_context(|| format!("loading config for {}", env))?;
    let _log_guard = init_logging(&config);

    tracing::info!("Starting district records portal in {} mode", env);

    let db = Database::connect(&config.database)
        .await
        .context("connecting to Postgres")?;
    db.ensure_schema().await.context("bootstrapping schema")?;
    let pool = db.pool().clone();

    let audit = Arc::new(
        FileAuditSink::new(&config.audit.log_dir, &config.audit.audit_file)
            .context("opening audit log")?,
    );
    let files = Arc::new(
        LocalFileStore::new(&config.storage.upload_dir).context("preparing upload storage")?,
    );

    let auth = Arc::new(AuthService::new(
        pool.clone(),
        config.auth.clone(),
        audit.clone(),
    ));
    let transfers = Arc::new(TransferWorkflow::new(
        Arc::new(TransferDb::new(pool.clone())),
        files.clone(),
        audit.clone(),
    ));
    let students = Arc::new(StudentDirectory::new(pool.clone()));
    let records = Arc::new(RecordsService::new(
        pool.clone(),
        files.clone(),
        audit.clone(),
    ));
    let classrooms = Arc::new(ClassroomService::new(pool.clone()));
    let districts = Arc::new(DistrictDirectory::new(pool));

    let state = Arc::new(AppState::new(
        db,
        auth,
        transfers,
        students,
        records,
        classrooms,
        districts,
        config.storage.max_upload_bytes,
    ));

    gateway::serve(state, &config.gateway.host, config.gateway.port).await
}
