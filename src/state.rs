use std::sync::Arc;

use crate::{
    config::Config,
    db::{
        admin_store::AdminStore, pic_store::PicStore, proposal_store::ProposalStore,
        schedule_store::ScheduleStore, stakeholder_store::StakeholderStore, DbPool,
    },
    services::{AuthService, UploadStore},
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stakeholders: StakeholderStore,
    pub schedules: ScheduleStore,
    pub proposals: ProposalStore,
    pub pics: PicStore,
    pub auth: AuthService,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: Config, pool: DbPool) -> Self {
        let auth = AuthService::new(
            AdminStore::new(pool.clone()),
            config.jwt_secret.clone(),
            config.jwt_expiration_hours,
        );

        Self {
            stakeholders: StakeholderStore::new(pool.clone()),
            schedules: ScheduleStore::new(pool.clone()),
            proposals: ProposalStore::new(pool.clone()),
            pics: PicStore::new(pool),
            uploads: UploadStore::new(config.upload_dir.clone()),
            auth,
            config: Arc::new(config),
        }
    }
}
