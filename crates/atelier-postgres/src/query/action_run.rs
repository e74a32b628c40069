//! Action run log repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::Pagination;
use crate::model::{ActionRun, NewActionRun};
use crate::{PgConnection, PgError, PgResult, schema};

/// Append-only access to `action_runs`.
pub trait ActionRunRepository {
    /// Appends a run to the log.
    fn create_action_run(
        &mut self,
        new_run: NewActionRun,
    ) -> impl Future<Output = PgResult<ActionRun>> + Send;

    /// Lists runs of one action, most recent first.
    fn list_action_runs(
        &mut self,
        action_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<ActionRun>>> + Send;
}

impl ActionRunRepository for PgConnection {
    async fn create_action_run(&mut self, new_run: NewActionRun) -> PgResult<ActionRun> {
        use schema::action_runs;

        let run = diesel::insert_into(action_runs::table)
            .values(&new_run)
            .returning(ActionRun::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(run)
    }

    async fn list_action_runs(
        &mut self,
        run_action_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<ActionRun>> {
        use schema::action_runs::dsl::*;

        let runs = action_runs
            .filter(action_id.eq(run_action_id))
            .select(ActionRun::as_select())
            .order((created_at.desc(), id.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(runs)
    }
}
