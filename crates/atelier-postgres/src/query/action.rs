//! Action repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use super::Pagination;
use crate::model::{Action, NewAction, UpdateAction};
use crate::types::EventType;
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for action subscriptions and their run counters.
pub trait ActionRepository {
    /// Inserts an action.
    fn create_action(&mut self, new_action: NewAction)
    -> impl Future<Output = PgResult<Action>> + Send;

    /// Finds an action by ID.
    fn find_action_by_id(
        &mut self,
        action_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Action>>> + Send;

    /// Finds an action by ID, only if it belongs to `owner_user_id`.
    fn find_owned_action(
        &mut self,
        action_id: Uuid,
        owner_user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Action>>> + Send;

    /// Lists the actions of one owner, newest first.
    fn list_actions_by_owner(
        &mut self,
        owner_user_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Action>>> + Send;

    /// Returns every active action triggered by `trigger` whose scopes are
    /// unset or equal to the given space and database.
    fn find_active_actions_for_trigger(
        &mut self,
        trigger: EventType,
        space_id: Option<Uuid>,
        database_id: Option<Uuid>,
    ) -> impl Future<Output = PgResult<Vec<Action>>> + Send;

    /// Applies changes to an action.
    fn update_action(
        &mut self,
        action_id: Uuid,
        changes: UpdateAction,
    ) -> impl Future<Output = PgResult<Action>> + Send;

    /// Deletes an action and, by cascade, its run log.
    fn delete_action(&mut self, action_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;

    /// Sets `last_run_at` to now.
    fn set_action_last_run(
        &mut self,
        action_id: Uuid,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Increments `run_count` and `success_count`.
    fn increment_action_success(
        &mut self,
        action_id: Uuid,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Increments `run_count` and `failure_count` and stores the error.
    fn record_action_failure(
        &mut self,
        action_id: Uuid,
        error_message: &str,
    ) -> impl Future<Output = PgResult<()>> + Send;
}

impl ActionRepository for PgConnection {
    async fn create_action(&mut self, new_action: NewAction) -> PgResult<Action> {
        use schema::actions;

        let action = diesel::insert_into(actions::table)
            .values(&new_action)
            .returning(Action::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            action_id = %action.id,
            trigger_type = %action.trigger_type,
            "Action created"
        );

        Ok(action)
    }

    async fn find_action_by_id(&mut self, action_id: Uuid) -> PgResult<Option<Action>> {
        use schema::actions::dsl::*;

        let action = actions
            .filter(id.eq(action_id))
            .select(Action::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(action)
    }

    async fn find_owned_action(&mut self, action_id: Uuid, owner: Uuid) -> PgResult<Option<Action>> {
        use schema::actions::dsl::*;

        let action = actions
            .filter(id.eq(action_id))
            .filter(owner_user_id.eq(owner))
            .select(Action::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(action)
    }

    async fn list_actions_by_owner(
        &mut self,
        owner: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<Action>> {
        use schema::actions::dsl::*;

        let rows = actions
            .filter(owner_user_id.eq(owner))
            .select(Action::as_select())
            .order(created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows)
    }

    async fn find_active_actions_for_trigger(
        &mut self,
        trigger: EventType,
        space_id: Option<Uuid>,
        database_id: Option<Uuid>,
    ) -> PgResult<Vec<Action>> {
        use schema::actions::dsl::*;

        let mut query = actions
            .filter(active.eq(true))
            .filter(trigger_type.eq(trigger.as_str()))
            .into_boxed();

        query = match space_id {
            Some(space) => query.filter(scope_space_id.is_null().or(scope_space_id.eq(space))),
            None => query.filter(scope_space_id.is_null()),
        };

        query = match database_id {
            Some(database) => {
                query.filter(scope_database_id.is_null().or(scope_database_id.eq(database)))
            }
            None => query.filter(scope_database_id.is_null()),
        };

        let rows = query
            .select(Action::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            trigger = %trigger,
            space_id = ?space_id,
            database_id = ?database_id,
            matches = rows.len(),
            "Resolved actions for trigger"
        );

        Ok(rows)
    }

    async fn update_action(&mut self, action_id: Uuid, changes: UpdateAction) -> PgResult<Action> {
        use schema::actions::dsl::*;

        if changes.is_empty() {
            return actions
                .filter(id.eq(action_id))
                .select(Action::as_select())
                .first(self)
                .await
                .map_err(PgError::from);
        }

        let action = diesel::update(actions.filter(id.eq(action_id)))
            .set(&changes)
            .returning(Action::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(action)
    }

    async fn delete_action(&mut self, action_id: Uuid) -> PgResult<bool> {
        use schema::actions::dsl::*;

        let deleted = diesel::delete(actions.filter(id.eq(action_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    async fn set_action_last_run(&mut self, action_id: Uuid) -> PgResult<()> {
        use schema::actions::dsl::*;

        let now = jiff_diesel::Timestamp::from(Timestamp::now());
        diesel::update(actions.filter(id.eq(action_id)))
            .set(last_run_at.eq(Some(now)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn increment_action_success(&mut self, action_id: Uuid) -> PgResult<()> {
        use schema::actions::dsl::*;

        diesel::update(actions.filter(id.eq(action_id)))
            .set((
                run_count.eq(run_count + 1),
                success_count.eq(success_count + 1),
            ))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn record_action_failure(&mut self, action_id: Uuid, error_message: &str) -> PgResult<()> {
        use schema::actions::dsl::*;

        diesel::update(actions.filter(id.eq(action_id)))
            .set((
                run_count.eq(run_count + 1),
                failure_count.eq(failure_count + 1),
                last_error.eq(error_message),
            ))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }
}
