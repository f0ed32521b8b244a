//! Table/session status view for staff
//!
//! Projects a table and its sessions into what the floor screen shows, and
//! turns staff actions into table commands.

use serde::Serialize;
use shared::error::AppError;
use shared::models::{Table, TableSession, TableStatus};
use shared::status::StatusInfo;
use std::fmt;

use crate::api::TableApi;
use crate::error::ClientResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TableAction {
    Occupy,
    Reserve,
    Release,
    Maintenance,
    Reset,
}

impl TableAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Occupy => "Occupy",
            Self::Reserve => "Reserve",
            Self::Release => "Release",
            Self::Maintenance => "Maintenance",
            Self::Reset => "Reset Table",
        }
    }

    /// Table status after the action
    pub fn target_status(&self) -> TableStatus {
        match self {
            Self::Occupy => TableStatus::Occupied,
            Self::Reserve => TableStatus::Reserved,
            Self::Release | Self::Reset => TableStatus::Available,
            Self::Maintenance => TableStatus::Maintenance,
        }
    }

    /// Reset closes the session even with an unpaid balance
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Reset)
    }
}

impl fmt::Display for TableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Actions offered for a table in `status`
pub fn available_actions(status: TableStatus) -> &'static [TableAction] {
    match status {
        TableStatus::Available => &[TableAction::Occupy, TableAction::Reserve],
        TableStatus::Occupied => &[
            TableAction::Release,
            TableAction::Maintenance,
            TableAction::Reset,
        ],
        TableStatus::Reserved => &[TableAction::Occupy, TableAction::Release],
        TableStatus::Maintenance => &[TableAction::Release],
    }
}

/// Floor-screen projection of one table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStatusView {
    pub table_id: String,
    pub display_name: String,
    pub status: TableStatus,
    pub status_info: &'static StatusInfo,
    pub session: Option<SessionSummary>,
    pub actions: Vec<TableAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub session_code: String,
    pub status_info: &'static StatusInfo,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub remaining: f64,
    pub payment_progress: f64,
    pub guest_count: usize,
    pub order_count: usize,
    pub active_order_count: usize,
}

impl SessionSummary {
    fn from_session(session: &TableSession) -> Self {
        Self {
            session_id: session.id.clone(),
            session_code: session.session_code.clone(),
            status_info: session.status.info(),
            total_amount: session.total_amount,
            paid_amount: session.paid_amount,
            remaining: session.remaining(),
            payment_progress: session.payment_progress(),
            guest_count: session.users.len(),
            order_count: session.orders.len(),
            active_order_count: session.active_order_count(),
        }
    }
}

impl TableStatusView {
    /// Project `table` with the most recent of `sessions`
    pub fn project(table: &Table, sessions: &[TableSession]) -> Self {
        Self {
            table_id: table.id.clone(),
            display_name: table.display_name(),
            status: table.status,
            status_info: table.status.info(),
            session: latest_session(sessions).map(SessionSummary::from_session),
            actions: available_actions(table.status).to_vec(),
        }
    }

    pub fn has_unpaid_balance(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.remaining > 0.0)
    }
}

/// Session with the latest `created_at`
pub fn latest_session(sessions: &[TableSession]) -> Option<&TableSession> {
    sessions.iter().max_by_key(|s| s.created_at)
}

/// Backend calls needed to carry out a table action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    SetStatus {
        table_id: String,
        status: TableStatus,
    },
    /// Close the latest open session, then mark the table available
    Reset { table_id: String },
}

/// Validate `action` against the table's current status
pub fn plan_action(table: &Table, action: TableAction) -> Result<TableCommand, AppError> {
    if !available_actions(table.status).contains(&action) {
        return Err(AppError::table_action_not_allowed(
            action.label(),
            table.status.as_str(),
        ));
    }
    Ok(match action {
        TableAction::Reset => TableCommand::Reset {
            table_id: table.id.clone(),
        },
        other => TableCommand::SetStatus {
            table_id: table.id.clone(),
            status: other.target_status(),
        },
    })
}

/// Plan and run `action` against the backend
///
/// Reset tolerates a table without open sessions and still frees it.
pub async fn execute_action<A>(api: &A, table: &Table, action: TableAction) -> ClientResult<Table>
where
    A: TableApi + ?Sized,
{
    match plan_action(table, action)? {
        TableCommand::SetStatus { table_id, status } => {
            let updated = api.update_table_status(&table_id, status).await?;
            tracing::info!(table_id = %table_id, action = %action, status = %status, "Table status changed");
            Ok(updated)
        }
        TableCommand::Reset { table_id } => {
            let sessions = api.sessions_by_table(&table_id).await?;
            let open: Vec<&TableSession> = sessions.iter().filter(|s| s.is_open()).collect();
            if let Some(session) = open.iter().max_by_key(|s| s.created_at) {
                if session.remaining() > 0.0 {
                    tracing::warn!(
                        table_id = %table_id,
                        session_id = %session.id,
                        remaining = session.remaining(),
                        "Resetting table with unpaid balance"
                    );
                }
                api.close_session(&session.id).await?;
            } else {
                tracing::debug!(table_id = %table_id, "No open session to close on reset");
            }
            let updated = api
                .update_table_status(&table_id, TableStatus::Available)
                .await?;
            tracing::info!(table_id = %table_id, "Table reset");
            Ok(updated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use serde_json::json;
    use shared::error::ErrorCode;
    use shared::status::SessionStatus;
    use std::sync::Mutex;

    fn table(status: TableStatus) -> Table {
        Table {
            id: "t1".to_string(),
            number: "12".to_string(),
            name: None,
            capacity: 4,
            status,
            restaurant_id: Some("r1".to_string()),
        }
    }

    fn session(id: &str, created: &str, status: &str, total: f64, paid: f64) -> TableSession {
        serde_json::from_value(json!({
            "id": id,
            "sessionCode": "CODE",
            "tableId": "t1",
            "status": status,
            "totalAmount": total,
            "paidAmount": paid,
            "users": [{ "id": "u1", "name": "Ana", "isHost": true }],
            "createdAt": created
        }))
        .unwrap()
    }

    #[test]
    fn test_action_sets() {
        assert_eq!(
            available_actions(TableStatus::Available),
            &[TableAction::Occupy, TableAction::Reserve]
        );
        assert_eq!(
            available_actions(TableStatus::Occupied),
            &[TableAction::Release, TableAction::Maintenance, TableAction::Reset]
        );
        assert_eq!(
            available_actions(TableStatus::Reserved),
            &[TableAction::Occupy, TableAction::Release]
        );
        assert_eq!(available_actions(TableStatus::Maintenance), &[TableAction::Release]);
    }

    #[test]
    fn test_project_uses_latest_session() {
        let sessions = vec![
            session("old", "2026-10-19T11:00:00Z", "CLOSED", 40.0, 40.0),
            session("new", "2026-10-19T18:30:00Z", "ACTIVE", 90.0, 30.0),
        ];
        let view = TableStatusView::project(&table(TableStatus::Occupied), &sessions);

        let summary = view.session.as_ref().unwrap();
        assert_eq!(summary.session_id, "new");
        assert_eq!(summary.remaining, 60.0);
        assert_eq!(summary.guest_count, 1);
        assert_eq!(view.display_name, "Table 12");
        assert!(view.has_unpaid_balance());
        // Reset stays available regardless of the unpaid balance
        assert!(view.actions.contains(&TableAction::Reset));
    }

    #[test]
    fn test_project_without_sessions() {
        let view = TableStatusView::project(&table(TableStatus::Available), &[]);
        assert!(view.session.is_none());
        assert!(!view.has_unpaid_balance());
        assert_eq!(view.status_info.label, "Available");
    }

    #[test]
    fn test_plan_rejects_unavailable_action() {
        let err = plan_action(&table(TableStatus::Maintenance), TableAction::Occupy).unwrap_err();
        assert_eq!(err.code, ErrorCode::TableActionNotAllowed);

        assert_eq!(
            plan_action(&table(TableStatus::Available), TableAction::Reserve).unwrap(),
            TableCommand::SetStatus {
                table_id: "t1".to_string(),
                status: TableStatus::Reserved
            }
        );
    }

    #[derive(Default)]
    struct FakeTables {
        sessions: Vec<TableSession>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTables {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TableApi for FakeTables {
        async fn tables_by_restaurant(&self, _restaurant_id: &str) -> ClientResult<Vec<Table>> {
            Ok(vec![])
        }

        async fn update_table_status(&self, table_id: &str, status: TableStatus) -> ClientResult<Table> {
            self.calls.lock().unwrap().push(format!("status:{}:{}", table_id, status));
            let mut updated = table(status);
            updated.id = table_id.to_string();
            Ok(updated)
        }

        async fn sessions_by_table(&self, _table_id: &str) -> ClientResult<Vec<TableSession>> {
            Ok(self.sessions.clone())
        }

        async fn close_session(&self, session_id: &str) -> ClientResult<TableSession> {
            self.calls.lock().unwrap().push(format!("close:{}", session_id));
            let mut closed = self
                .sessions
                .iter()
                .find(|s| s.id == session_id)
                .cloned()
                .ok_or(ClientError::SessionMissing)?;
            closed.status = SessionStatus::Closed;
            Ok(closed)
        }
    }

    #[tokio::test]
    async fn test_reset_closes_latest_open_session() {
        let api = FakeTables {
            sessions: vec![
                session("s1", "2026-10-19T12:00:00Z", "ACTIVE", 20.0, 0.0),
                session("s2", "2026-10-19T19:00:00Z", "PAYMENT_PENDING", 50.0, 10.0),
                session("s3", "2026-10-19T20:00:00Z", "CLOSED", 10.0, 10.0),
            ],
            ..Default::default()
        };

        let updated = execute_action(&api, &table(TableStatus::Occupied), TableAction::Reset)
            .await
            .unwrap();

        assert_eq!(updated.status, TableStatus::Available);
        assert_eq!(api.calls(), vec!["close:s2", "status:t1:AVAILABLE"]);
    }

    #[tokio::test]
    async fn test_reset_without_session_still_frees_table() {
        let api = FakeTables::default();
        execute_action(&api, &table(TableStatus::Occupied), TableAction::Reset)
            .await
            .unwrap();
        assert_eq!(api.calls(), vec!["status:t1:AVAILABLE"]);
    }

    #[tokio::test]
    async fn test_disallowed_action_makes_no_calls() {
        let api = FakeTables::default();
        let err = execute_action(&api, &table(TableStatus::Reserved), TableAction::Maintenance)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TableActionNotAllowed);
        assert!(api.calls().is_empty());
    }
}
