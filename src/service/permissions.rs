use tracing::debug;

use crate::db::Storage;
use crate::db::models::{PermissionRow, User};
use crate::error::TrackletError;

pub const SCM_MANAGE_REPOSITORIES: &str = "scm_manage_repositories";

/// Whether `user` may perform `action` on the project. Admin groups always
/// may; otherwise the most specific matching row decides (project beats
/// group, both beat the wildcard) and no row means no.
pub async fn user_can(
    storage: &Storage,
    user: &User,
    project_id: i64,
    action: &str,
) -> Result<bool, TrackletError> {
    if let Some(group) = storage.usergroup(user.group_id).await?
        && group.is_admin
    {
        return Ok(true);
    }
    let rows = storage
        .permission_rows(project_id, user.group_id, action)
        .await?;
    let allowed = most_specific(&rows).is_some_and(|row| row.value);
    debug!(user_id = user.id, project_id, action, allowed, "permission resolved");
    Ok(allowed)
}

fn most_specific(rows: &[PermissionRow]) -> Option<&PermissionRow> {
    rows.iter()
        .max_by_key(|row| (i32::from(row.project_id != 0) * 2) + i32::from(row.type_id != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(project_id: i64, type_id: i64, value: bool) -> PermissionRow {
        PermissionRow {
            project_id,
            type_id,
            value,
        }
    }

    #[test]
    fn project_rows_override_group_defaults() {
        let rows = [row(0, 0, false), row(0, 2, true), row(7, 0, false)];
        assert_eq!(most_specific(&rows), Some(&row(7, 0, false)));

        let rows = [row(0, 0, false), row(0, 2, true)];
        assert_eq!(most_specific(&rows), Some(&row(0, 2, true)));

        assert_eq!(most_specific(&[]), None);
    }
}
