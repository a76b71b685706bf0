//! Typed wrappers over every API endpoint.

use bugdesk_core::{
    Bug, BugFilter, BugStatus, NewBug, NewProject, Project, ProjectStatus, ProjectUpdate, ResourceKind, User,
};
use serde_json::{Value, json};

use crate::client::ApiClient;
use crate::error::ClientError;

/// Rejects ids that would escape their path segment.
fn segment<'a>(kind: &'static str, id: &'a str) -> Result<&'a str, ClientError> {
    let id = id.trim();
    if id.is_empty()
        || matches!(id, "." | "..")
        || id.contains(['/', '?', '#', '%'])
        || id.chars().any(char::is_whitespace)
    {
        return Err(ClientError::InvalidInput(format!("invalid {kind} id: {id:?}")));
    }
    Ok(id)
}

fn require_text(field: &'static str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn to_body<T: serde::Serialize>(context: &str, value: &T) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::Decode { context: context.to_owned(), source: e })
}

impl ApiClient {
    /// Fetches a collection and returns its raw elements.
    ///
    /// An unrecognized envelope degrades to an empty list.
    ///
    /// # Errors
    /// Returns request errors only.
    pub async fn fetch_collection(&self, path: &str, kind: ResourceKind) -> Result<Vec<Value>, ClientError> {
        let value = self.get(path).await?;
        match self.normalizer.collection(&value, kind) {
            Ok(items) => Ok(items.to_vec()),
            Err(e) => {
                tracing::warn!(path, error = %e, "treating response as empty collection");
                Ok(Vec::new())
            },
        }
    }

    // bugs

    /// # Errors
    /// Returns request errors.
    pub async fn list_bugs(&self, filter: &BugFilter) -> Result<Vec<Bug>, ClientError> {
        let value = self.get_with_query("/bugs", &filter.query_pairs()).await?;
        Ok(self.normalizer.decode_collection(&value, ResourceKind::Bugs))
    }

    /// # Errors
    /// Returns [`ClientError::NotFound`] when the response holds no bug.
    pub async fn get_bug(&self, id: &str) -> Result<Bug, ClientError> {
        let id = segment("bug", id)?;
        let value = self.get(&format!("/bugs/{id}")).await?;
        self.normalizer
            .decode_resource(&value, ResourceKind::Bugs)
            .ok_or_else(|| ClientError::NotFound { resource: "bug", id: id.to_owned() })
    }

    /// Reports a bug. Only testers may do this.
    ///
    /// Returns the created record when the response includes one.
    ///
    /// # Errors
    /// Returns [`ClientError::NotAuthenticated`], [`ClientError::Forbidden`],
    /// [`ClientError::InvalidInput`] or request errors.
    pub async fn create_bug(&self, bug: &NewBug) -> Result<Option<Bug>, ClientError> {
        let identity = self.session.require_identity()?;
        if !identity.role.can_report_bugs() {
            return Err(ClientError::Forbidden { role: identity.role, action: "report bugs" });
        }
        require_text("title", &bug.title)?;
        segment("project", &bug.project_id)?;

        let value = self.post("/bugs", &to_body("new bug", bug)?).await?;
        Ok(self.normalizer.decode_resource(&value, ResourceKind::Bugs))
    }

    /// # Errors
    /// Returns request errors.
    pub async fn update_bug_status(&self, id: &str, status: &BugStatus) -> Result<Option<Bug>, ClientError> {
        let id = segment("bug", id)?;
        let value = self.patch(&format!("/bugs/{id}/status"), &json!({ "status": status.as_str() })).await?;
        Ok(self.normalizer.decode_resource(&value, ResourceKind::Bugs))
    }

    /// # Errors
    /// Returns request errors.
    pub async fn delete_bug(&self, id: &str) -> Result<(), ClientError> {
        let id = segment("bug", id)?;
        self.delete(&format!("/bugs/{id}")).await?;
        Ok(())
    }

    // projects

    /// # Errors
    /// Returns request errors.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        let value = self.get("/project").await?;
        Ok(self.normalizer.decode_collection(&value, ResourceKind::Projects))
    }

    /// # Errors
    /// Returns [`ClientError::NotFound`] when the response holds no project.
    pub async fn get_project(&self, id: &str) -> Result<Project, ClientError> {
        let id = segment("project", id)?;
        let value = self.get(&format!("/project/{id}")).await?;
        self.normalizer
            .decode_resource(&value, ResourceKind::Projects)
            .ok_or_else(|| ClientError::NotFound { resource: "project", id: id.to_owned() })
    }

    /// # Errors
    /// Returns [`ClientError::InvalidInput`] for a blank name, or request errors.
    pub async fn create_project(&self, project: &NewProject) -> Result<Option<Project>, ClientError> {
        require_text("name", &project.name)?;
        let value = self.post("/project", &to_body("new project", project)?).await?;
        Ok(self.normalizer.decode_resource(&value, ResourceKind::Projects))
    }

    /// Sends only the fields set in `update`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] when nothing is set, or request errors.
    pub async fn update_project(&self, id: &str, update: &ProjectUpdate) -> Result<Option<Project>, ClientError> {
        let id = segment("project", id)?;
        if update.is_empty() {
            return Err(ClientError::InvalidInput("nothing to update".to_owned()));
        }
        let value = self.patch(&format!("/project/{id}"), &to_body("project update", update)?).await?;
        Ok(self.normalizer.decode_resource(&value, ResourceKind::Projects))
    }

    /// # Errors
    /// Returns request errors.
    pub async fn update_project_status(
        &self,
        id: &str,
        status: &ProjectStatus,
    ) -> Result<Option<Project>, ClientError> {
        let id = segment("project", id)?;
        let value = self.patch(&format!("/project/{id}/status"), &json!({ "status": status.as_str() })).await?;
        Ok(self.normalizer.decode_resource(&value, ResourceKind::Projects))
    }

    /// # Errors
    /// Returns request errors.
    pub async fn add_member(&self, project_id: &str, user_id: &str) -> Result<Option<Project>, ClientError> {
        let project_id = segment("project", project_id)?;
        let user_id = segment("user", user_id)?;
        let value = self.post(&format!("/project/{project_id}/members"), &json!({ "userId": user_id })).await?;
        Ok(self.normalizer.decode_resource(&value, ResourceKind::Projects))
    }

    /// # Errors
    /// Returns request errors.
    pub async fn remove_member(&self, project_id: &str, member_id: &str) -> Result<Option<Project>, ClientError> {
        let project_id = segment("project", project_id)?;
        let member_id = segment("member", member_id)?;
        let value = self.delete(&format!("/project/{project_id}/members/{member_id}")).await?;
        Ok(self.normalizer.decode_resource(&value, ResourceKind::Projects))
    }

    /// # Errors
    /// Returns request errors.
    pub async fn delete_project(&self, id: &str) -> Result<(), ClientError> {
        let id = segment("project", id)?;
        self.delete(&format!("/project/{id}")).await?;
        Ok(())
    }

    // users

    /// # Errors
    /// Returns request errors.
    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        let value = self.get("/users").await?;
        Ok(self.normalizer.decode_collection(&value, ResourceKind::Users))
    }
}
